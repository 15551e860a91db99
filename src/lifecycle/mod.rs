//! Recurring-task lifecycle engine.
//!
//! The engine turns declarative recurrence rules attached to template tasks
//! into concrete instances on a schedule, sweeps deadline-bearing tasks to
//! overdue, and archives completed tasks past each organization's retention
//! window. It is driven by an external wall-clock trigger; one invocation
//! is a tick. The module follows hexagonal architecture:
//!
//! - Domain types and the pure recurrence evaluator in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
