//! Taskwheel: recurring-task lifecycle engine for a multi-tenant task
//! tracker.
//!
//! This crate implements the one subsystem of the tracker with real
//! algorithmic and state-machine content: evaluating recurrence rules,
//! materializing task instances from templates, sweeping missed deadlines
//! to overdue, and archiving stale completed work per organization policy.
//!
//! # Architecture
//!
//! Taskwheel follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, sinks)
//!
//! # Modules
//!
//! - [`lifecycle`]: the recurrence evaluator, instance materializer,
//!   overdue/archival sweepers, and the tick driver

pub mod lifecycle;
