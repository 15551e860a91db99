//! Adapter implementations of the lifecycle ports.

pub mod memory;
pub mod postgres;
