//! Orchestration services for the lifecycle engine.

mod archive;
mod driver;
mod materializer;
mod overdue;

pub use archive::{ArchiveSweepError, ArchiveSweepResult, ArchiveSweeper};
pub use driver::{LifecycleDriver, TICK_LEASE_NAME, TickError, TickRequest, TickSummary};
pub use materializer::{
    InstanceMaterializer, MaterializeError, MaterializeOutcome, MaterializeResult,
};
pub use overdue::{OverdueSweepError, OverdueSweeper};
