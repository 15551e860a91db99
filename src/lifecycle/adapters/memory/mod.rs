//! In-memory adapters for lifecycle tests and local wiring.

mod lease;
mod policy;
mod repository;
mod sinks;

pub use lease::InMemoryLeaseStore;
pub use policy::InMemoryArchivePolicyStore;
pub use repository::InMemoryTaskRepository;
pub use sinks::{RecordingAuditLog, RecordingNotifier};
