//! Port contracts for the lifecycle engine.
//!
//! Ports define infrastructure-agnostic interfaces used by the engine's
//! services: task persistence, the per-organization policy store, the two
//! write-only sinks (notifications, audit log), and the advisory tick
//! lease.

pub mod audit;
pub mod lease;
pub mod notifier;
pub mod policy;
pub mod repository;

pub use audit::{AuditLog, AuditLogError, AuditLogResult};
pub use lease::{LeaseStore, LeaseStoreError, LeaseStoreResult};
pub use notifier::{Notifier, NotifierError, NotifierResult};
pub use policy::{ArchivePolicyStore, ArchivePolicyStoreError, ArchivePolicyStoreResult};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
