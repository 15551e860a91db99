//! `PostgreSQL` adapters for lifecycle persistence.

mod lease;
mod models;
mod policy;
mod repository;
mod schema;
mod sinks;

pub use lease::PostgresLeaseStore;
pub use policy::PostgresArchivePolicyStore;
pub use repository::{LifecyclePgPool, PostgresTaskRepository};
pub use sinks::{PostgresAuditLog, PostgresNotifier};

#[cfg(test)]
pub(crate) use models::TaskRow;
#[cfg(test)]
pub(crate) use repository::row_to_task;
