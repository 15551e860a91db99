//! Diesel row models for lifecycle persistence.

use super::schema::{
    audit_log, lifecycle_leases, notifications, organization_archive_policies, task_assignees,
    task_requirements, tasks,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Creating user.
    pub created_by_id: Uuid,
    /// Task title.
    pub title: String,
    /// Free-form description.
    pub details: Option<String>,
    /// Visibility flag.
    pub is_private: bool,
    /// Lifecycle status.
    pub status: String,
    /// Schedule discriminator.
    pub schedule_type: String,
    /// Recurrence interval multiplier.
    pub schedule_frequency: i32,
    /// First date a template may fire.
    pub start_date: Option<NaiveDate>,
    /// Recurrence window end or instance deadline.
    pub end_date: Option<NaiveDate>,
    /// Generation watermark.
    pub last_generated_at: Option<NaiveDate>,
    /// Date an instance was generated for.
    pub generated_for: Option<NaiveDate>,
    /// Spawning template for instances.
    pub parent_template_id: Option<Uuid>,
    /// Legacy single-assignee pointer.
    pub assigned_user_id: Option<Uuid>,
    /// Archival timestamp.
    pub archived_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Creating user.
    pub created_by_id: Uuid,
    /// Task title.
    pub title: String,
    /// Free-form description.
    pub details: Option<String>,
    /// Visibility flag.
    pub is_private: bool,
    /// Lifecycle status.
    pub status: String,
    /// Schedule discriminator.
    pub schedule_type: String,
    /// Recurrence interval multiplier.
    pub schedule_frequency: i32,
    /// First date a template may fire.
    pub start_date: Option<NaiveDate>,
    /// Recurrence window end or instance deadline.
    pub end_date: Option<NaiveDate>,
    /// Generation watermark.
    pub last_generated_at: Option<NaiveDate>,
    /// Date an instance was generated for.
    pub generated_for: Option<NaiveDate>,
    /// Spawning template for instances.
    pub parent_template_id: Option<Uuid>,
    /// Legacy single-assignee pointer.
    pub assigned_user_id: Option<Uuid>,
    /// Archival timestamp.
    pub archived_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied when updating an existing task.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Lifecycle status.
    pub status: String,
    /// Recurrence window end or instance deadline.
    pub end_date: Option<NaiveDate>,
    /// Generation watermark.
    pub last_generated_at: Option<NaiveDate>,
    /// Legacy single-assignee pointer.
    pub assigned_user_id: Option<Uuid>,
    /// Archival timestamp.
    pub archived_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for requirement records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_requirements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RequirementRow {
    /// Requirement identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: Uuid,
    /// Requirement text.
    pub description: String,
    /// Position within the task.
    pub order_index: i32,
}

/// Insert model for requirement records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_requirements)]
pub struct NewRequirementRow {
    /// Requirement identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: Uuid,
    /// Requirement text.
    pub description: String,
    /// Position within the task.
    pub order_index: i32,
}

/// Query result row for assignee records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_assignees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssigneeRow {
    /// Assigned task.
    pub task_id: Uuid,
    /// Assigned user.
    pub user_id: Uuid,
    /// User who made the assignment.
    pub assigned_by_id: Uuid,
    /// Assignment status.
    pub status: String,
}

/// Insert model for assignee records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_assignees)]
pub struct NewAssigneeRow {
    /// Assigned task.
    pub task_id: Uuid,
    /// Assigned user.
    pub user_id: Uuid,
    /// User who made the assignment.
    pub assigned_by_id: Uuid,
    /// Assignment status.
    pub status: String,
}

/// Query result row for archival policy records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = organization_archive_policies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ArchivePolicyRow {
    /// Organization identifier.
    pub organization_id: Uuid,
    /// Whether automatic archival runs for this organization.
    pub auto_archive_enabled: bool,
    /// Retention window in days.
    pub auto_archive_after_days: i32,
    /// Sweep cadence tag.
    pub archive_schedule: String,
}

/// Insert model for audit entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_log)]
pub struct NewAuditRow {
    /// Entry identifier.
    pub id: Uuid,
    /// Task the entry refers to.
    pub task_id: Uuid,
    /// Acting user; the nil UUID denotes the system actor.
    pub actor_id: Uuid,
    /// Action name.
    pub action: String,
    /// Structured metadata payload.
    pub metadata: Value,
    /// Write timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for notification records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow {
    /// Notification identifier.
    pub id: Uuid,
    /// Addressee.
    pub user_id: Uuid,
    /// Notification category.
    pub kind: String,
    /// Short title.
    pub title: String,
    /// Message body.
    pub message: String,
    /// Task the notification refers to.
    pub task_id: Uuid,
    /// Write timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for lease records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = lifecycle_leases)]
pub struct NewLeaseRow {
    /// Lease name.
    pub name: String,
    /// Holder token.
    pub holder: Uuid,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}
