//! Diesel schema for lifecycle persistence.

diesel::table! {
    /// Task records; templates and instances share one table.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning organization.
        organization_id -> Uuid,
        /// Creating user.
        created_by_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Free-form description.
        details -> Nullable<Text>,
        /// Visibility flag.
        is_private -> Bool,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Schedule discriminator: `one_time`, `daily`, `weekly`, `monthly`.
        #[max_length = 50]
        schedule_type -> Varchar,
        /// Recurrence interval multiplier; 1 for one-time tasks.
        schedule_frequency -> Int4,
        /// First date a template may fire; null for one-time tasks.
        start_date -> Nullable<Date>,
        /// Recurrence window end for templates; deadline for instances.
        end_date -> Nullable<Date>,
        /// Generation watermark; null until distinct from `start_date`.
        last_generated_at -> Nullable<Date>,
        /// Date an instance was generated for; unique per template.
        generated_for -> Nullable<Date>,
        /// Spawning template for instances.
        parent_template_id -> Nullable<Uuid>,
        /// Legacy single-assignee pointer.
        assigned_user_id -> Nullable<Uuid>,
        /// Archival timestamp; never cleared once set.
        archived_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ordered checklist items attached to tasks.
    task_requirements (id) {
        /// Requirement identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Requirement text.
        description -> Text,
        /// Position within the task.
        order_index -> Int4,
    }
}

diesel::table! {
    /// Task assignment rows, unique per `(task, user)`.
    task_assignees (task_id, user_id) {
        /// Assigned task.
        task_id -> Uuid,
        /// Assigned user.
        user_id -> Uuid,
        /// User who made the assignment.
        assigned_by_id -> Uuid,
        /// Assignment status.
        #[max_length = 50]
        status -> Varchar,
    }
}

diesel::table! {
    /// Per-organization archival policy.
    organization_archive_policies (organization_id) {
        /// Organization identifier.
        organization_id -> Uuid,
        /// Whether automatic archival runs for this organization.
        auto_archive_enabled -> Bool,
        /// Retention window in days.
        auto_archive_after_days -> Int4,
        /// Sweep cadence tag.
        #[max_length = 50]
        archive_schedule -> Varchar,
    }
}

diesel::table! {
    /// Write-only audit trail.
    audit_log (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Task the entry refers to.
        task_id -> Uuid,
        /// Acting user; the nil UUID denotes the system actor.
        actor_id -> Uuid,
        /// Action name.
        #[max_length = 100]
        action -> Varchar,
        /// Structured metadata payload.
        metadata -> Jsonb,
        /// Write timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Write-only notification records.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Addressee.
        user_id -> Uuid,
        /// Notification category.
        #[max_length = 100]
        kind -> Varchar,
        /// Short title.
        #[max_length = 255]
        title -> Varchar,
        /// Message body.
        message -> Text,
        /// Task the notification refers to.
        task_id -> Uuid,
        /// Write timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Advisory leases guarding the lifecycle tick.
    lifecycle_leases (name) {
        /// Lease name.
        #[max_length = 100]
        name -> Varchar,
        /// Holder token.
        holder -> Uuid,
        /// Expiry instant.
        expires_at -> Timestamptz,
    }
}
