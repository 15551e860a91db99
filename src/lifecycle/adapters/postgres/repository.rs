//! `PostgreSQL` repository implementation for lifecycle task storage.

use super::{
    models::{AssigneeRow, NewAssigneeRow, NewRequirementRow, NewTaskRow, RequirementRow, TaskChangeset, TaskRow},
    schema::{task_assignees, task_requirements, tasks},
};
use crate::lifecycle::{
    domain::{
        Assignee, AssigneeStatus, Cadence, OrganizationId, PersistedTaskData, RecurrenceRule,
        Requirement, Schedule, Task, TaskId, TaskStatus, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by lifecycle adapters.
pub type LifecyclePgPool = Pool<ConnectionManager<PgConnection>>;

/// Unique index enforcing one instance per template/date pair.
const INSTANCE_UNIQUE_INDEX: &str = "idx_tasks_template_generated_for_unique";

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: LifecyclePgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: LifecyclePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn store_instance(&self, instance: &Task) -> TaskRepositoryResult<()> {
        let task_id = instance.id();
        let template_id = instance.parent_template_id();
        let generated_for = instance.generated_for();
        let new_row = to_new_row(instance)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_instance_unique_violation(info.as_ref()) =>
                    {
                        match (template_id, generated_for) {
                            (Some(template_id), Some(generated_for)) => {
                                TaskRepositoryError::DuplicateInstance {
                                    template_id,
                                    generated_for,
                                }
                            }
                            _ => TaskRepositoryError::DuplicateTask(task_id),
                        }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changeset = to_changeset(task);
        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                .set(&changeset)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if updated == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_instances_of(&self, template_id: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::parent_template_id.eq(template_id.into_inner()))
                .order(tasks::generated_for.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn due_template_candidates(&self, as_of: NaiveDate) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::parent_template_id.is_null())
                .filter(tasks::schedule_type.ne("one_time"))
                .filter(tasks::archived_at.is_null())
                .filter(tasks::start_date.le(as_of))
                .filter(tasks::end_date.is_null().or(tasks::end_date.ge(as_of)))
                .order(tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn requirements_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Requirement>> {
        self.run_blocking(move |connection| {
            let rows = task_requirements::table
                .filter(task_requirements::task_id.eq(task_id.into_inner()))
                .order(task_requirements::order_index.asc())
                .select(RequirementRow::as_select())
                .load::<RequirementRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(rows
                .into_iter()
                .map(|row| Requirement::new(row.description, row.order_index))
                .collect())
        })
        .await
    }

    async fn store_requirements(
        &self,
        task_id: TaskId,
        requirements: &[Requirement],
    ) -> TaskRepositoryResult<()> {
        let new_rows: Vec<NewRequirementRow> = requirements
            .iter()
            .map(|requirement| NewRequirementRow {
                id: Uuid::new_v4(),
                task_id: task_id.into_inner(),
                description: requirement.description().to_owned(),
                order_index: requirement.order_index(),
            })
            .collect();
        self.run_blocking(move |connection| {
            diesel::insert_into(task_requirements::table)
                .values(&new_rows)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn assignees_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Assignee>> {
        self.run_blocking(move |connection| {
            let rows = task_assignees::table
                .filter(task_assignees::task_id.eq(task_id.into_inner()))
                .select(AssigneeRow::as_select())
                .load::<AssigneeRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter()
                .map(|row| row_to_assignee(task_id, &row))
                .collect()
        })
        .await
    }

    async fn store_assignees(
        &self,
        task_id: TaskId,
        assignees: &[Assignee],
    ) -> TaskRepositoryResult<()> {
        let new_rows: Vec<NewAssigneeRow> = assignees
            .iter()
            .map(|assignee| NewAssigneeRow {
                task_id: task_id.into_inner(),
                user_id: assignee.user_id().into_inner(),
                assigned_by_id: assignee.assigned_by().into_inner(),
                status: assignee.status().as_str().to_owned(),
            })
            .collect();
        self.run_blocking(move |connection| {
            diesel::insert_into(task_assignees::table)
                .values(&new_rows)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateAssignee(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn sweep_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<usize> {
        let today = now.date_naive();
        self.run_blocking(move |connection| {
            let transitioned = diesel::update(
                tasks::table
                    .filter(tasks::archived_at.is_null())
                    .filter(tasks::schedule_type.eq("one_time"))
                    .filter(
                        tasks::status.eq_any(TaskStatus::OVERDUE_SOURCES.map(TaskStatus::as_str)),
                    )
                    .filter(tasks::end_date.lt(today)),
            )
            .set((
                tasks::status.eq(TaskStatus::Overdue.as_str()),
                tasks::updated_at.eq(now),
            ))
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            Ok(transitioned)
        })
        .await
    }

    async fn archive_candidates(
        &self,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::organization_id.eq(organization_id.into_inner()))
                .filter(tasks::status.eq(TaskStatus::Completed.as_str()))
                .filter(tasks::archived_at.is_null())
                .filter(tasks::updated_at.lt(cutoff))
                .order(tasks::updated_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

fn is_instance_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == INSTANCE_UNIQUE_INDEX)
}

/// Splits a task's schedule into the flat storage columns.
fn schedule_columns(
    task: &Task,
) -> TaskRepositoryResult<(String, i32, Option<NaiveDate>, Option<NaiveDate>, Option<NaiveDate>)> {
    match task.schedule() {
        Schedule::OneTime { deadline } => Ok(("one_time".to_owned(), 1, None, *deadline, None)),
        Schedule::Recurring(rule) => {
            let frequency = i32::try_from(rule.frequency()).map_err(|_| {
                TaskRepositoryError::InvalidRow {
                    task_id: task.id(),
                    reason: format!("recurrence frequency {} exceeds storage range", rule.frequency()),
                }
            })?;
            Ok((
                rule.cadence().as_str().to_owned(),
                frequency,
                Some(rule.start_date()),
                rule.end_date(),
                Some(rule.last_generated_at()),
            ))
        }
    }
}

fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    let (schedule_type, schedule_frequency, start_date, end_date, last_generated_at) =
        schedule_columns(task)?;
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        organization_id: task.organization_id().into_inner(),
        created_by_id: task.created_by().into_inner(),
        title: task.title().to_owned(),
        details: task.details().map(ToOwned::to_owned),
        is_private: task.is_private(),
        status: task.status().as_str().to_owned(),
        schedule_type,
        schedule_frequency,
        start_date,
        end_date,
        last_generated_at,
        generated_for: task.generated_for(),
        parent_template_id: task.parent_template_id().map(TaskId::into_inner),
        assigned_user_id: task.legacy_assignee().map(UserId::into_inner),
        archived_at: task.archived_at(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn to_changeset(task: &Task) -> TaskChangeset {
    let (end_date, last_generated_at) = match task.schedule() {
        Schedule::OneTime { deadline } => (*deadline, None),
        Schedule::Recurring(rule) => (rule.end_date(), Some(rule.last_generated_at())),
    };
    TaskChangeset {
        status: task.status().as_str().to_owned(),
        end_date,
        last_generated_at,
        assigned_user_id: task.legacy_assignee().map(UserId::into_inner),
        archived_at: task.archived_at(),
        updated_at: task.updated_at(),
    }
}

fn invalid_row(task_id: TaskId, reason: impl Into<String>) -> TaskRepositoryError {
    TaskRepositoryError::InvalidRow {
        task_id,
        reason: reason.into(),
    }
}

fn row_to_schedule(task_id: TaskId, row: &TaskRow) -> TaskRepositoryResult<Schedule> {
    if row.schedule_type == "one_time" {
        return Ok(Schedule::OneTime {
            deadline: row.end_date,
        });
    }
    let cadence = Cadence::try_from(row.schedule_type.as_str())
        .map_err(|err| invalid_row(task_id, err.to_string()))?;
    let frequency = u32::try_from(row.schedule_frequency)
        .ok()
        .filter(|&parsed| parsed > 0)
        .ok_or_else(|| invalid_row(task_id, "non-positive recurrence frequency"))?;
    let start_date = row
        .start_date
        .ok_or_else(|| invalid_row(task_id, "recurring task without start date"))?;
    Ok(Schedule::Recurring(RecurrenceRule::from_persisted(
        cadence,
        frequency,
        start_date,
        row.end_date,
        row.last_generated_at,
    )))
}

pub(crate) fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let task_id = TaskId::from_uuid(row.id);
    let status = TaskStatus::try_from(row.status.as_str())
        .map_err(|err| invalid_row(task_id, err.to_string()))?;
    let schedule = row_to_schedule(task_id, &row)?;
    let data = PersistedTaskData {
        id: task_id,
        organization_id: OrganizationId::from_uuid(row.organization_id),
        created_by: UserId::from_uuid(row.created_by_id),
        title: row.title,
        details: row.details,
        is_private: row.is_private,
        status,
        schedule,
        parent_template_id: row.parent_template_id.map(TaskId::from_uuid),
        generated_for: row.generated_for,
        legacy_assignee: row.assigned_user_id.map(UserId::from_uuid),
        archived_at: row.archived_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Task::from_persisted(data))
}

fn row_to_assignee(task_id: TaskId, row: &AssigneeRow) -> TaskRepositoryResult<Assignee> {
    let status = AssigneeStatus::try_from(row.status.as_str())
        .map_err(|err| invalid_row(task_id, err.to_string()))?;
    Ok(Assignee::from_persisted(
        UserId::from_uuid(row.user_id),
        UserId::from_uuid(row.assigned_by_id),
        status,
    ))
}
