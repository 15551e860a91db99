//! In-memory task repository for lifecycle tests and local wiring.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::lifecycle::{
    domain::{Assignee, OrganizationId, Requirement, Task, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    requirements: HashMap<TaskId, Vec<Requirement>>,
    assignees: HashMap<TaskId, Vec<Assignee>>,
    instance_index: HashMap<(TaskId, NaiveDate), TaskId>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write_state(
        &self,
    ) -> TaskRepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn read_state(
        &self,
    ) -> TaskRepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn store_instance(&self, instance: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.tasks.contains_key(&instance.id()) {
            return Err(TaskRepositoryError::DuplicateTask(instance.id()));
        }
        if let (Some(template_id), Some(generated_for)) =
            (instance.parent_template_id(), instance.generated_for())
        {
            let key = (template_id, generated_for);
            if state.instance_index.contains_key(&key) {
                return Err(TaskRepositoryError::DuplicateInstance {
                    template_id,
                    generated_for,
                });
            }
            state.instance_index.insert(key, instance.id());
        }
        state.tasks.insert(instance.id(), instance.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::NotFound(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read_state()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_instances_of(&self, template_id: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read_state()?;
        let mut instances: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.parent_template_id() == Some(template_id))
            .cloned()
            .collect();
        instances.sort_by_key(|task| (task.generated_for(), task.id().into_inner()));
        Ok(instances)
    }

    async fn due_template_candidates(&self, as_of: NaiveDate) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read_state()?;
        let mut candidates: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| {
                task.is_template()
                    && task.archived_at().is_none()
                    && task
                        .recurrence()
                        .is_some_and(|rule| rule.is_candidate(as_of))
            })
            .cloned()
            .collect();
        // Deterministic processing order for tests and log output.
        candidates.sort_by_key(|task| (task.created_at(), task.id().into_inner()));
        Ok(candidates)
    }

    async fn requirements_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Requirement>> {
        let state = self.read_state()?;
        let mut requirements = state.requirements.get(&task_id).cloned().unwrap_or_default();
        requirements.sort_by_key(Requirement::order_index);
        Ok(requirements)
    }

    async fn store_requirements(
        &self,
        task_id: TaskId,
        requirements: &[Requirement],
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        state
            .requirements
            .entry(task_id)
            .or_default()
            .extend_from_slice(requirements);
        Ok(())
    }

    async fn assignees_for(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Assignee>> {
        let state = self.read_state()?;
        Ok(state.assignees.get(&task_id).cloned().unwrap_or_default())
    }

    async fn store_assignees(
        &self,
        task_id: TaskId,
        assignees: &[Assignee],
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        let existing = state.assignees.entry(task_id).or_default();
        for assignee in assignees {
            if existing
                .iter()
                .any(|present| present.user_id() == assignee.user_id())
            {
                return Err(TaskRepositoryError::DuplicateAssignee(task_id));
            }
            existing.push(*assignee);
        }
        Ok(())
    }

    async fn sweep_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<usize> {
        let today = now.date_naive();
        let mut state = self.write_state()?;
        let mut transitioned = 0_usize;
        for task in state.tasks.values_mut() {
            let eligible = task.archived_at().is_none()
                && TaskStatus::OVERDUE_SOURCES.contains(&task.status())
                && task.deadline().is_some_and(|deadline| deadline < today);
            if eligible && task.mark_overdue_at(now).is_ok() {
                transitioned += 1;
            }
        }
        Ok(transitioned)
    }

    async fn archive_candidates(
        &self,
        organization_id: OrganizationId,
        cutoff: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read_state()?;
        let mut candidates: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| {
                task.organization_id() == organization_id
                    && task.status() == TaskStatus::Completed
                    && task.archived_at().is_none()
                    && task.updated_at() < cutoff
            })
            .cloned()
            .collect();
        candidates.sort_by_key(|task| (task.updated_at(), task.id().into_inner()));
        Ok(candidates)
    }
}
