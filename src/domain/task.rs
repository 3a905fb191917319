use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::driving_ports::TaskError;
use crate::domain::task::query::{TaskPage, TaskQuery};
use crate::domain::task::stats::TaskStats;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

pub mod query;
pub mod seed;
pub mod stats;

/// How many tasks a reseed generates when no usable count was asked for
pub const DEFAULT_SEED_COUNT: usize = 400;
/// Largest number of tasks a single reseed may generate
pub const MAX_SEED_COUNT: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// The value used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    /// The value used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Returned when text does not name one of an enum's variants
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{value:?} is not a valid {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "status",
                value: s.to_owned(),
            })
    }
}

impl FromStr for TaskPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "priority",
                value: s.to_owned(),
            })
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for TaskPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work owned by exactly one user
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Task {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// The legacy single-valued category, which always mirrors the first entry of [Task::categories]
    pub fn category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }
}

#[derive(Debug, PartialEq)]
#[cfg_attr(test, derive(Clone))]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// A partial change to a task. `None` leaves a field untouched; the nested options on
/// [UpdateTask::primary_category] and [UpdateTask::due_date] distinguish "clear it" from "leave it".
#[derive(Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Clone))]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub primary_category: Option<Option<String>>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl UpdateTask {
    /// Applies every present field to the task and refreshes its update timestamp
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        match self.primary_category {
            Some(Some(ref category)) => {
                let mut categories = vec![category.clone()];
                categories.extend(task.categories.iter().skip(1).cloned());
                task.categories = normalize_labels(&categories);
            }
            Some(None) => task.categories.clear(),
            None => {}
        }
        // A full category list wins over a lone primary category
        if let Some(ref categories) = self.categories {
            task.categories = normalize_labels(categories);
        }
        if let Some(ref tags) = self.tags {
            task.tags = normalize_labels(tags);
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }

        task.updated_at = now;
    }
}

/// Trims labels, drops blank ones, and removes duplicates while keeping the first occurrence
pub fn normalize_labels(labels: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();

    labels
        .iter()
        .map(|label| label.trim())
        .filter(|label| !label.is_empty() && seen.insert(*label))
        .map(str::to_owned)
        .collect()
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader {
        /// All of the owner's tasks, in insertion order
        async fn tasks_for_owner(
            &self,
            owner_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;
        async fn owner_task_by_id(
            &self,
            owner_id: &str,
            task_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error>;
    }

    pub trait TaskWriter {
        async fn insert_task(
            &self,
            task: &Task,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        /// Overwrites the stored task with the same ID and owner. Returns false if no such task exists.
        async fn update_task(
            &self,
            task: &Task,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;

        /// Returns false if the owner has no task with the given ID
        async fn delete_task(
            &self,
            owner_id: &str,
            task_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;

        async fn delete_tasks_for_owner(
            &self,
            owner_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum TaskError {
        #[error("the requested task does not exist")]
        NotFound,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait TaskPort {
        async fn list_tasks(
            &self,
            owner_id: &str,
            query: &TaskQuery,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<TaskPage, TaskError>;
        async fn task_by_id(
            &self,
            owner_id: &str,
            task_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Task, TaskError>;
        async fn create_task(
            &self,
            owner_id: &str,
            task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;
        async fn update_task(
            &self,
            owner_id: &str,
            task_id: &str,
            update: &UpdateTask,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;
        async fn delete_task(
            &self,
            owner_id: &str,
            task_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), TaskError>;
        /// Distinct categories across the owner's tasks, most used first
        async fn categories(
            &self,
            owner_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<String>, TaskError>;
        /// Distinct tags across the owner's tasks, sorted
        async fn tags(
            &self,
            owner_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<String>, TaskError>;
        async fn task_stats(
            &self,
            owner_id: &str,
            now: &DateTime<FixedOffset>,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<TaskStats, TaskError>;
        /// Replaces all of the owner's tasks with freshly generated ones. Should be run
        /// inside a transaction so the swap is all-or-nothing.
        async fn reseed_tasks(
            &self,
            owner_id: &str,
            count: usize,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<usize, TaskError>;
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn list_tasks(
        &self,
        owner_id: &str,
        query: &TaskQuery,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<TaskPage, TaskError> {
        let tasks = task_read
            .tasks_for_owner(owner_id, &mut *ext_cxn)
            .await
            .context("listing tasks")?;

        Ok(query.run(tasks))
    }

    async fn task_by_id(
        &self,
        owner_id: &str,
        task_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<Task, TaskError> {
        task_read
            .owner_task_by_id(owner_id, task_id, &mut *ext_cxn)
            .await
            .context("fetching a task by ID")?
            .ok_or(TaskError::NotFound)
    }

    async fn create_task(
        &self,
        owner_id: &str,
        task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<Task, TaskError> {
        let now = Utc::now();
        let created_task = Task {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_owned(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            categories: normalize_labels(&task.categories),
            tags: normalize_labels(&task.tags),
            due_date: task.due_date,
            created_at: now,
            updated_at: now,
        };

        task_write
            .insert_task(&created_task, &mut *ext_cxn)
            .await
            .context("creating a task")?;

        Ok(created_task)
    }

    async fn update_task(
        &self,
        owner_id: &str,
        task_id: &str,
        update: &UpdateTask,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<Task, TaskError> {
        let Some(mut task) = task_read
            .owner_task_by_id(owner_id, task_id, &mut *ext_cxn)
            .await
            .context("looking up a task to update")?
        else {
            return Err(TaskError::NotFound);
        };

        update.apply_to(&mut task, Utc::now());
        let was_updated = task_write
            .update_task(&task, &mut *ext_cxn)
            .await
            .context("updating a task")?;
        if !was_updated {
            return Err(TaskError::NotFound);
        }

        Ok(task)
    }

    async fn delete_task(
        &self,
        owner_id: &str,
        task_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<(), TaskError> {
        let was_deleted = task_write
            .delete_task(owner_id, task_id, &mut *ext_cxn)
            .await
            .context("deleting a task")?;

        if was_deleted {
            Ok(())
        } else {
            Err(TaskError::NotFound)
        }
    }

    async fn categories(
        &self,
        owner_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<Vec<String>, TaskError> {
        let tasks = task_read
            .tasks_for_owner(owner_id, &mut *ext_cxn)
            .await
            .context("collecting task categories")?;

        let ranked = stats::rank_labels(tasks.iter().flat_map(|task| task.categories.iter()));
        Ok(ranked.into_iter().map(|entry| entry.label).collect())
    }

    async fn tags(
        &self,
        owner_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<Vec<String>, TaskError> {
        let tasks = task_read
            .tasks_for_owner(owner_id, &mut *ext_cxn)
            .await
            .context("collecting task tags")?;

        let distinct_tags: BTreeSet<String> = tasks.into_iter().flat_map(|task| task.tags).collect();
        Ok(distinct_tags.into_iter().collect())
    }

    async fn task_stats(
        &self,
        owner_id: &str,
        now: &DateTime<FixedOffset>,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<TaskStats, TaskError> {
        let tasks = task_read
            .tasks_for_owner(owner_id, &mut *ext_cxn)
            .await
            .context("computing task statistics")?;

        Ok(TaskStats::compute(&tasks, now))
    }

    async fn reseed_tasks(
        &self,
        owner_id: &str,
        count: usize,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<usize, TaskError> {
        let count = count.min(MAX_SEED_COUNT);
        let generated_tasks = {
            let mut rng = rand::thread_rng();
            seed::generate_tasks(owner_id, count, Utc::now(), &mut rng)
        };

        let removed = task_write
            .delete_tasks_for_owner(owner_id, &mut *ext_cxn)
            .await
            .context("clearing tasks before reseeding")?;
        for task in &generated_tasks {
            task_write
                .insert_task(task, &mut *ext_cxn)
                .await
                .context("inserting a seeded task")?;
        }

        info!(owner_id, removed, seeded = count, "reseeded tasks");
        Ok(count)
    }
}


#[cfg(test)]
pub mod test_util {
    use super::*;
    use crate::domain::test_util::{Connectivity, FakeImplementation};
    use chrono::TimeZone;
    use std::sync::{Mutex, RwLock};

    /// A fixed point in time for tests: the given day of March 2024 at the given hour, UTC
    pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0)
            .single()
            .expect("test timestamp should be valid")
    }

    /// A minimal task owned by the given user, with no categories, tags, or due date
    pub fn test_task(id: &str, owner_id: &str, created_at: DateTime<Utc>) -> Task {
        Task {
            id: id.to_owned(),
            owner_id: owner_id.to_owned(),
            title: format!("Task {id}"),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            categories: Vec::new(),
            tags: Vec::new(),
            due_date: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn new_task_default() -> NewTask {
        NewTask {
            title: "Something to do".to_owned(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            categories: Vec::new(),
            tags: Vec::new(),
            due_date: None,
        }
    }

    pub struct InMemoryTaskPersistence {
        pub tasks: Vec<Task>,
        pub connected: Connectivity,
    }

    impl InMemoryTaskPersistence {
        pub fn new() -> InMemoryTaskPersistence {
            InMemoryTaskPersistence {
                tasks: Vec::new(),
                connected: Connectivity::Connected,
            }
        }

        pub fn new_with_tasks(tasks: Vec<Task>) -> InMemoryTaskPersistence {
            InMemoryTaskPersistence {
                tasks,
                connected: Connectivity::Connected,
            }
        }

        pub fn new_locked() -> RwLock<InMemoryTaskPersistence> {
            RwLock::new(Self::new())
        }
    }

    impl driven_ports::TaskReader for RwLock<InMemoryTaskPersistence> {
        async fn tasks_for_owner(
            &self,
            owner_id: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error> {
            let persistence = self.read().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence
                .tasks
                .iter()
                .filter(|task| task.owner_id == owner_id)
                .cloned()
                .collect())
        }

        async fn owner_task_by_id(
            &self,
            owner_id: &str,
            task_id: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error> {
            let persistence = self.read().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence
                .tasks
                .iter()
                .find(|task| task.owner_id == owner_id && task.id == task_id)
                .cloned())
        }
    }

    impl driven_ports::TaskWriter for RwLock<InMemoryTaskPersistence> {
        async fn insert_task(
            &self,
            task: &Task,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error> {
            let mut persistence = self.write().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            persistence.tasks.push(task.clone());
            Ok(())
        }

        async fn update_task(
            &self,
            task: &Task,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error> {
            let mut persistence = self.write().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            let stored_task = persistence
                .tasks
                .iter_mut()
                .find(|stored| stored.id == task.id && stored.owner_id == task.owner_id);
            match stored_task {
                Some(stored) => {
                    *stored = task.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete_task(
            &self,
            owner_id: &str,
            task_id: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error> {
            let mut persistence = self.write().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            let before = persistence.tasks.len();
            persistence
                .tasks
                .retain(|task| !(task.owner_id == owner_id && task.id == task_id));
            Ok(persistence.tasks.len() < before)
        }

        async fn delete_tasks_for_owner(
            &self,
            owner_id: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error> {
            let mut persistence = self.write().expect("task persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            let before = persistence.tasks.len();
            persistence.tasks.retain(|task| task.owner_id != owner_id);
            Ok((before - persistence.tasks.len()) as u64)
        }
    }

    pub struct MockTaskService {
        pub list_tasks_result: FakeImplementation<(String, TaskQuery), Result<TaskPage, TaskError>>,
        pub task_by_id_result: FakeImplementation<(String, String), Result<Task, TaskError>>,
        pub create_task_result: FakeImplementation<(String, NewTask), Result<Task, TaskError>>,
        pub update_task_result:
            FakeImplementation<(String, String, UpdateTask), Result<Task, TaskError>>,
        pub delete_task_result: FakeImplementation<(String, String), Result<(), TaskError>>,
        pub categories_result: FakeImplementation<String, Result<Vec<String>, TaskError>>,
        pub tags_result: FakeImplementation<String, Result<Vec<String>, TaskError>>,
        pub task_stats_result:
            FakeImplementation<(String, DateTime<FixedOffset>), Result<TaskStats, TaskError>>,
        pub reseed_tasks_result: FakeImplementation<(String, usize), Result<usize, TaskError>>,
    }

    impl MockTaskService {
        pub fn new() -> MockTaskService {
            MockTaskService {
                list_tasks_result: FakeImplementation::new(),
                task_by_id_result: FakeImplementation::new(),
                create_task_result: FakeImplementation::new(),
                update_task_result: FakeImplementation::new(),
                delete_task_result: FakeImplementation::new(),
                categories_result: FakeImplementation::new(),
                tags_result: FakeImplementation::new(),
                task_stats_result: FakeImplementation::new(),
                reseed_tasks_result: FakeImplementation::new(),
            }
        }

        pub fn new_locked() -> Mutex<MockTaskService> {
            Mutex::new(Self::new())
        }
    }

    impl driving_ports::TaskPort for Mutex<MockTaskService> {
        async fn list_tasks(
            &self,
            owner_id: &str,
            query: &TaskQuery,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_read: &impl TaskReader,
        ) -> Result<TaskPage, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .list_tasks_result
                .save_arguments((owner_id.to_owned(), query.clone()));

            locked_self.list_tasks_result.return_value_result()
        }

        async fn task_by_id(
            &self,
            owner_id: &str,
            task_id: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_read: &impl TaskReader,
        ) -> Result<Task, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .task_by_id_result
                .save_arguments((owner_id.to_owned(), task_id.to_owned()));

            locked_self.task_by_id_result.return_value_result()
        }

        async fn create_task(
            &self,
            owner_id: &str,
            task: &NewTask,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_write: &impl TaskWriter,
        ) -> Result<Task, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .create_task_result
                .save_arguments((owner_id.to_owned(), task.clone()));

            locked_self.create_task_result.return_value_result()
        }

        async fn update_task(
            &self,
            owner_id: &str,
            task_id: &str,
            update: &UpdateTask,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_read: &impl TaskReader,
            _task_write: &impl TaskWriter,
        ) -> Result<Task, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self.update_task_result.save_arguments((
                owner_id.to_owned(),
                task_id.to_owned(),
                update.clone(),
            ));

            locked_self.update_task_result.return_value_result()
        }

        async fn delete_task(
            &self,
            owner_id: &str,
            task_id: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_write: &impl TaskWriter,
        ) -> Result<(), TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .delete_task_result
                .save_arguments((owner_id.to_owned(), task_id.to_owned()));

            locked_self.delete_task_result.return_value_result()
        }

        async fn categories(
            &self,
            owner_id: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_read: &impl TaskReader,
        ) -> Result<Vec<String>, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self.categories_result.save_arguments(owner_id.to_owned());

            locked_self.categories_result.return_value_result()
        }

        async fn tags(
            &self,
            owner_id: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_read: &impl TaskReader,
        ) -> Result<Vec<String>, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self.tags_result.save_arguments(owner_id.to_owned());

            locked_self.tags_result.return_value_result()
        }

        async fn task_stats(
            &self,
            owner_id: &str,
            now: &DateTime<FixedOffset>,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_read: &impl TaskReader,
        ) -> Result<TaskStats, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .task_stats_result
                .save_arguments((owner_id.to_owned(), *now));

            locked_self.task_stats_result.return_value_result()
        }

        async fn reseed_tasks(
            &self,
            owner_id: &str,
            count: usize,
            _ext_cxn: &mut impl ExternalConnectivity,
            _task_write: &impl TaskWriter,
        ) -> Result<usize, TaskError> {
            let mut locked_self = self.lock().expect("mock task service mutex poisoned");
            locked_self
                .reseed_tasks_result
                .save_arguments((owner_id.to_owned(), count));

            locked_self.reseed_tasks_result.return_value_result()
        }
    }
}
