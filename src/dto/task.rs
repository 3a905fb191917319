use crate::domain;
use crate::domain::task::query::{
    self, ExactFilter, SortDirection, SortKey, TaskQuery, parse_flag, parse_page,
    parse_page_size, parse_search_text, split_labels,
};
use crate::dto::wire_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

/// Wire representation of a task's status
#[derive(Serialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(test, derive(Deserialize))]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl From<domain::task::TaskStatus> for TaskStatus {
    fn from(value: domain::task::TaskStatus) -> Self {
        match value {
            domain::task::TaskStatus::Todo => TaskStatus::Todo,
            domain::task::TaskStatus::InProgress => TaskStatus::InProgress,
            domain::task::TaskStatus::Done => TaskStatus::Done,
        }
    }
}

/// Wire representation of a task's priority
#[derive(Serialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(test, derive(Deserialize))]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl From<domain::task::TaskPriority> for TaskPriority {
    fn from(value: domain::task::TaskPriority) -> Self {
        match value {
            domain::task::TaskPriority::Low => TaskPriority::Low,
            domain::task::TaskPriority::Medium => TaskPriority::Medium,
            domain::task::TaskPriority::High => TaskPriority::High,
        }
    }
}

/// DTO for a returned task on the API
#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize))]
pub struct Task {
    #[schema(example = "0b7f3f7e-2a8d-4bb4-9d54-5e0a1e0c8a51")]
    pub id: String,
    #[schema(example = "Write the quarterly report")]
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Always the first entry of `categories`, or null when there are none
    #[schema(example = "work")]
    pub category: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    #[schema(example = "2024-03-15T17:00:00.000Z")]
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub owner_id: String,
}

impl From<domain::task::Task> for Task {
    fn from(value: domain::task::Task) -> Self {
        Task {
            category: value.category().map(str::to_owned),
            due_date: value.due_date.as_ref().map(wire_timestamp),
            created_at: wire_timestamp(&value.created_at),
            updated_at: wire_timestamp(&value.updated_at),
            status: value.status.into(),
            priority: value.priority.into(),
            id: value.id,
            title: value.title,
            description: value.description,
            categories: value.categories,
            tags: value.tags,
            owner_id: value.owner_id,
        }
    }
}

/// One page of a task listing
#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize))]
pub struct TaskPage {
    #[schema(example = 1)]
    pub page: usize,
    #[schema(example = 20)]
    pub page_size: usize,
    /// Number of tasks matching the filters across every page
    #[schema(example = 57)]
    pub total: usize,
    #[schema(example = 3)]
    pub total_pages: usize,
    pub data: Vec<Task>,
}

impl From<query::TaskPage> for TaskPage {
    fn from(value: query::TaskPage) -> Self {
        TaskPage {
            page: value.page,
            page_size: value.page_size,
            total: value.total,
            total_pages: value.total_pages,
            data: value.data.into_iter().map(Task::from).collect(),
        }
    }
}

/// Query string accepted when listing tasks. Every value is read leniently:
/// anything unreadable falls back to its default instead of failing the request.
#[derive(Deserialize, IntoParams, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListTasksParams {
    /// 1-based page number
    pub page: Option<String>,
    /// Tasks per page, at most 100
    pub page_size: Option<String>,
    /// todo, in-progress, or done
    pub status: Option<String>,
    /// low, medium, or high
    pub priority: Option<String>,
    /// Comma-separated categories, any of which may match
    pub category: Option<String>,
    /// Same as `category`, the two are merged
    pub categories: Option<String>,
    /// Comma-separated tags, all of which must match
    pub tags: Option<String>,
    /// Case-insensitive text searched for in title and description
    pub q: Option<String>,
    /// Inclusive lower bound on the due date
    pub due_from: Option<String>,
    /// Inclusive upper bound on the due date
    pub due_to: Option<String>,
    /// "true" hides tasks that are done
    pub exclude_done: Option<String>,
    /// title, priority, status, dueDate, or createdAt
    pub sort_by: Option<String>,
    /// asc or desc
    pub sort_dir: Option<String>,
}

/// Query pairs in arrival order. A key sent more than once keeps its first value.
impl From<Vec<(String, String)>> for ListTasksParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let mut params = ListTasksParams::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut params.page,
                "pageSize" => &mut params.page_size,
                "status" => &mut params.status,
                "priority" => &mut params.priority,
                "category" => &mut params.category,
                "categories" => &mut params.categories,
                "tags" => &mut params.tags,
                "q" => &mut params.q,
                "dueFrom" => &mut params.due_from,
                "dueTo" => &mut params.due_to,
                "excludeDone" => &mut params.exclude_done,
                "sortBy" => &mut params.sort_by,
                "sortDir" => &mut params.sort_dir,
                _ => continue,
            };
            slot.get_or_insert(value);
        }

        params
    }
}

impl From<ListTasksParams> for TaskQuery {
    fn from(value: ListTasksParams) -> Self {
        let mut categories = split_labels(value.category.as_deref());
        categories.extend(split_labels(value.categories.as_deref()));

        TaskQuery {
            page: parse_page(value.page.as_deref()),
            page_size: parse_page_size(value.page_size.as_deref()),
            status: ExactFilter::parse(value.status.as_deref()),
            priority: ExactFilter::parse(value.priority.as_deref()),
            categories,
            tags: split_labels(value.tags.as_deref()),
            text: parse_search_text(value.q.as_deref()),
            due_from: query::parse_timestamp(value.due_from.as_deref()),
            due_to: query::parse_timestamp(value.due_to.as_deref()),
            exclude_done: parse_flag(value.exclude_done.as_deref()),
            sort_key: SortKey::parse(value.sort_by.as_deref()),
            sort_direction: SortDirection::parse(value.sort_dir.as_deref()),
        }
    }
}

/// Lets a field tell "sent as null" (`Some(None)`) apart from "not sent" (`None`)
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn invalid_field(code: &'static str, message: String, value: &str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error.add_param(Cow::from("value"), &value);
    error
}

/// Parses an enumerated field, recording a validation error if the value names no variant
fn parse_choice<T: FromStr>(
    field: &'static str,
    raw: Option<&str>,
    allowed: &str,
    errors: &mut ValidationErrors,
) -> Option<T> {
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(
                field,
                invalid_field("enum", format!("{field} must be one of {allowed}"), raw),
            );
            None
        }
    }
}

fn parse_due_date(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let parsed = query::parse_timestamp(Some(raw));
    if parsed.is_none() {
        errors.add(
            "dueDate",
            invalid_field(
                "timestamp",
                "dueDate must be an ISO 8601 date or timestamp".to_owned(),
                raw,
            ),
        );
    }

    parsed
}

const STATUS_CHOICES: &str = "todo, in-progress, done";
const PRIORITY_CHOICES: &str = "low, medium, high";

/// DTO for creating a new task via the API. Only the title is required.
#[derive(Deserialize, Validate, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTask {
    #[validate(required, length(min = 1, message = "title must not be empty"))]
    #[schema(example = "Write the quarterly report")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "todo")]
    pub status: Option<String>,
    #[schema(example = "medium")]
    pub priority: Option<String>,
    /// Becomes the primary category when `categories` is not sent
    pub category: Option<String>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    #[schema(example = "2024-03-15T17:00:00.000Z")]
    pub due_date: Option<String>,
}

impl TryFrom<NewTask> for domain::task::NewTask {
    type Error = ValidationErrors;

    fn try_from(value: NewTask) -> Result<Self, Self::Error> {
        let mut errors = value.validate().err().unwrap_or_else(ValidationErrors::new);
        let status = parse_choice("status", value.status.as_deref(), STATUS_CHOICES, &mut errors);
        let priority = parse_choice(
            "priority",
            value.priority.as_deref(),
            PRIORITY_CHOICES,
            &mut errors,
        );
        let due_date = parse_due_date(value.due_date.as_deref(), &mut errors);
        if !errors.errors().is_empty() {
            return Err(errors);
        }

        let categories = match (value.categories, value.category) {
            (Some(categories), _) => categories,
            (None, Some(category)) => vec![category],
            (None, None) => Vec::new(),
        };

        Ok(domain::task::NewTask {
            title: value.title.unwrap_or_default(),
            description: value.description.unwrap_or_default(),
            status: status.unwrap_or_default(),
            priority: priority.unwrap_or_default(),
            categories,
            tags: value.tags.unwrap_or_default(),
            due_date,
        })
    }
}

/// DTO for changing a task via the API. Fields that are left out stay as they are.
#[derive(Deserialize, Validate, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Replaces the primary category. Null removes every category.
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    /// Replaces the whole category list and wins over `category`
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    /// Null clears the due date
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, example = "2024-03-15T17:00:00.000Z")]
    pub due_date: Option<Option<String>>,
}

impl TryFrom<UpdateTask> for domain::task::UpdateTask {
    type Error = ValidationErrors;

    fn try_from(value: UpdateTask) -> Result<Self, Self::Error> {
        let mut errors = value.validate().err().unwrap_or_else(ValidationErrors::new);
        let status = parse_choice("status", value.status.as_deref(), STATUS_CHOICES, &mut errors);
        let priority = parse_choice(
            "priority",
            value.priority.as_deref(),
            PRIORITY_CHOICES,
            &mut errors,
        );
        let due_date = value
            .due_date
            .map(|due_date| parse_due_date(due_date.as_deref(), &mut errors));
        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(domain::task::UpdateTask {
            title: value.title,
            description: value.description,
            status,
            priority,
            primary_category: value.category,
            categories: value.categories,
            tags: value.tags,
            due_date,
        })
    }
}

/// Confirms a task was removed
#[derive(Serialize, ToSchema, Debug)]
#[cfg_attr(test, derive(Deserialize))]
pub struct DeletedTask {
    #[schema(example = true)]
    pub deleted: bool,
    pub id: String,
}

#[derive(Serialize, ToSchema, Debug)]
#[cfg_attr(test, derive(Deserialize))]
pub struct CategoryList {
    /// Most used first
    #[schema(example = json!(["work", "home", "learning"]))]
    pub categories: Vec<String>,
}

#[derive(Serialize, ToSchema, Debug)]
#[cfg_attr(test, derive(Deserialize))]
pub struct TagList {
    /// Alphabetical
    #[schema(example = json!(["bug", "docs", "feature"]))]
    pub tags: Vec<String>,
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct SeedParams {
    /// How many tasks to generate. Defaults to 400, at most 5000.
    pub n: Option<String>,
}

impl From<Vec<(String, String)>> for SeedParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        SeedParams {
            n: pairs
                .into_iter()
                .find_map(|(key, value)| (key == "n").then_some(value)),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
#[cfg_attr(test, derive(Deserialize))]
pub struct SeedResult {
    #[schema(example = 400)]
    pub seeded: usize,
}
