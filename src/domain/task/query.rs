use super::{Task, TaskPriority, TaskStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Datetime layouts accepted for due date bounds when no offset is given. These are read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Title,
    Priority,
    Status,
    DueDate,
    #[default]
    CreatedAt,
}

impl SortKey {
    /// Unknown or missing keys fall back to creation time
    pub fn parse(raw: Option<&str>) -> SortKey {
        match raw.map(str::trim) {
            Some("title") => SortKey::Title,
            Some("priority") => SortKey::Priority,
            Some("status") => SortKey::Status,
            Some("dueDate") => SortKey::DueDate,
            _ => SortKey::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(raw: Option<&str>) -> SortDirection {
        match raw {
            Some(direction) if direction.trim().eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

/// An exact-match filter on an enumerated field. A value that names no variant
/// still filters, it just can never match anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExactFilter<T> {
    Is(T),
    NoMatch,
}

impl<T: FromStr + PartialEq> ExactFilter<T> {
    /// Returns None when the filter was not supplied or is blank. Anything else is compared
    /// exactly as sent, surrounding whitespace included.
    pub fn parse(raw: Option<&str>) -> Option<ExactFilter<T>> {
        let raw = raw?;
        if raw.trim().is_empty() {
            return None;
        }

        Some(match raw.parse() {
            Ok(value) => ExactFilter::Is(value),
            Err(_) => ExactFilter::NoMatch,
        })
    }

    pub fn matches(&self, value: &T) -> bool {
        match self {
            ExactFilter::Is(expected) => expected == value,
            ExactFilter::NoMatch => false,
        }
    }
}

/// Everything needed to filter, order, and paginate one owner's tasks
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    pub page: usize,
    pub page_size: usize,
    pub status: Option<ExactFilter<TaskStatus>>,
    pub priority: Option<ExactFilter<TaskPriority>>,
    /// A task matches if it carries any of these
    pub categories: Vec<String>,
    /// A task matches only if it carries all of these
    pub tags: Vec<String>,
    /// Already lowercased
    pub text: Option<String>,
    pub due_from: Option<DateTime<Utc>>,
    pub due_to: Option<DateTime<Utc>>,
    pub exclude_done: bool,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for TaskQuery {
    fn default() -> Self {
        TaskQuery {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            status: None,
            priority: None,
            categories: Vec::new(),
            tags: Vec::new(),
            text: None,
            due_from: None,
            due_to: None,
            exclude_done: false,
            sort_key: SortKey::default(),
            sort_direction: SortDirection::default(),
        }
    }
}

/// One page of query results
#[derive(Debug, PartialEq)]
#[cfg_attr(test, derive(Clone))]
pub struct TaskPage {
    pub page: usize,
    pub page_size: usize,
    /// Number of tasks matching the filters across all pages
    pub total: usize,
    pub total_pages: usize,
    pub data: Vec<Task>,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        self.status
            .as_ref()
            .is_none_or(|filter| filter.matches(&task.status))
            && self
                .priority
                .as_ref()
                .is_none_or(|filter| filter.matches(&task.priority))
            && !(self.exclude_done && task.status == TaskStatus::Done)
            && self.matches_text(task)
            && self.matches_due_window(task)
            && (self.categories.is_empty()
                || task
                    .categories
                    .iter()
                    .any(|category| self.categories.contains(category)))
            && self.tags.iter().all(|tag| task.tags.contains(tag))
    }

    fn matches_text(&self, task: &Task) -> bool {
        let Some(ref needle) = self.text else {
            return true;
        };

        task.title.to_lowercase().contains(needle.as_str())
            || task.description.to_lowercase().contains(needle.as_str())
    }

    /// Tasks without a due date never fall inside a bounded window
    fn matches_due_window(&self, task: &Task) -> bool {
        if self.due_from.is_none() && self.due_to.is_none() {
            return true;
        }
        let Some(due_date) = task.due_date else {
            return false;
        };

        self.due_from.is_none_or(|from| due_date >= from)
            && self.due_to.is_none_or(|to| due_date <= to)
    }

    /// Orders by the sort key, then newest first, then by ID so pages never shuffle
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let by_key = match self.sort_key {
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Priority => a.priority.as_str().cmp(b.priority.as_str()),
            SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
            // None orders before Some, so tasks without a due date lead in ascending order
            SortKey::DueDate => a.due_date.cmp(&b.due_date),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let directed = match self.sort_direction {
            SortDirection::Asc => by_key,
            SortDirection::Desc => by_key.reverse(),
        };

        directed
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }

    /// Filters, sorts, and slices the given tasks into the requested page
    pub fn run(&self, tasks: Vec<Task>) -> TaskPage {
        let mut matching: Vec<Task> = tasks.into_iter().filter(|task| self.matches(task)).collect();
        matching.sort_by(|a, b| self.compare(a, b));

        let total = matching.len();
        let offset = (self.page - 1).saturating_mul(self.page_size);
        let data = matching
            .into_iter()
            .skip(offset)
            .take(self.page_size)
            .collect();

        TaskPage {
            page: self.page,
            page_size: self.page_size,
            total,
            total_pages: total.div_ceil(self.page_size),
            data,
        }
    }
}

/// Any positive integer is a valid page. Everything else means the first one.
pub fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|page| page.trim().parse::<usize>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

pub fn parse_page_size(raw: Option<&str>) -> usize {
    raw.and_then(|size| size.trim().parse::<usize>().ok())
        .filter(|size| *size > 0)
        .map(|size| size.min(MAX_PAGE_SIZE))
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|flag| flag.trim().eq_ignore_ascii_case("true"))
}

/// Splits a comma-separated list, dropping blank entries
pub fn split_labels(raw: Option<&str>) -> Vec<String> {
    raw.map(|labels| {
        labels
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

pub fn parse_search_text(raw: Option<&str>) -> Option<String> {
    raw.filter(|text| !text.trim().is_empty())
        .map(str::to_lowercase)
}

/// Reads a due date bound. Accepts RFC 3339, a datetime without offset (taken as UTC),
/// or a bare date (taken as UTC midnight). Unreadable values impose no bound.
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}
