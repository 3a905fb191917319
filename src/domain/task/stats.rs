use super::{Task, TaskPriority, TaskStatus};
use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};

pub const TOP_TAG_LIMIT: usize = 10;
const UPCOMING_DAYS: i64 = 7;

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct StatusCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Aggregate figures over every task a user owns
#[derive(Debug, PartialEq)]
#[cfg_attr(test, derive(Clone))]
pub struct TaskStats {
    pub total: usize,
    pub by_status: StatusCounts,
    pub by_priority: PriorityCounts,
    pub by_category: BTreeMap<String, usize>,
    pub overdue: usize,
    pub due_today: usize,
    pub upcoming_7_days: usize,
    /// Percentage of tasks that are done, rounded to the nearest whole number
    pub completion_rate: u8,
    pub top_tags: Vec<LabelCount>,
    pub earliest_created: Option<DateTime<Utc>>,
    pub latest_created: Option<DateTime<Utc>>,
}

/// The day boundaries due dates are bucketed against, anchored on the caller's local day
#[derive(Debug, PartialEq, Eq)]
pub struct DueWindows {
    pub start_of_today: DateTime<Utc>,
    pub end_of_today: DateTime<Utc>,
    pub end_of_upcoming: DateTime<Utc>,
}

impl DueWindows {
    pub fn around(now: &DateTime<FixedOffset>) -> DueWindows {
        let local_midnight = now.date_naive().and_time(NaiveTime::MIN);
        let start_of_today = now
            .offset()
            .from_local_datetime(&local_midnight)
            .single()
            .map(|midnight| midnight.with_timezone(&Utc))
            .unwrap_or_else(|| local_midnight.and_utc());
        let end_of_today = start_of_today + Duration::days(1) - Duration::milliseconds(1);

        DueWindows {
            start_of_today,
            end_of_today,
            end_of_upcoming: end_of_today + Duration::days(UPCOMING_DAYS),
        }
    }
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: &DateTime<FixedOffset>) -> TaskStats {
        let windows = DueWindows::around(now);
        let mut by_status = StatusCounts::default();
        let mut by_priority = PriorityCounts::default();
        let mut by_category = BTreeMap::new();
        let mut overdue = 0;
        let mut due_today = 0;
        let mut upcoming_7_days = 0;

        for task in tasks {
            match task.status {
                TaskStatus::Todo => by_status.todo += 1,
                TaskStatus::InProgress => by_status.in_progress += 1,
                TaskStatus::Done => by_status.done += 1,
            }
            match task.priority {
                TaskPriority::Low => by_priority.low += 1,
                TaskPriority::Medium => by_priority.medium += 1,
                TaskPriority::High => by_priority.high += 1,
            }
            for category in &task.categories {
                *by_category.entry(category.clone()).or_insert(0) += 1;
            }

            let Some(due_date) = task.due_date else {
                continue;
            };
            if due_date < windows.start_of_today && task.status != TaskStatus::Done {
                overdue += 1;
            }
            if windows.start_of_today <= due_date && due_date <= windows.end_of_today {
                due_today += 1;
            }
            if windows.end_of_today < due_date && due_date <= windows.end_of_upcoming {
                upcoming_7_days += 1;
            }
        }

        let total = tasks.len();
        let completion_rate = if total == 0 {
            0
        } else {
            (by_status.done as f64 * 100.0 / total as f64).round() as u8
        };
        let mut top_tags = rank_labels(tasks.iter().flat_map(|task| task.tags.iter()));
        top_tags.truncate(TOP_TAG_LIMIT);

        TaskStats {
            total,
            by_status,
            by_priority,
            by_category,
            overdue,
            due_today,
            upcoming_7_days,
            completion_rate,
            top_tags,
            earliest_created: tasks.iter().map(|task| task.created_at).min(),
            latest_created: tasks.iter().map(|task| task.created_at).max(),
        }
    }
}

/// Counts label occurrences and orders them most frequent first. Equal counts keep
/// the order in which the labels were first seen.
pub fn rank_labels<'a>(labels: impl IntoIterator<Item = &'a String>) -> Vec<LabelCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut ranked: Vec<LabelCount> = Vec::new();

    for label in labels {
        match positions.get(label.as_str()) {
            Some(&position) => ranked[position].count += 1,
            None => {
                positions.insert(label.as_str(), ranked.len());
                ranked.push(LabelCount {
                    label: label.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable, which preserves first-seen order among ties
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}
