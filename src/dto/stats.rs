use crate::domain::task::stats;
use crate::dto::wire_timestamp;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[cfg(test)]
use serde::Deserialize;

/// Count of tasks in each status. Every status is always present.
#[derive(Serialize, ToSchema, Debug)]
#[cfg_attr(test, derive(Deserialize))]
pub struct StatusBreakdown {
    pub todo: usize,
    #[serde(rename = "in-progress")]
    pub in_progress: usize,
    pub done: usize,
}

/// Count of tasks at each priority. Every priority is always present.
#[derive(Serialize, ToSchema, Debug)]
#[cfg_attr(test, derive(Deserialize))]
pub struct PriorityBreakdown {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Serialize, ToSchema, Debug)]
#[cfg_attr(test, derive(Deserialize))]
pub struct TagCount {
    #[schema(example = "bug")]
    pub tag: String,
    #[schema(example = 12)]
    pub count: usize,
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize))]
pub struct CreatedDateRange {
    pub min_created_at: Option<String>,
    pub max_created_at: Option<String>,
}

/// Dashboard statistics over every task the caller owns
#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize))]
pub struct TaskStats {
    pub total: usize,
    pub by_status: StatusBreakdown,
    pub by_priority: PriorityBreakdown,
    pub by_category: BTreeMap<String, usize>,
    /// Not done and due before today
    pub overdue: usize,
    pub due_today: usize,
    /// Due after today but within the next seven days
    #[serde(rename = "upcoming7Days")]
    pub upcoming_7_days: usize,
    /// Percentage of tasks that are done
    #[schema(example = 42)]
    pub completion_rate: u8,
    /// The ten most used tags
    pub top_tags: Vec<TagCount>,
    pub date_range: CreatedDateRange,
}

impl From<stats::TaskStats> for TaskStats {
    fn from(value: stats::TaskStats) -> Self {
        TaskStats {
            total: value.total,
            by_status: StatusBreakdown {
                todo: value.by_status.todo,
                in_progress: value.by_status.in_progress,
                done: value.by_status.done,
            },
            by_priority: PriorityBreakdown {
                low: value.by_priority.low,
                medium: value.by_priority.medium,
                high: value.by_priority.high,
            },
            by_category: value.by_category,
            overdue: value.overdue,
            due_today: value.due_today,
            upcoming_7_days: value.upcoming_7_days,
            completion_rate: value.completion_rate,
            top_tags: value
                .top_tags
                .into_iter()
                .map(|entry| TagCount {
                    tag: entry.label,
                    count: entry.count,
                })
                .collect(),
            date_range: CreatedDateRange {
                min_created_at: value.earliest_created.as_ref().map(wire_timestamp),
                max_created_at: value.latest_created.as_ref().map(wire_timestamp),
            },
        }
    }
}
