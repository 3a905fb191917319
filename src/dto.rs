use chrono::{DateTime, SecondsFormat, Utc};
use utoipa::OpenApi;

pub mod stats;
pub mod task;
pub mod user;

pub use stats::*;
pub use task::*;
pub use user::*;

/// Timestamps go over the wire as RFC 3339 in UTC with millisecond precision
pub(crate) fn wire_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(OpenApi)]
#[openapi(components(
    schemas(
        task::TaskStatus,
        task::TaskPriority,
        task::Task,
        task::TaskPage,
        task::NewTask,
        task::UpdateTask,
        task::DeletedTask,
        task::CategoryList,
        task::TagList,
        task::SeedResult,
        stats::TaskStats,
        stats::StatusBreakdown,
        stats::PriorityBreakdown,
        stats::TagCount,
        stats::CreatedDateRange,
        user::RegisterUser,
        user::LogIn,
        user::UserProfile,
        user::AuthSession,
    ),
    responses(crate::routing_utils::BasicErrorResponse),
))]
pub struct OpenApiSchemas;
