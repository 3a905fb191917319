use super::{parse_stored_timestamp, stored_timestamp};
use crate::domain;
use crate::domain::task::{Task, TaskPriority, TaskStatus};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, anyhow};
use sqlx::query_as;

const TASK_COLUMNS: &str = "id, owner_id, title, description, status, priority, category, \
     categories, tags, due_date, created_at, updated_at";

/// A task as it sits in the `tasks` table
#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    owner_id: String,
    title: String,
    description: String,
    status: String,
    priority: String,
    category: Option<String>,
    categories: Option<String>,
    tags: Option<String>,
    due_date: Option<String>,
    created_at: String,
    updated_at: String,
}

/// Reads a JSON array column. Anything that isn't an array of strings yields None.
fn decode_labels(raw: Option<&str>) -> Option<Vec<String>> {
    raw.and_then(|json| serde_json::from_str(json).ok())
}

fn encode_labels(labels: &[String]) -> Result<String, anyhow::Error> {
    serde_json::to_string(labels).context("Encoding labels as JSON")
}

impl TryFrom<TaskRow> for Task {
    type Error = anyhow::Error;

    fn try_from(value: TaskRow) -> Result<Self, Self::Error> {
        let status: TaskStatus = value
            .status
            .parse()
            .map_err(|err| anyhow!("task {} has a bad status: {err}", value.id))?;
        let priority: TaskPriority = value
            .priority
            .parse()
            .map_err(|err| anyhow!("task {} has a bad priority: {err}", value.id))?;
        // Rows written before the categories column existed only carry the single category
        let categories = decode_labels(value.categories.as_deref())
            .unwrap_or_else(|| value.category.clone().into_iter().collect());
        let due_date = value
            .due_date
            .as_deref()
            .map(|raw| parse_stored_timestamp("tasks.due_date", raw))
            .transpose()?;

        Ok(Task {
            status,
            priority,
            categories,
            tags: decode_labels(value.tags.as_deref()).unwrap_or_default(),
            due_date,
            created_at: parse_stored_timestamp("tasks.created_at", &value.created_at)?,
            updated_at: parse_stored_timestamp("tasks.updated_at", &value.updated_at)?,
            id: value.id,
            owner_id: value.owner_id,
            title: value.title,
            description: value.description,
        })
    }
}

pub struct DbTaskReader {}

impl domain::task::driven_ports::TaskReader for DbTaskReader {
    async fn tasks_for_owner(
        &self,
        owner_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let rows = query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = ? ORDER BY rowid"
        ))
        .bind(owner_id)
        .fetch_all(cxn_handle.borrow_connection())
        .await
        .context("Fetching tasks for owner")?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn owner_task_by_id(
        &self,
        owner_id: &str,
        task_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Task>, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let row = query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = ? AND id = ?"
        ))
        .bind(owner_id)
        .bind(task_id)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a task by id")?;

        row.map(Task::try_from).transpose()
    }
}

pub struct DbTaskWriter {}

impl domain::task::driven_ports::TaskWriter for DbTaskWriter {
    async fn insert_task(
        &self,
        task: &Task,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        sqlx::query(&format!(
            "INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&task.id)
        .bind(&task.owner_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.category())
        .bind(encode_labels(&task.categories)?)
        .bind(encode_labels(&task.tags)?)
        .bind(task.due_date.as_ref().map(stored_timestamp))
        .bind(stored_timestamp(&task.created_at))
        .bind(stored_timestamp(&task.updated_at))
        .execute(cxn_handle.borrow_connection())
        .await
        .context("Inserting a task")?;

        Ok(())
    }

    async fn update_task(
        &self,
        task: &Task,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let update_result = sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, status = ?, priority = ?, category = ?, \
             categories = ?, tags = ?, due_date = ?, updated_at = ? WHERE id = ? AND owner_id = ?",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.category())
        .bind(encode_labels(&task.categories)?)
        .bind(encode_labels(&task.tags)?)
        .bind(task.due_date.as_ref().map(stored_timestamp))
        .bind(stored_timestamp(&task.updated_at))
        .bind(&task.id)
        .bind(&task.owner_id)
        .execute(cxn_handle.borrow_connection())
        .await
        .context("Updating a task")?;

        Ok(update_result.rows_affected() > 0)
    }

    async fn delete_task(
        &self,
        owner_id: &str,
        task_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let delete_result = sqlx::query("DELETE FROM tasks WHERE id = ? AND owner_id = ?")
            .bind(task_id)
            .bind(owner_id)
            .execute(cxn_handle.borrow_connection())
            .await
            .context("Deleting a task")?;

        Ok(delete_result.rows_affected() > 0)
    }

    async fn delete_tasks_for_owner(
        &self,
        owner_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let delete_result = sqlx::query("DELETE FROM tasks WHERE owner_id = ?")
            .bind(owner_id)
            .execute(cxn_handle.borrow_connection())
            .await
            .context("Deleting every task for an owner")?;

        Ok(delete_result.rows_affected())
    }
}
