use crate::auth::AuthenticatedUser;
use crate::domain::task::driving_ports::{TaskError, TaskPort};
use crate::domain::task::query::TaskQuery;
use crate::external_connections::{
    ExternalConnectivity, TransactableExternalConnectivity, TransactionHandle,
};
use crate::persistence::db_task_driven_ports::{DbTaskReader, DbTaskWriter};
use crate::routing_utils::{
    BasicErrorResponse, GenericErrorResponse, Json, NotFoundResponse, Query,
    ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::get;
use chrono::{DateTime, FixedOffset, Local};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(
    list_tasks,
    create_task,
    task_by_id,
    update_task,
    delete_task,
    task_categories,
    task_tags,
    task_stats
))]
pub struct TaskApi;

/// Builds a router for every task route. All of them act on the caller's own tasks.
pub fn task_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(
                |State(app_state): AppState,
                 user: AuthenticatedUser,
                 Query(params): Query<Vec<(String, String)>>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    list_tasks(&user, params.into(), &mut ext_cxn, &task_service).await
                },
            )
            .post(
                |State(app_state): AppState,
                 user: AuthenticatedUser,
                 Json(new_task): Json<dto::NewTask>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    create_task(&user, new_task, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/stats",
            get(|State(app_state): AppState, user: AuthenticatedUser| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let task_service = domain::task::TaskService {};
                let now = Local::now().fixed_offset();

                task_stats(&user, now, &mut ext_cxn, &task_service).await
            }),
        )
        .route(
            "/meta/categories",
            get(|State(app_state): AppState, user: AuthenticatedUser| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let task_service = domain::task::TaskService {};

                task_categories(&user, &mut ext_cxn, &task_service).await
            }),
        )
        .route(
            "/meta/tags",
            get(|State(app_state): AppState, user: AuthenticatedUser| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let task_service = domain::task::TaskService {};

                task_tags(&user, &mut ext_cxn, &task_service).await
            }),
        )
        .route(
            "/:task_id",
            get(
                |State(app_state): AppState,
                 user: AuthenticatedUser,
                 Path(task_id): Path<String>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    task_by_id(&user, &task_id, &mut ext_cxn, &task_service).await
                },
            )
            .put(
                |State(app_state): AppState,
                 user: AuthenticatedUser,
                 Path(task_id): Path<String>,
                 Json(update): Json<dto::UpdateTask>| async move {
                    let task_service = domain::task::TaskService {};

                    update_task(&user, &task_id, update, &app_state.ext_cxn, &task_service).await
                },
            )
            .delete(
                |State(app_state): AppState,
                 user: AuthenticatedUser,
                 Path(task_id): Path<String>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    delete_task(&user, &task_id, &mut ext_cxn, &task_service).await
                },
            ),
        )
}

/// Turns a failed task operation into the matching error response
fn task_error_response(err: TaskError) -> ErrorResponse {
    match err {
        TaskError::NotFound => NotFoundResponse("task").into(),
        TaskError::PortError(cause) => GenericErrorResponse(cause).into(),
    }
}

/// Lists the caller's tasks, filtered, sorted, and paginated
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "tasks",
    params(dto::ListTasksParams),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "One page of matching tasks", body = dto::TaskPage),
        (status = 400, response = BasicErrorResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
async fn list_tasks(
    user: &AuthenticatedUser,
    params: dto::ListTasksParams,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::TaskPage>, ErrorResponse> {
    info!(owner_id = %user.user_id, "Listing tasks");
    let query = TaskQuery::from(params);
    let task_reader = DbTaskReader {};

    let page = task_service
        .list_tasks(&user.user_id, &query, &mut *ext_cxn, &task_reader)
        .await
        .map_err(task_error_response)?;

    Ok(Json(page.into()))
}

/// Creates a task owned by the caller
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "tasks",
    request_body = dto::NewTask,
    security(("bearer_token" = [])),
    responses(
        (status = 201, description = "The task was created", body = dto::Task),
        (status = 400, response = BasicErrorResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
async fn create_task(
    user: &AuthenticatedUser,
    new_task: dto::NewTask,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<(StatusCode, Json<dto::Task>), ErrorResponse> {
    info!(owner_id = %user.user_id, "Creating a task");
    let domain_task =
        domain::task::NewTask::try_from(new_task).map_err(ValidationErrorResponse::from)?;
    let task_writer = DbTaskWriter {};

    let created_task = task_service
        .create_task(&user.user_id, &domain_task, &mut *ext_cxn, &task_writer)
        .await
        .map_err(task_error_response)?;

    Ok((StatusCode::CREATED, Json(created_task.into())))
}

/// Retrieves one of the caller's tasks
#[utoipa::path(
    get,
    path = "/api/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = String, Path, description = "ID of the task")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "The task", body = dto::Task),
        (status = 401, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
async fn task_by_id(
    user: &AuthenticatedUser,
    task_id: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::Task>, ErrorResponse> {
    info!(owner_id = %user.user_id, "Get task {task_id}");
    let task_reader = DbTaskReader {};

    let task = task_service
        .task_by_id(&user.user_id, task_id, &mut *ext_cxn, &task_reader)
        .await
        .map_err(task_error_response)?;

    Ok(Json(task.into()))
}

/// Changes the fields of one of the caller's tasks. Fields left out of the body stay as they are.
#[utoipa::path(
    put,
    path = "/api/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = String, Path, description = "ID of the task")),
    request_body = dto::UpdateTask,
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "The task after the update", body = dto::Task),
        (status = 400, response = BasicErrorResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
async fn update_task(
    user: &AuthenticatedUser,
    task_id: &str,
    update: dto::UpdateTask,
    ext_cxn: &impl TransactableExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::Task>, ErrorResponse> {
    info!(owner_id = %user.user_id, "Updating task {task_id}");
    let domain_update =
        domain::task::UpdateTask::try_from(update).map_err(ValidationErrorResponse::from)?;
    let task_reader = DbTaskReader {};
    let task_writer = DbTaskWriter {};

    let mut transaction = ext_cxn
        .start_transaction()
        .await
        .map_err(GenericErrorResponse)?;
    let updated_task = task_service
        .update_task(
            &user.user_id,
            task_id,
            &domain_update,
            &mut transaction,
            &task_reader,
            &task_writer,
        )
        .await
        .map_err(task_error_response)?;
    transaction.commit().await.map_err(GenericErrorResponse)?;

    Ok(Json(updated_task.into()))
}

/// Deletes one of the caller's tasks
#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}",
    tag = "tasks",
    params(("task_id" = String, Path, description = "ID of the task")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "The task was deleted", body = dto::DeletedTask),
        (status = 401, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
async fn delete_task(
    user: &AuthenticatedUser,
    task_id: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::DeletedTask>, ErrorResponse> {
    info!(owner_id = %user.user_id, "Deleting task {task_id}");
    let task_writer = DbTaskWriter {};

    task_service
        .delete_task(&user.user_id, task_id, &mut *ext_cxn, &task_writer)
        .await
        .map_err(task_error_response)?;

    Ok(Json(dto::DeletedTask {
        deleted: true,
        id: task_id.to_owned(),
    }))
}

/// Lists the categories in use across the caller's tasks, most used first
#[utoipa::path(
    get,
    path = "/api/tasks/meta/categories",
    tag = "tasks",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Distinct categories", body = dto::CategoryList),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
async fn task_categories(
    user: &AuthenticatedUser,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::CategoryList>, ErrorResponse> {
    info!(owner_id = %user.user_id, "Listing task categories");
    let task_reader = DbTaskReader {};

    let categories = task_service
        .categories(&user.user_id, &mut *ext_cxn, &task_reader)
        .await
        .map_err(task_error_response)?;

    Ok(Json(dto::CategoryList { categories }))
}

/// Lists the tags in use across the caller's tasks, alphabetically
#[utoipa::path(
    get,
    path = "/api/tasks/meta/tags",
    tag = "tasks",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Distinct tags", body = dto::TagList),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
async fn task_tags(
    user: &AuthenticatedUser,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::TagList>, ErrorResponse> {
    info!(owner_id = %user.user_id, "Listing task tags");
    let task_reader = DbTaskReader {};

    let tags = task_service
        .tags(&user.user_id, &mut *ext_cxn, &task_reader)
        .await
        .map_err(task_error_response)?;

    Ok(Json(dto::TagList { tags }))
}

/// Summarizes the caller's tasks for a dashboard. "Today" is the server's local day.
#[utoipa::path(
    get,
    path = "/api/tasks/stats",
    tag = "tasks",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Statistics over every task the caller owns", body = dto::TaskStats),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
async fn task_stats(
    user: &AuthenticatedUser,
    now: DateTime<FixedOffset>,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::TaskStats>, ErrorResponse> {
    info!(owner_id = %user.user_id, "Computing task statistics");
    let task_reader = DbTaskReader {};

    let stats = task_service
        .task_stats(&user.user_id, &now, &mut *ext_cxn, &task_reader)
        .await
        .map_err(task_error_response)?;

    Ok(Json(stats.into()))
}
