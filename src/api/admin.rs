use crate::auth::AuthenticatedUser;
use crate::domain::task::driving_ports::TaskPort;
use crate::domain::task::{DEFAULT_SEED_COUNT, MAX_SEED_COUNT};
use crate::external_connections::{TransactableExternalConnectivity, TransactionHandle};
use crate::persistence::db_task_driven_ports::DbTaskWriter;
use crate::routing_utils::{BasicErrorResponse, GenericErrorResponse, Json, Query};
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::State;
use axum::response::ErrorResponse;
use axum::routing::post;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(reseed_tasks))]
pub struct AdminApi;

pub fn admin_routes() -> Router<Arc<SharedData>> {
    Router::new().route(
        "/seed",
        post(
            |State(app_state): AppState,
             user: AuthenticatedUser,
             Query(params): Query<Vec<(String, String)>>| async move {
                let task_service = domain::task::TaskService {};

                reseed_tasks(&user, params.into(), &app_state.ext_cxn, &task_service).await
            },
        ),
    )
}

/// Reads the requested task count. Anything that isn't a positive whole number falls back to the default.
fn requested_count(params: &dto::SeedParams) -> usize {
    params
        .n
        .as_deref()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|count| *count > 0)
        .unwrap_or(DEFAULT_SEED_COUNT)
        .min(MAX_SEED_COUNT)
}

/// Throws away every task the caller owns and replaces them with generated ones
#[utoipa::path(
    post,
    path = "/api/admin/seed",
    tag = "admin",
    params(dto::SeedParams),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "The caller's tasks were replaced", body = dto::SeedResult),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
async fn reseed_tasks(
    user: &AuthenticatedUser,
    params: dto::SeedParams,
    ext_cxn: &impl TransactableExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::SeedResult>, ErrorResponse> {
    let count = requested_count(&params);
    info!(owner_id = %user.user_id, "Reseeding with {count} tasks");
    let task_writer = DbTaskWriter {};

    let mut transaction = ext_cxn
        .start_transaction()
        .await
        .map_err(GenericErrorResponse)?;
    let seeded = task_service
        .reseed_tasks(&user.user_id, count, &mut transaction, &task_writer)
        .await
        .map_err(|err| GenericErrorResponse(err.into()))?;
    transaction.commit().await.map_err(GenericErrorResponse)?;

    Ok(Json(dto::SeedResult { seeded }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_util::deserialize_body;
    use crate::domain::task::driving_ports::TaskError;
    use crate::domain::task::test_util::MockTaskService;
    use crate::external_connections;
    use anyhow::anyhow;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Mutex;

    fn caller() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "owner-1".to_owned(),
            email: "someone@example.com".to_owned(),
            name: "Someone".to_owned(),
        }
    }

    fn params(n: Option<&str>) -> dto::SeedParams {
        dto::SeedParams {
            n: n.map(str::to_owned),
        }
    }

    #[test]
    fn count_defaults_and_caps() {
        assert_eq!(DEFAULT_SEED_COUNT, requested_count(&params(None)));
        assert_eq!(DEFAULT_SEED_COUNT, requested_count(&params(Some("lots"))));
        assert_eq!(DEFAULT_SEED_COUNT, requested_count(&params(Some("0"))));
        assert_eq!(DEFAULT_SEED_COUNT, requested_count(&params(Some("-3"))));
        assert_eq!(25, requested_count(&params(Some("25"))));
        assert_eq!(MAX_SEED_COUNT, requested_count(&params(Some("999999"))));
    }

    #[tokio::test]
    async fn happy_path() {
        let mut task_service_raw = MockTaskService::new();
        let ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
        task_service_raw.reseed_tasks_result.set_returned_result(Ok(25));
        let task_service = Mutex::new(task_service_raw);

        let response = reseed_tasks(&caller(), params(Some("25")), &ext_cxn, &task_service)
            .await
            .into_response();
        assert_eq!(StatusCode::OK, response.status());

        let body: dto::SeedResult = deserialize_body(response.into_body()).await;
        assert_eq!(25, body.seeded);

        let locked_task_service = task_service.lock().expect("task service mutex poisoned");
        assert!(matches!(
            locked_task_service.reseed_tasks_result.calls(),
            [(owner_id, 25)] if owner_id == "owner-1"
        ));
    }

    #[tokio::test]
    async fn returns_500_on_port_failure() {
        let mut task_service_raw = MockTaskService::new();
        let ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
        task_service_raw
            .reseed_tasks_result
            .set_returned_result(Err(TaskError::PortError(anyhow!("disk full"))));
        let task_service = Mutex::new(task_service_raw);

        let response = reseed_tasks(&caller(), params(None), &ext_cxn, &task_service)
            .await
            .into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    }
}
