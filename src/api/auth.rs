use crate::auth::{AuthenticatedUser, TokenKeys};
use crate::domain::user::User;
use crate::domain::user::driving_ports::{LoginError, RegisterError, UserPort};
use crate::external_connections::ExternalConnectivity;
use crate::persistence::db_user_driven_ports::{DbDetectUser, DbReadUsers, DbWriteUsers};
use crate::routing_utils::{
    BasicErrorResponse, EmailTakenResponse, GenericErrorResponse, Json, NotFoundResponse,
    UnauthorizedResponse, ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::State;
use axum::response::ErrorResponse;
use axum::routing::{get, post};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(register, log_in, current_user))]
pub struct AuthApi;

/// Builds a router for account creation, logging in, and looking up the current caller
pub fn auth_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/register",
            post(
                |State(app_state): AppState, Json(new_user): Json<dto::RegisterUser>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    register(
                        new_user,
                        &app_state.token_keys,
                        &mut ext_cxn,
                        &user_service,
                    )
                    .await
                },
            ),
        )
        .route(
            "/login",
            post(
                |State(app_state): AppState, Json(credentials): Json<dto::LogIn>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    log_in(
                        credentials,
                        &app_state.token_keys,
                        &mut ext_cxn,
                        &user_service,
                    )
                    .await
                },
            ),
        )
        .route(
            "/me",
            get(|State(app_state): AppState, user: AuthenticatedUser| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let user_service = domain::user::UserService {};

                current_user(&user, &mut ext_cxn, &user_service).await
            }),
        )
}

fn start_session(user: User, token_keys: &TokenKeys) -> Result<dto::AuthSession, ErrorResponse> {
    let token = token_keys
        .issue(&user)
        .map_err(|err| GenericErrorResponse(anyhow::Error::new(err).context("signing a token")))?;

    Ok(dto::AuthSession {
        token,
        user: user.into(),
    })
}

/// Creates an account and logs the new user in
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = dto::RegisterUser,
    responses(
        (status = 200, description = "The account was created", body = dto::AuthSession),
        (status = 400, response = BasicErrorResponse),
        (status = 409, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
async fn register(
    new_user: dto::RegisterUser,
    token_keys: &TokenKeys,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
) -> Result<Json<dto::AuthSession>, ErrorResponse> {
    info!("Registering user {new_user}");
    let domain_user =
        domain::user::NewUser::try_from(new_user).map_err(ValidationErrorResponse::from)?;
    let user_writer = DbWriteUsers {};
    let user_detect = DbDetectUser {};

    let user = user_service
        .register(&domain_user, &mut *ext_cxn, &user_writer, &user_detect)
        .await
        .map_err(|err| -> ErrorResponse {
            match err {
                RegisterError::EmailTaken => EmailTakenResponse.into(),
                RegisterError::PortError(cause) => GenericErrorResponse(cause).into(),
            }
        })?;

    Ok(Json(start_session(user, token_keys)?))
}

/// Trades an email and password for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = dto::LogIn,
    responses(
        (status = 200, description = "The credentials were correct", body = dto::AuthSession),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
async fn log_in(
    credentials: dto::LogIn,
    token_keys: &TokenKeys,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
) -> Result<Json<dto::AuthSession>, ErrorResponse> {
    info!("Login attempt for {}", credentials.email);
    let user_reader = DbReadUsers {};

    let user = user_service
        .log_in(
            credentials.email.trim(),
            &credentials.password,
            &mut *ext_cxn,
            &user_reader,
        )
        .await
        .map_err(|err| -> ErrorResponse {
            match err {
                LoginError::InvalidCredentials => {
                    warn!("Rejected login for {}", credentials.email);
                    UnauthorizedResponse::InvalidCredentials.into()
                }
                LoginError::PortError(cause) => GenericErrorResponse(cause).into(),
            }
        })?;

    Ok(Json(start_session(user, token_keys)?))
}

/// Looks up the account behind the bearer token
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "The caller's account", body = dto::UserProfile),
        (status = 401, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
async fn current_user(
    user: &AuthenticatedUser,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
) -> Result<Json<dto::UserProfile>, ErrorResponse> {
    let user_reader = DbReadUsers {};

    let stored_user = user_service
        .user_by_id(&user.user_id, &mut *ext_cxn, &user_reader)
        .await
        .map_err(GenericErrorResponse)?
        .ok_or(NotFoundResponse("user"))?;

    Ok(Json(stored_user.into()))
}
