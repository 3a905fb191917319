use crate::dto;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(info(
    title = "Task Board API",
    description = "Per-user task management with filtering, statistics, and demo data generation"
))]
struct TaskBoardApi;

/// Registers the `bearer_token` scheme the secured routes point at
struct BearerTokenSecurity;

impl Modify for BearerTokenSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Every OpenAPI definition in the app merged into one document
pub fn api_documentation() -> utoipa::openapi::OpenApi {
    let mut api_docs = TaskBoardApi::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(super::auth::AuthApi::openapi());
    api_docs.merge(super::task::TaskApi::openapi());
    api_docs.merge(super::admin::AdminApi::openapi());
    BearerTokenSecurity.modify(&mut api_docs);

    api_docs
}

/// Constructs the route on the API that renders the swagger UI and returns the OpenAPI schema.
/// Merges in OpenAPI definitions from other locations in the app, such as the [dto] package
/// and submodules of [api][crate::api]
pub fn build_documentation() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_documentation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let api_docs = api_documentation();
        let paths: Vec<&str> = api_docs.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/me",
            "/api/tasks",
            "/api/tasks/{task_id}",
            "/api/tasks/meta/categories",
            "/api/tasks/meta/tags",
            "/api/tasks/stats",
            "/api/admin/seed",
        ] {
            assert!(paths.contains(&expected), "{expected} is not documented");
        }
    }

    #[test]
    fn registers_bearer_scheme() {
        let api_docs = api_documentation();
        let components = api_docs.components.expect("components should be present");

        assert!(components.security_schemes.contains_key("bearer_token"));
        assert!(components.schemas.contains_key("Task"));
    }
}
