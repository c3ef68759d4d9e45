//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the user directory endpoints and their payload
//! schemas. The document is served at `/api-docs/openapi.json` and rendered
//! by Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserPayload, UserResponse};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User directory API",
        description = "Create, read, update, and delete user records backed by a \
                       relational store with an optional read-through cache."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
    ),
    components(schemas(
        UserResponse,
        CreateUserRequest,
        UpdateUserPayload,
        Error,
        ErrorCode
    )),
    tags(
        (name = "users", description = "User directory operations")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(schema: &RefOr<Schema>) -> Vec<String> {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn user_schema_uses_camel_case_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let fields = object_fields(schemas.get("UserResponse").expect("UserResponse schema"));

        for field in ["id", "email", "name", "createdAt"] {
            assert!(fields.iter().any(|f| f == field), "missing {field}");
        }
    }

    #[rstest]
    #[case("/api/v1/users")]
    #[case("/api/v1/users/{id}")]
    fn user_paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
