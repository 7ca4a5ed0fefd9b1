use axum::{
    Router,
    extract::{
        FromRef, FromRequest, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::ContentType;
use pinnwand_common::model::{Id, post::PostMarker, user::UserMarker};
use pinnwand_db::client::{DbClient, DbError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Request validation failed")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Post with id {0} was not found")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("User with id {0} was not found")]
    UserByIdNotFound(Id<UserMarker>),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::UserByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::JsonRejection(_) => StatusCode::BAD_REQUEST,
            ServerError::Validation(_)
            | ServerError::Database(DbError::DuplicateTitle | DbError::DuplicateEmail) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServerError::JsonResponse(_) | ServerError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// What the client gets to see. Internal failures are logged with full
    /// detail but reported as a generic message.
    fn client_message(&self) -> String {
        match self {
            ServerError::Validation(_)
            | ServerError::Database(DbError::DuplicateTitle | DbError::DuplicateEmail) => {
                "validation failed".to_owned()
            }
            ServerError::JsonResponse(_) | ServerError::Database(_) => {
                "internal server error".to_owned()
            }
            other => other.to_string(),
        }
    }

    fn validation_messages(&self) -> Option<BTreeMap<String, Vec<String>>> {
        match self {
            ServerError::Validation(errors) => Some(flatten_validation_errors(errors)),
            ServerError::Database(error @ DbError::DuplicateTitle) => {
                Some(single_field_error("title", &error.to_string()))
            }
            ServerError::Database(error @ DbError::DuplicateEmail) => {
                Some(single_field_error("email", &error.to_string()))
            }
            _ => None,
        }
    }
}

fn flatten_validation_errors(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let messages = field_errors
                .iter()
                .map(|field_error| {
                    field_error
                        .message
                        .as_ref()
                        .map_or_else(|| field_error.code.to_string(), ToString::to_string)
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn single_field_error(field: &str, message: &str) -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(field.to_owned(), vec![message.to_owned()])])
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Body for successful deletes.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// JSON extractor and response body used by every handler. Extraction
/// rejections and unserializable responses both land in [`ServerError`], so
/// clients always get the structured error shape.
#[derive(FromRequest, Debug, Clone, Copy, Default)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => (TypedHeader(ContentType::json()), body).into_response(),
            Err(error) => ServerError::JsonResponse(error).into_response(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
            message: self.client_message(),
            errors: self.validation_messages(),
        };
        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::server::{
        ErrorResponse, Json, MessageResponse, ServerError, flatten_validation_errors,
    };
    use axum::{
        http::{StatusCode, Uri, header::CONTENT_TYPE},
        response::IntoResponse,
    };
    use pinnwand_common::model::post::CreatePost;
    use pinnwand_db::client::DbError;
    use validator::Validate;

    fn invalid_post() -> CreatePost {
        CreatePost {
            title: "Tiny".to_owned(),
            description: "too short".to_owned(),
        }
    }

    #[test]
    fn status_codes() {
        let validation = ServerError::Validation(invalid_post().validate().unwrap_err());
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(
            ServerError::Database(DbError::DuplicateTitle).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServerError::Database(DbError::DuplicateEmail).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServerError::PostByIdNotFound(7.into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::UserByIdNotFound(7.into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::UnknownRoute(Uri::from_static("/missing")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::Database(DbError::Sqlx(sqlx::Error::PoolClosed)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_failures_report_per_field_messages() {
        let errors = invalid_post().validate().unwrap_err();
        let flattened = flatten_validation_errors(&errors);

        assert_eq!(
            flattened["title"],
            vec!["title must be between 5 and 50 characters"]
        );
        assert_eq!(
            flattened["description"],
            vec!["description must be between 10 and 100 characters"]
        );
    }

    #[test]
    fn validation_error_body_shape() {
        let error = ServerError::Validation(invalid_post().validate().unwrap_err());
        let body = ErrorResponse {
            status: error.status().as_u16(),
            message: error.client_message(),
            errors: error.validation_messages(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], 422);
        assert_eq!(json["message"], "validation failed");
        assert_eq!(
            json["errors"]["title"][0],
            "title must be between 5 and 50 characters"
        );
    }

    #[test]
    fn duplicate_title_reported_as_validation_failure() {
        let error = ServerError::Database(DbError::DuplicateTitle);
        assert_eq!(error.client_message(), "validation failed");

        let messages = error.validation_messages().unwrap();
        assert_eq!(messages["title"], vec!["A post with this title already exists"]);
    }

    #[test]
    fn json_response_carries_json_content_type() {
        let response = Json(MessageResponse {
            message: "Post deleted successfully".to_owned(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn internal_errors_carry_no_detail() {
        let error = ServerError::Database(DbError::Sqlx(sqlx::Error::PoolClosed));
        assert_eq!(error.client_message(), "internal server error");
        assert!(error.validation_messages().is_none());
    }
}
