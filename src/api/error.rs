use std::borrow::Cow;
use std::collections::HashMap;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;
use crate::error::VitrineError;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request path not found")]
    NotFound,

    #[error("{message}")]
    Conflict { message: String },

    #[error("error in the request body")]
    UnprocessableEntity {
        errors: HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>,
    },

    #[error("an internal server error occurred: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn unprocessable_entity<K, V>(errors: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        let mut error_map = HashMap::new();

        for (key, val) in errors {
            error_map
                .entry(key.into())
                .or_insert_with(Vec::new)
                .push(val.into());
        }

        Self::UnprocessableEntity { errors: error_map }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VitrineError> for ApiError {
    fn from(err: VitrineError) -> Self {
        match err {
            VitrineError::Validation { field, message } => ApiError::unprocessable_entity([(field, message)]),
            VitrineError::NotFound(_) => ApiError::NotFound,
            VitrineError::Conflict(message) => ApiError::Conflict { message },
            err @ (VitrineError::StorageUnavailable(_) | VitrineError::Serialization(_)) => {
                ApiError::Internal(err.into())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::UnprocessableEntity { errors } => {
                #[derive(serde::Serialize)]
                struct Errors {
                    errors: HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>,
                }

                return (StatusCode::UNPROCESSABLE_ENTITY, Json(Errors { errors })).into_response();
            }

            Self::Internal(ref e) => {
                error!("internal error: {:?}", e);
            }

            _ => (),
        }

        (self.status_code(), self.to_string()).into_response()
    }
}
