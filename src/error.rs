use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    order_status::StatusError,
    response::{ApiResponse, Meta},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict {0}")]
    Conflict(String),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl From<StatusError> for AppError {
    fn from(err: StatusError) -> Self {
        match err {
            StatusError::Unknown(_) => AppError::BadRequest("Invalid order status".into()),
            StatusError::IllegalTransition { from, .. } => {
                let allowed: Vec<&str> = from.allowed_next().iter().map(|s| s.as_str()).collect();
                let allowed = if allowed.is_empty() {
                    "none".to_string()
                } else {
                    allowed.join(", ")
                };
                AppError::Conflict(format!("{err}; allowed next: {allowed}"))
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::OrmError(err) => {
                tracing::error!(error = %err, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = ApiResponse {
            message,
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_status::OrderStatus;

    #[test]
    fn status_errors_map_to_http_errors() {
        let unknown: AppError = StatusError::Unknown("foo".into()).into();
        assert!(matches!(unknown, AppError::BadRequest(ref m) if m == "Invalid order status"));

        let illegal: AppError = StatusError::IllegalTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        }
        .into();
        assert_eq!(
            illegal.into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn conflict_lists_allowed_moves() {
        let backwards: AppError = StatusError::IllegalTransition {
            from: OrderStatus::Preparing,
            to: OrderStatus::Confirmed,
        }
        .into();
        assert!(matches!(
            backwards,
            AppError::Conflict(ref m)
                if m == "Cannot move order from preparing to confirmed; allowed next: dispatched, delivered"
        ));

        let terminal: AppError = StatusError::IllegalTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Pending,
        }
        .into();
        assert!(matches!(terminal, AppError::Conflict(ref m) if m.ends_with("allowed next: none")));
    }

    #[test]
    fn not_found_renders_404() {
        assert_eq!(AppError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
    }
}
