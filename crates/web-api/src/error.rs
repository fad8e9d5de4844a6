use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    /// 诊断用的底层错误详情，仅部分 500 响应携带
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                message: message.into(),
                error: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 把应用层错误翻译成 HTTP 响应。存储类故障统一折叠成该操作的
    /// 通用失败消息，不向客户端泄露细节。
    pub fn from_service(error: ApplicationError, fallback: &str) -> Self {
        Self::translate(error, fallback, false)
    }

    /// 同 from_service，但 500 响应额外携带底层错误详情。
    pub fn from_service_with_detail(error: ApplicationError, fallback: &str) -> Self {
        Self::translate(error, fallback, true)
    }

    fn translate(error: ApplicationError, fallback: &str, with_detail: bool) -> Self {
        match error {
            ApplicationError::Domain(DomainError::InvalidArgument { field, reason }) => {
                Self::bad_request(format!("{}: {}", field, reason))
            }
            ApplicationError::Domain(DomainError::UserNotFound) => {
                Self::not_found("receiver not found")
            }
            ApplicationError::Domain(DomainError::ChatNotFound) => {
                Self::not_found("chat not found")
            }
            ApplicationError::Repository(repo_err) => {
                tracing::error!(error = %repo_err, "{}", fallback);
                let mut api_error = Self::internal_server_error(fallback);
                if with_detail {
                    api_error.body.error = Some(repo_err.to_string());
                }
                api_error
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
