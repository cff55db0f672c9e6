use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::ports::search::SearchApiError;

/// 对外隐藏内部细节时使用的固定提示
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

/// 统一的错误类型
#[derive(Debug, thiserror::Error)]
pub enum GitsearchError {
    /// 请求字段校验失败（字段名 -> 提示）
    #[error("Validation failed: {0:?}")]
    Validation(BTreeMap<String, String>),

    /// 请求体或查询参数无法解析
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 上游 GitHub API 调用失败
    #[error(transparent)]
    Upstream(#[from] SearchApiError),

    /// SQLx 数据库错误
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),

    /// Anyhow 错误兼容
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GitsearchError {
    /// 单字段校验错误
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.to_string());
        GitsearchError::Validation(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GitsearchError::Validation(_) | GitsearchError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GitsearchError::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    timestamp: String,
    status: u16,
    error: String,
}

#[derive(Serialize)]
struct ValidationErrorBody {
    timestamp: String,
    status: u16,
    errors: BTreeMap<String, String>,
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 展开 source 链，仅用于日志
fn cause_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// 用于 Axum 的错误响应实现
impl IntoResponse for GitsearchError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Request error: {}", cause_chain(&self));
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        match self {
            GitsearchError::Validation(errors) => (
                status,
                Json(ValidationErrorBody {
                    timestamp: now_rfc3339(),
                    status: status.as_u16(),
                    errors,
                }),
            )
                .into_response(),
            other => {
                let message = match &other {
                    GitsearchError::BadRequest(msg) => msg.clone(),
                    // 只暴露上游错误的描述，不暴露其 cause
                    GitsearchError::Upstream(e) => e.to_string(),
                    _ => GENERIC_ERROR_MESSAGE.to_string(),
                };
                (
                    status,
                    Json(ErrorBody {
                        timestamp: now_rfc3339(),
                        status: status.as_u16(),
                        error: message,
                    }),
                )
                    .into_response()
            }
        }
    }
}
