//! # User Service エラー定義
//!
//! User Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! ## エラーと HTTP ステータスの対応
//!
//! | エラー | ステータス | ボディ |
//! |--------|-----------|--------|
//! | `Validation` | 400 | `{"errors":[...]}` |
//! | `MalformedBody` / `Domain` | 400 | `{"error":"..."}` |
//! | `Unauthorized` / `EmailIncorrect` / `PasswordIncorrect` | 401 | `{"error":"..."}` |
//! | `Forbidden` | 403 | `{"error":"Forbidden"}` |
//! | `Persistence` | 500 | `{"error":"<文脈>: <原因>"}` |
//! | `Internal` | 500 | `{"error":"Internal Server Error"}` |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use userdesk_domain::DomainError;
use userdesk_infra::{InfraError, InfraErrorKind};
use userdesk_shared::{ErrorResponse, ValidationErrorResponse, event_log::error as log_error};

use crate::validation::FieldError;

/// User Service で発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
    /// 検証チェーンの失敗
    #[error("validation failed: {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// リクエストボディが JSON として解釈できない
    #[error("{0}")]
    MalformedBody(String),

    /// トークンなし
    #[error("Unauthorized")]
    Unauthorized,

    /// トークン不正・期限切れ
    #[error("Forbidden")]
    Forbidden,

    /// ログイン: メールアドレスに一致するユーザーがいない
    #[error("Email incorrect, please try again.")]
    EmailIncorrect,

    /// ログイン: パスワード不一致
    #[error("Password incorrect, please try again.")]
    PasswordIncorrect,

    /// 値オブジェクトの生成失敗
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// 永続化・ハッシュ化・トークン発行など、インフラ層の失敗
    ///
    /// `message` は「何に失敗したか」と原因を含み、そのままレスポンスに載る。
    #[error("{message}")]
    Persistence {
        message: String,
        #[source]
        source:  InfraError,
    },

    /// 内部エラー（ハッシュ化・トークン発行の失敗など）
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// インフラ層の失敗から作成する
    ///
    /// メッセージは `"{context}: {source}"` になる。
    pub fn persistence(context: impl std::fmt::Display, source: InfraError) -> Self {
        Self::Persistence {
            message: format!("{context}: {source}"),
            source,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let body = ValidationErrorResponse {
                    errors: errors.iter().map(FieldError::to_body).collect(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::MalformedBody(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
            }
            ApiError::Domain(e) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))).into_response()
            }
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, Json(ErrorResponse::unauthorized())).into_response()
            }
            ApiError::Forbidden => {
                (StatusCode::FORBIDDEN, Json(ErrorResponse::forbidden())).into_response()
            }
            e @ (ApiError::EmailIncorrect | ApiError::PasswordIncorrect) => {
                (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new(e.to_string()))).into_response()
            }
            ApiError::Persistence { message, source } => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = error_kind(&source),
                    span_trace = %source.span_trace(),
                    "{message}"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(message)),
                )
                    .into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::INTERNAL,
                    "内部エラー: {message}"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::internal_error()),
                )
                    .into_response()
            }
        }
    }
}

/// ログ用のエラー種別
fn error_kind(error: &InfraError) -> &'static str {
    match error.kind() {
        InfraErrorKind::Database(_) | InfraErrorKind::Conflict { .. } => log_error::kind::DATABASE,
        InfraErrorKind::PasswordHash(_) => log_error::kind::PASSWORD_HASHING,
        InfraErrorKind::Token(_) => log_error::kind::TOKEN_ISSUE,
        InfraErrorKind::Unexpected(_) => log_error::kind::INTERNAL,
    }
}
