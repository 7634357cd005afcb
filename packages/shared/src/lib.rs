//! # Userdesk 共有型
//!
//! API のレスポンス形状、業務イベントのログ出力、トレーシング初期化をまとめる。
//! domain・infra・user-service のどこからでも使えるよう、業務ルールは置かない。
//!
//! トレーシング関連の関数は `observability` feature を有効にしたときのみ公開する。

pub mod api_response;
pub mod error_response;
pub mod event_log;
pub mod health;
pub mod observability;

pub use api_response::MessageResponse;
pub use error_response::{ErrorResponse, FieldErrorBody, ValidationErrorResponse};
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
