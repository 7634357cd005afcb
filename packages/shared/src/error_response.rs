//! # エラーレスポンス
//!
//! 全エンドポイントで共通のエラーレスポンス構造体を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` / `ValidationErrorResponse` は純粋なデータ構造（`Serialize` /
//!   `Deserialize` のみ）
//! - axum の `IntoResponse` 変換はサービス側の責務（shared に axum 依存を入れない）
//! - 認証エラーの固定文言は便利コンストラクタで提供する
//!
//! ## 形状
//!
//! ```json
//! { "error": "Unauthorized" }
//! { "errors": [{ "field": "email", "location": "body", "message": "Email is required" }] }
//! ```

use serde::{Deserialize, Serialize};

/// 単一メッセージのエラーレスポンス
///
/// 認証失敗・ログイン失敗・永続化失敗で使用する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    /// 任意のメッセージで作成する
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// 401 Unauthorized（トークンなし）
    pub fn unauthorized() -> Self {
        Self::new("Unauthorized")
    }

    /// 403 Forbidden（トークン不正・期限切れ）
    pub fn forbidden() -> Self {
        Self::new("Forbidden")
    }

    /// 500 Internal Server Error
    ///
    /// 文言は固定値（内部情報を漏らさないため）。
    pub fn internal_error() -> Self {
        Self::new("Internal Server Error")
    }
}

/// フィールド単位のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorBody {
    /// フィールド名（`name`, `email`, `password`）
    pub field:    String,
    /// 値の取得元（`body` または `query`）
    pub location: String,
    /// 人間可読なメッセージ
    pub message:  String,
}

/// バリデーションエラーレスポンス（400 Bad Request）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldErrorBody>,
}
