//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## エラーコンテキスト
//!
//! 既存の `tracing::error!` に `error.category` + `error.kind` フィールドを直接追加する。
//! 定数は [`error`] モジュールで提供。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。呼び出し側のクレートは `tracing` に
/// 依存している必要がある。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.entity_id`: エンティティ ID
/// - `event.actor_id`: 操作者 ID
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const ACCOUNT: &str = "account";
        pub const AUTH: &str = "auth";
    }

    /// イベントアクション
    pub mod action {
        // アカウント
        pub const USER_CREATED: &str = "user.created";
        pub const USER_UPDATED: &str = "user.updated";
        pub const USER_DELETED: &str = "user.deleted";

        // 認証
        pub const LOGIN_SUCCESS: &str = "auth.login_success";
        pub const LOGIN_FAILURE: &str = "auth.login_failure";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const USER: &str = "user";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// インフラストラクチャ（DB）
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// 認証（トークン検証）
        pub const AUTHENTICATION: &str = "authentication";
    }

    /// エラー種別
    pub mod kind {
        pub const DATABASE: &str = "database";
        pub const INTERNAL: &str = "internal";
        pub const PASSWORD_HASHING: &str = "password_hashing";
        pub const TOKEN_ISSUE: &str = "token_issue";
        pub const TOKEN_VERIFICATION: &str = "token_verification";
    }
}
