//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュールで re-export し、フラットな API を提供
//! - ハンドラは検証チェーンを通した後、ビジネスロジックを usecase 層に委譲
//!
//! ## ハンドラ一覧
//!
//! - `home`: 疎通確認
//! - `health`: ヘルスチェック
//! - `user`: ユーザー CRUD
//! - `auth`: ログイン

pub mod auth;
pub mod health;
pub mod home;
pub mod user;

pub use auth::login;
pub use health::{ReadinessState, health_check, readiness_check};
pub use home::home;
pub use user::{UserState, create_user, delete_user, list_users, update_user};
