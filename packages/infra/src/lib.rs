//! # Userdesk インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理とスキーマ同期
//! - **リポジトリ実装**: ユーザーテーブルへの永続化操作
//! - **パスワードハッシュ**: Argon2id によるハッシュ化と検証
//! - **トークン**: JWT（HS256）の発行と検証
//!
//! ## 依存関係
//!
//! ```text
//! user-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`password`] - パスワードハッシュ
//! - [`repository`] - リポジトリ実装
//! - [`token`] - アクセストークン
//! - `mock` - テスト用インメモリリポジトリ（`test-utils` feature）

pub mod db;
pub mod error;
#[cfg(feature = "test-utils")]
pub mod mock;
pub mod password;
pub mod repository;
pub mod token;

pub use error::{InfraError, InfraErrorKind};
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use token::{AccessClaims, IssuedToken, JwtTokenService, TokenService};
