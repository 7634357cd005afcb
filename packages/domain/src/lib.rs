//! # Userdesk ドメイン層
//!
//! ユーザーアカウント管理の中核となるドメインモデルを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! user-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、ハッシュ関数、トークン）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`password`] - 平文パスワード・パスワードハッシュ・検証結果
//! - [`user`] - ユーザーエンティティと値オブジェクト
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use userdesk_domain::{
//!     password::PasswordHash,
//!     user::{Email, User, UserName},
//! };
//!
//! let user = User::new(
//!     UserName::new("Sue")?,
//!     Email::new("sue@example.com")?,
//!     PasswordHash::new("$argon2id$v=19$..."),
//! );
//! assert_eq!(user.email().as_str(), "sue@example.com");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod password;
pub mod user;

pub use error::DomainError;
