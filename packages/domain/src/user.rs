//! # ユーザー
//!
//! ユーザーエンティティとそれに関連する値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 不変条件 |
//! |---|------------|------|
//! | [`UserId`] | ユーザー ID | UUID v7 |
//! | [`UserName`] | 表示名 | trim 後に非空、255 文字以内 |
//! | [`Email`] | メールアドレス | trim 後に非空、メール形式、255 文字以内 |
//! | [`User`] | ユーザー | メールアドレスは全ユーザーで一意 |

use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::{DomainError, password::PasswordHash};

/// ユーザー ID
///
/// UUID v7 なので採番順に並ぶ。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// ユーザーの表示名（値オブジェクト）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct UserName(String);

impl UserName {
    /// 最大文字数（`chars().count()` で数える）
    pub const MAX_LENGTH: usize = 255;

    /// 前後の空白を除去して作成する
    ///
    /// 空、または [`Self::MAX_LENGTH`] を超える場合は `DomainError::Validation`。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation("Name is required".to_string()));
        }

        if value.chars().count() > Self::MAX_LENGTH {
            return Err(DomainError::Validation(format!(
                "Name must be at most {} characters",
                Self::MAX_LENGTH
            )));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// メールアドレス（値オブジェクト）
///
/// 生成時に trim とバリデーションを実行し、不正な値の作成を防ぐ。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct Email(String);

impl Email {
    /// 最大文字数
    pub const MAX_LENGTH: usize = 255;

    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - trim 後に空文字列ではない
    /// - HTML5 仕様準拠のメール形式（`validator` クレート）
    /// - 最大 255 文字
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation("Email is required".to_string()));
        }

        if value.chars().count() > Self::MAX_LENGTH || !value.validate_email() {
            return Err(DomainError::Validation(
                "Valid email format is required".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// ユーザーエンティティ
///
/// # 不変条件
///
/// - `email` は全ユーザーで一意（DB の UNIQUE 制約でも保証）
/// - `password_hash` は平文を保持しない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id:            UserId,
    name:          UserName,
    email:         Email,
    password_hash: PasswordHash,
}

impl User {
    /// 新規ユーザーを作成する
    ///
    /// ID は UUID v7 で採番する。
    pub fn new(name: UserName, email: Email, password_hash: PasswordHash) -> Self {
        Self {
            id: UserId::new(),
            name,
            email,
            password_hash,
        }
    }

    /// データベースから復元する
    pub fn from_db(id: UserId, name: UserName, email: Email, password_hash: PasswordHash) -> Self {
        Self {
            id,
            name,
            email,
            password_hash,
        }
    }

    /// 表示名とパスワードハッシュを差し替えた新しいインスタンスを返す
    ///
    /// ID とメールアドレスは維持する。
    pub fn with_profile(self, name: UserName, password_hash: PasswordHash) -> Self {
        Self {
            name,
            password_hash,
            ..self
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &UserName {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }
}
