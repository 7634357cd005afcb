//! # 検証チェーン
//!
//! ハンドラ実行前にリクエストの各フィールドを検証する。
//!
//! ## 実行規則
//!
//! - パイプラインは [`FieldChain`] の順序付きリスト
//! - 1 つのチェーン内のチェックはすべて実行する（途中で打ち切らない）
//! - あるチェーンが 1 件以上の失敗を出したら、後続のチェーンは実行しない
//! - それまでに集めた失敗をまとめて 400 で返す
//!
//! ## パイプライン
//!
//! | 操作 | チェーン |
//! |------|---------|
//! | 作成 | name → email（未使用） → password |
//! | 更新 | name → email（登録済み） → password |
//! | 削除 | email（登録済み、クエリ） |

mod chain;

use std::sync::Arc;

pub use chain::{Check, FieldChain};
use regex::Regex;
use thiserror::Error;
use userdesk_infra::{InfraError, repository::UserRepository};
use userdesk_shared::FieldErrorBody;

use crate::error::ApiError;

/// パスワードに使用できる文字（英数字と記号の一部）
const PASSWORD_CHARSET: &str = r#"^[a-zA-Z0-9!@#$%^&*()_+\-=\[\]{};':"\\|,.<>/?]*$"#;

/// 検証対象のフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Password,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
        }
    }

    /// 検証前に前後の空白を除去するか
    ///
    /// パスワードは除去しない（空白は許可文字チェックで拒否する）。
    fn is_trimmed(&self) -> bool {
        !matches!(self, Field::Password)
    }

    /// 空値のときの失敗理由
    fn required(&self) -> ValidationFailure {
        match self {
            Field::Name => ValidationFailure::NameRequired,
            Field::Email => ValidationFailure::EmailRequired,
            Field::Password => ValidationFailure::PasswordRequired,
        }
    }
}

/// 値の取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Body,
    Query,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Body => "body",
            Location::Query => "query",
        }
    }
}

/// 検証の失敗理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("Name is required")]
    NameRequired,
    #[error("Name must be at most 255 characters")]
    NameTooLong,
    #[error("Email is required")]
    EmailRequired,
    #[error("Valid email format is required")]
    EmailInvalid,
    #[error("Email already in use")]
    EmailAlreadyInUse,
    #[error("Email does not exist")]
    EmailNotFound,
    #[error("Password is required")]
    PasswordRequired,
    #[error("Valid password can only contain letters, numbers, and special characters")]
    PasswordInvalid,
}

/// フィールド単位の検証失敗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field:    Field,
    pub location: Location,
    pub failure:  ValidationFailure,
}

impl FieldError {
    /// レスポンスボディ用の形式に変換する
    pub fn to_body(&self) -> FieldErrorBody {
        FieldErrorBody {
            field:    self.field.as_str().to_string(),
            location: self.location.as_str().to_string(),
            message:  self.failure.to_string(),
        }
    }
}

/// 検証対象の値を提供するリクエスト型
pub trait FieldValues {
    /// フィールドの生の値を返す（未指定は空文字列）
    fn value(&self, field: Field) -> &str;
}

/// 作成: name → email（未使用） → password
pub const CREATE_USER: &[FieldChain] = &[
    FieldChain::body(Field::Name, &[Check::NotEmpty, Check::NameLength]),
    FieldChain::body(
        Field::Email,
        &[Check::NotEmpty, Check::EmailFormat, Check::EmailNotTaken],
    ),
    FieldChain::body(Field::Password, &[Check::NotEmpty, Check::PasswordCharset]),
];

/// 更新: name → email（登録済み） → password
pub const UPDATE_USER: &[FieldChain] = &[
    FieldChain::body(Field::Name, &[Check::NotEmpty, Check::NameLength]),
    FieldChain::body(
        Field::Email,
        &[Check::NotEmpty, Check::EmailFormat, Check::EmailRegistered],
    ),
    FieldChain::body(Field::Password, &[Check::NotEmpty, Check::PasswordCharset]),
];

/// 削除: email（登録済み、クエリ）
pub const DELETE_USER: &[FieldChain] = &[FieldChain::query(
    Field::Email,
    &[Check::NotEmpty, Check::EmailFormat, Check::EmailRegistered],
)];

/// 検証チェーンの実行器
///
/// 存在確認のためにリポジトリを参照する。
pub struct UserValidator {
    repository:       Arc<dyn UserRepository>,
    password_charset: Regex,
}

impl UserValidator {
    pub fn new(repository: Arc<dyn UserRepository>) -> Result<Self, regex::Error> {
        Ok(Self {
            repository,
            password_charset: Regex::new(PASSWORD_CHARSET)?,
        })
    }

    /// パイプラインを実行し、失敗があれば `ApiError::Validation` を返す
    pub async fn validate(
        &self,
        pipeline: &[FieldChain],
        input: &impl FieldValues,
    ) -> Result<(), ApiError> {
        let errors = self
            .collect_errors(pipeline, input)
            .await
            .map_err(|e| ApiError::persistence("Validation lookup failed", e))?;

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }

    /// パイプラインを実行し、失敗の一覧を返す
    pub async fn collect_errors(
        &self,
        pipeline: &[FieldChain],
        input: &impl FieldValues,
    ) -> Result<Vec<FieldError>, InfraError> {
        let mut errors = Vec::new();

        for chain in pipeline {
            let failures = chain.run(input.value(chain.field), self).await?;
            let failed = !failures.is_empty();

            errors.extend(failures.into_iter().map(|failure| FieldError {
                field:    chain.field,
                location: chain.location,
                failure,
            }));

            if failed {
                break;
            }
        }

        Ok(errors)
    }
}
