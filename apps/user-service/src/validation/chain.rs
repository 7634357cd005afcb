//! # フィールドチェーン
//!
//! 1 つのフィールドに対するチェックの列と、その実行を定義する。

use userdesk_domain::user::{Email, UserName};
use userdesk_infra::InfraError;

use super::{Field, Location, UserValidator, ValidationFailure};

/// 個々のチェック
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// 空でない（name・email は trim 後に判定）
    NotEmpty,
    /// 名前の最大文字数（trim 後に判定）
    NameLength,
    /// メールアドレス形式
    EmailFormat,
    /// メールアドレスが未使用（形式不正なら未使用とみなす）
    EmailNotTaken,
    /// メールアドレスが登録済み（形式不正なら未登録とみなす）
    EmailRegistered,
    /// パスワードの文字種（空文字列は通す）
    PasswordCharset,
}

/// 1 フィールド分のチェーン
#[derive(Debug, Clone, Copy)]
pub struct FieldChain {
    pub field:    Field,
    pub location: Location,
    pub checks:   &'static [Check],
}

impl FieldChain {
    pub const fn body(field: Field, checks: &'static [Check]) -> Self {
        Self {
            field,
            location: Location::Body,
            checks,
        }
    }

    pub const fn query(field: Field, checks: &'static [Check]) -> Self {
        Self {
            field,
            location: Location::Query,
            checks,
        }
    }

    /// 全チェックを実行し、失敗したものを順に返す
    pub(super) async fn run(
        &self,
        raw: &str,
        validator: &UserValidator,
    ) -> Result<Vec<ValidationFailure>, InfraError> {
        let value = if self.field.is_trimmed() {
            raw.trim()
        } else {
            raw
        };

        let mut failures = Vec::new();
        for check in self.checks {
            if let Some(failure) = check.apply(self.field, value, validator).await? {
                failures.push(failure);
            }
        }
        Ok(failures)
    }
}

impl Check {
    async fn apply(
        &self,
        field: Field,
        value: &str,
        validator: &UserValidator,
    ) -> Result<Option<ValidationFailure>, InfraError> {
        let failure = match self {
            Check::NotEmpty => value.is_empty().then(|| field.required()),
            Check::NameLength => (value.chars().count() > UserName::MAX_LENGTH)
                .then_some(ValidationFailure::NameTooLong),
            Check::EmailFormat => Email::new(value)
                .is_err()
                .then_some(ValidationFailure::EmailInvalid),
            Check::EmailNotTaken => match Email::new(value) {
                Ok(email) => validator
                    .repository
                    .find_by_email(&email)
                    .await?
                    .map(|_| ValidationFailure::EmailAlreadyInUse),
                Err(_) => None,
            },
            Check::EmailRegistered => match Email::new(value) {
                Ok(email) => validator
                    .repository
                    .find_by_email(&email)
                    .await?
                    .is_none()
                    .then_some(ValidationFailure::EmailNotFound),
                Err(_) => Some(ValidationFailure::EmailNotFound),
            },
            Check::PasswordCharset => (!validator.password_charset.is_match(value))
                .then_some(ValidationFailure::PasswordInvalid),
        };
        Ok(failure)
    }
}
