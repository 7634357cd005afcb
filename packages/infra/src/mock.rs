//! # テスト用モックリポジトリ
//!
//! ユースケース・API テストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! userdesk-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use userdesk_domain::{
    password::PasswordHash,
    user::{Email, User, UserName},
};

use crate::{error::InfraError, repository::UserRepository};

// ===== MockUserRepository =====

/// インメモリの UserRepository
///
/// `Clone` したインスタンスは同じストアを共有する。
/// メールアドレスの一意性は PostgreSQL の UNIQUE 制約と同じく
/// `insert` 時に検査する。
#[derive(Clone, Default)]
pub struct MockUserRepository {
    users:   Arc<Mutex<Vec<User>>>,
    failure: Option<String>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全操作が指定メッセージで失敗するリポジトリを作成する
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            users:   Arc::default(),
            failure: Some(message.into()),
        }
    }

    /// ユーザーを直接追加する（テストデータ準備用）
    pub fn add_user(&self, user: User) {
        self.lock().push(user);
    }

    /// 保存されている全ユーザーを返す
    pub fn users(&self) -> Vec<User> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_failure(&self) -> Result<(), InfraError> {
        match &self.failure {
            Some(message) => Err(InfraError::unexpected(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, InfraError> {
        self.check_failure()?;
        let mut users = self.users();
        users.sort_by(|a, b| a.email().as_str().cmp(b.email().as_str()));
        Ok(users)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
        self.check_failure()?;
        Ok(self.lock().iter().find(|u| u.email() == email).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), InfraError> {
        self.check_failure()?;
        let mut users = self.lock();
        if users.iter().any(|u| u.email() == user.email()) {
            return Err(InfraError::conflict("User", user.email().as_str()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update_by_email(
        &self,
        email: &Email,
        name: &UserName,
        password_hash: &PasswordHash,
    ) -> Result<bool, InfraError> {
        self.check_failure()?;
        let mut users = self.lock();
        let Some(index) = users.iter().position(|u| u.email() == email) else {
            return Ok(false);
        };
        let updated = users[index]
            .clone()
            .with_profile(name.clone(), password_hash.clone());
        users[index] = updated;
        Ok(true)
    }

    async fn delete_by_email(&self, email: &Email) -> Result<bool, InfraError> {
        self.check_failure()?;
        let mut users = self.lock();
        let before = users.len();
        users.retain(|u| u.email() != email);
        Ok(users.len() < before)
    }

    async fn count(&self) -> Result<i64, InfraError> {
        self.check_failure()?;
        Ok(self.lock().len() as i64)
    }

    async fn ping(&self) -> Result<(), InfraError> {
        self.check_failure()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn user(name: &str, email: &str) -> User {
        User::new(
            UserName::new(name).unwrap(),
            Email::new(email).unwrap(),
            PasswordHash::new("hash"),
        )
    }

    #[tokio::test]
    async fn test_find_allはメールアドレス順に返す() {
        let sut = MockUserRepository::new();
        sut.add_user(user("Zed", "zed@example.com"));
        sut.add_user(user("Amy", "amy@example.com"));

        let users = sut.find_all().await.unwrap();

        let emails: Vec<_> = users.iter().map(|u| u.email().as_str()).collect();
        assert_eq!(emails, vec!["amy@example.com", "zed@example.com"]);
    }

    #[tokio::test]
    async fn test_find_allは大文字を小文字より前に並べる() {
        let sut = MockUserRepository::new();
        sut.add_user(user("Amy", "amy@example.com"));
        sut.add_user(user("Bob", "Bob@example.com"));

        let users = sut.find_all().await.unwrap();

        let emails: Vec<_> = users.iter().map(|u| u.email().as_str()).collect();
        assert_eq!(emails, vec!["Bob@example.com", "amy@example.com"]);
    }

    #[tokio::test]
    async fn test_insertは重複メールアドレスを拒否する() {
        let sut = MockUserRepository::new();
        sut.insert(&user("Sue", "sue@example.com")).await.unwrap();

        let result = sut.insert(&user("Other", "sue@example.com")).await;

        let err = result.unwrap_err();
        assert_eq!(err.as_conflict(), Some(("User", "sue@example.com")));
    }

    #[tokio::test]
    async fn test_failingは全操作でエラーを返す() {
        let sut = MockUserRepository::failing("connection refused");

        let err = sut.find_all().await.unwrap_err();

        assert_eq!(err.to_string(), "connection refused");
        assert!(sut.ping().await.is_err());
    }
}
