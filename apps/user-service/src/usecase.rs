//! # ユースケース層
//!
//! User Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **トレイトベースの設計**: ハンドラのテストでスタブに差し替えられるようトレイトを定義
//! - **依存性注入**: リポジトリ・パスワードハッシュ・トークンサービスを外部から注入
//! - **薄いハンドラ**: 入力の検証はハンドラ側の検証チェーン、永続化と認証はユースケースに集約

pub mod user;

use async_trait::async_trait;
use userdesk_domain::{
    password::PlainPassword,
    user::{Email, User, UserId, UserName},
};
use userdesk_infra::IssuedToken;
pub use user::UserUseCaseImpl;

use crate::error::ApiError;

/// ユーザーユースケーストレイト
///
/// 具体的な実装は `UserUseCaseImpl` で提供される。
#[async_trait]
pub trait UserUseCase: Send + Sync {
    /// 全ユーザーをメールアドレス順に取得する
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    /// ユーザーを作成し、アクセストークンを発行する
    async fn create_user(
        &self,
        name: UserName,
        email: Email,
        password: PlainPassword,
    ) -> Result<(User, IssuedToken), ApiError>;

    /// メールアドレスとパスワードで認証し、アクセストークンを発行する
    ///
    /// ## 戻り値
    ///
    /// - `Ok((name, token))`: 認証成功
    /// - `Err(ApiError::EmailIncorrect)`: 該当ユーザーなし
    /// - `Err(ApiError::PasswordIncorrect)`: パスワード不一致
    async fn login(
        &self,
        email: &str,
        password: PlainPassword,
    ) -> Result<(UserName, IssuedToken), ApiError>;

    /// メールアドレスで特定したユーザーの表示名とパスワードを更新する
    async fn update_user(
        &self,
        actor: &UserId,
        email: Email,
        name: UserName,
        password: PlainPassword,
    ) -> Result<(), ApiError>;

    /// メールアドレスで特定したユーザーを削除する
    async fn delete_user(&self, actor: &UserId, email: Email) -> Result<(), ApiError>;
}

/// UserUseCaseImpl に UserUseCase トレイトを実装
#[async_trait]
impl UserUseCase for UserUseCaseImpl {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.list_users().await
    }

    async fn create_user(
        &self,
        name: UserName,
        email: Email,
        password: PlainPassword,
    ) -> Result<(User, IssuedToken), ApiError> {
        self.create_user(name, email, password).await
    }

    async fn login(
        &self,
        email: &str,
        password: PlainPassword,
    ) -> Result<(UserName, IssuedToken), ApiError> {
        self.login(email, password).await
    }

    async fn update_user(
        &self,
        actor: &UserId,
        email: Email,
        name: UserName,
        password: PlainPassword,
    ) -> Result<(), ApiError> {
        self.update_user(actor, email, name, password).await
    }

    async fn delete_user(&self, actor: &UserId, email: Email) -> Result<(), ApiError> {
        self.delete_user(actor, email).await
    }
}
