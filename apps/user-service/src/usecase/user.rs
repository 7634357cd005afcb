//! # ユーザーユースケース
//!
//! ユーザーの一覧・作成・更新・削除と、ログインを実装する。
//!
//! 呼び出し前に検証チェーンを通過している前提で動作する。
//! ただし検証と書き込みの間の競合は書き込み結果で検出し、
//! 検証失敗と同じ 400 に揃える。
//!
//! ## タイミング攻撃対策
//!
//! ログインでユーザーが存在しない場合もダミーハッシュで
//! 検証を実行し、処理時間を均一化する。

use std::sync::Arc;

use userdesk_domain::{
    password::{PasswordHash, PasswordVerifyResult, PlainPassword},
    user::{Email, User, UserId, UserName},
};
use userdesk_infra::{
    InfraError,
    IssuedToken,
    PasswordHasher,
    TokenService,
    repository::UserRepository,
};
use userdesk_shared::{event_log::event, log_business_event};

use crate::{
    error::ApiError,
    validation::{Field, FieldError, Location, ValidationFailure},
};

/// ユーザーユースケースの実装
pub struct UserUseCaseImpl {
    repository:    Arc<dyn UserRepository>,
    hasher:        Arc<dyn PasswordHasher>,
    token_service: Arc<dyn TokenService>,
}

impl UserUseCaseImpl {
    /// 新しいユースケースインスタンスを作成
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        token_service: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            repository,
            hasher,
            token_service,
        }
    }

    /// 全ユーザーをメールアドレス順に取得する
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.repository
            .find_all()
            .await
            .map_err(|e| ApiError::persistence("Users not found", e))
    }

    /// ユーザーを作成し、アクセストークンを発行する
    ///
    /// メールアドレスの重複は検証チェーンで弾くが、競合した場合は
    /// DB の一意制約違反を `Email already in use` として返す。
    pub async fn create_user(
        &self,
        name: UserName,
        email: Email,
        password: PlainPassword,
    ) -> Result<(User, IssuedToken), ApiError> {
        let context = format!("User {email} not created");

        let password_hash = self
            .hash_password(password)
            .await?
            .map_err(|e| ApiError::persistence(&context, e))?;
        let user = User::new(name, email, password_hash);

        if let Err(e) = self.repository.insert(&user).await {
            return Err(match e.as_conflict() {
                Some(_) => email_error(ValidationFailure::EmailAlreadyInUse),
                None => ApiError::persistence(&context, e),
            });
        }

        let token = self
            .token_service
            .issue(user.id())
            .map_err(|e| ApiError::persistence(&context, e))?;

        log_business_event!(
            event.category = event::category::ACCOUNT,
            event.action = event::action::USER_CREATED,
            event.entity_type = event::entity_type::USER,
            event.entity_id = %user.id(),
            event.actor_id = %user.id(),
            event.result = event::result::SUCCESS,
            "ユーザー作成"
        );

        Ok((user, token))
    }

    /// メールアドレスとパスワードで認証し、アクセストークンを発行する
    ///
    /// ## タイミング攻撃対策
    ///
    /// メールアドレスの形式が不正な場合や該当ユーザーがいない場合も
    /// ダミーハッシュで検証を実行する。
    pub async fn login(
        &self,
        email: &str,
        password: PlainPassword,
    ) -> Result<(UserName, IssuedToken), ApiError> {
        let user = match Email::new(email) {
            Ok(email) => self
                .repository
                .find_by_email(&email)
                .await
                .map_err(|e| ApiError::persistence("Login failed", e))?,
            Err(_) => None,
        };

        let Some(user) = user else {
            self.dummy_verification(password).await?;
            log_login_failure(None, "unknown email");
            return Err(ApiError::EmailIncorrect);
        };

        let result = self
            .verify_password(password, user.password_hash().clone())
            .await?
            .map_err(|e| ApiError::persistence("Login failed", e))?;

        if !result.is_match() {
            log_login_failure(Some(user.id()), "password mismatch");
            return Err(ApiError::PasswordIncorrect);
        }

        let token = self
            .token_service
            .issue(user.id())
            .map_err(|e| ApiError::persistence("Login failed", e))?;

        log_business_event!(
            event.category = event::category::AUTH,
            event.action = event::action::LOGIN_SUCCESS,
            event.entity_type = event::entity_type::USER,
            event.entity_id = %user.id(),
            event.actor_id = %user.id(),
            event.result = event::result::SUCCESS,
            "ログイン成功"
        );

        Ok((user.name().clone(), token))
    }

    /// メールアドレスで特定したユーザーの表示名とパスワードを更新する
    ///
    /// 検証後に対象が削除されていた場合は `Email does not exist` を返す。
    pub async fn update_user(
        &self,
        actor: &UserId,
        email: Email,
        name: UserName,
        password: PlainPassword,
    ) -> Result<(), ApiError> {
        let context = format!("User {email} not updated");

        let password_hash = self
            .hash_password(password)
            .await?
            .map_err(|e| ApiError::persistence(&context, e))?;

        let updated = self
            .repository
            .update_by_email(&email, &name, &password_hash)
            .await
            .map_err(|e| ApiError::persistence(&context, e))?;
        if !updated {
            return Err(email_error(ValidationFailure::EmailNotFound));
        }

        log_business_event!(
            event.category = event::category::ACCOUNT,
            event.action = event::action::USER_UPDATED,
            event.entity_type = event::entity_type::USER,
            event.entity_id = %email,
            event.actor_id = %actor,
            event.result = event::result::SUCCESS,
            "ユーザー更新"
        );

        Ok(())
    }

    /// メールアドレスで特定したユーザーを削除する
    pub async fn delete_user(&self, actor: &UserId, email: Email) -> Result<(), ApiError> {
        let deleted = self
            .repository
            .delete_by_email(&email)
            .await
            .map_err(|e| ApiError::persistence(format!("User {email} not deleted"), e))?;
        if !deleted {
            return Err(ApiError::Validation(vec![FieldError {
                field:    Field::Email,
                location: Location::Query,
                failure:  ValidationFailure::EmailNotFound,
            }]));
        }

        log_business_event!(
            event.category = event::category::ACCOUNT,
            event.action = event::action::USER_DELETED,
            event.entity_type = event::entity_type::USER,
            event.entity_id = %email,
            event.actor_id = %actor,
            event.result = event::result::SUCCESS,
            "ユーザー削除"
        );

        Ok(())
    }

    /// パスワードをブロッキングスレッドでハッシュ化する
    ///
    /// 外側の `Err` はタスク自体の失敗、内側の `Err` はハッシュ化の失敗。
    async fn hash_password(
        &self,
        password: PlainPassword,
    ) -> Result<Result<PasswordHash, InfraError>, ApiError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))
    }

    /// パスワードをブロッキングスレッドで検証する
    async fn verify_password(
        &self,
        password: PlainPassword,
        hash: PasswordHash,
    ) -> Result<Result<PasswordVerifyResult, InfraError>, ApiError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| ApiError::Internal(format!("password verification task failed: {e}")))
    }

    /// ダミーハッシュで検証を実行する（タイミング攻撃対策）
    async fn dummy_verification(&self, password: PlainPassword) -> Result<(), ApiError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify_dummy(&password))
            .await
            .map_err(|e| ApiError::Internal(format!("password verification task failed: {e}")))
    }
}

/// リクエストボディの email に対する検証失敗
fn email_error(failure: ValidationFailure) -> ApiError {
    ApiError::Validation(vec![FieldError {
        field:    Field::Email,
        location: Location::Body,
        failure,
    }])
}

fn log_login_failure(user_id: Option<&UserId>, reason: &str) {
    let entity_id = user_id.map(ToString::to_string).unwrap_or_default();
    log_business_event!(
        event.category = event::category::AUTH,
        event.action = event::action::LOGIN_FAILURE,
        event.entity_type = event::entity_type::USER,
        event.entity_id = %entity_id,
        event.result = event::result::FAILURE,
        event.reason = reason,
        "ログイン失敗"
    );
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use userdesk_infra::{Argon2PasswordHasher, JwtTokenService, mock::MockUserRepository};

    use super::*;

    const SECRET: &str = "test-secret";

    struct Fixture {
        repository: MockUserRepository,
        tokens:     Arc<JwtTokenService>,
        sut:        UserUseCaseImpl,
    }

    fn fixture_with(repository: MockUserRepository) -> Fixture {
        let hasher = Arc::new(Argon2PasswordHasher::with_params(1024, 1, 1).unwrap());
        let tokens = Arc::new(JwtTokenService::new(SECRET, 60));
        let sut = UserUseCaseImpl::new(
            Arc::new(repository.clone()),
            hasher,
            tokens.clone(),
        );
        Fixture {
            repository,
            tokens,
            sut,
        }
    }

    #[fixture]
    fn fx() -> Fixture {
        fixture_with(MockUserRepository::new())
    }

    fn name(value: &str) -> UserName {
        UserName::new(value).unwrap()
    }

    fn email(value: &str) -> Email {
        Email::new(value).unwrap()
    }

    fn password(value: &str) -> PlainPassword {
        PlainPassword::new(value)
    }

    async fn create_sue(fx: &Fixture) -> User {
        let (user, _) = fx
            .sut
            .create_user(name("Sue"), email("sue@example.com"), password("secret1!"))
            .await
            .unwrap();
        user
    }

    fn only_failure(error: ApiError) -> (Location, ValidationFailure) {
        match error {
            ApiError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                (errors[0].location, errors[0].failure)
            }
            other => panic!("Validation を期待したが {other:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_user_成功(fx: Fixture) {
        let (user, token) = fx
            .sut
            .create_user(name("Sue"), email("sue@example.com"), password("secret1!"))
            .await
            .unwrap();

        let stored = fx.repository.users();
        assert_eq!(stored, vec![user.clone()]);
        assert_ne!(user.password_hash().as_str(), "secret1!");
        assert!(user.password_hash().as_str().starts_with("$argon2id$"));

        let claims = fx.tokens.verify(&token.token).unwrap();
        assert_eq!(&claims.user_id(), user.id());
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_user_一意制約違反はemail_already_in_use(fx: Fixture) {
        create_sue(&fx).await;

        let error = fx
            .sut
            .create_user(name("Other"), email("sue@example.com"), password("other"))
            .await
            .unwrap_err();

        assert_eq!(
            only_failure(error),
            (Location::Body, ValidationFailure::EmailAlreadyInUse)
        );
    }

    #[tokio::test]
    async fn test_create_user_db障害はnot_createdメッセージ() {
        let fx = fixture_with(MockUserRepository::failing("connection refused"));

        let error = fx
            .sut
            .create_user(name("Sue"), email("sue@example.com"), password("secret1!"))
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "User sue@example.com not created: connection refused"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_成功(fx: Fixture) {
        let sue = create_sue(&fx).await;

        let (user_name, token) = fx
            .sut
            .login("sue@example.com", password("secret1!"))
            .await
            .unwrap();

        assert_eq!(user_name.as_str(), "Sue");
        assert_eq!(&fx.tokens.verify(&token.token).unwrap().user_id(), sue.id());
    }

    #[rstest]
    #[case::未登録("nobody@example.com")]
    #[case::形式不正("not-an-email")]
    #[case::空文字列("")]
    #[tokio::test]
    async fn test_login_該当ユーザーなしはemail_incorrect(#[case] input: &str) {
        let fx = fixture_with(MockUserRepository::new());
        create_sue(&fx).await;

        let result = fx.sut.login(input, password("secret1!")).await;

        assert!(matches!(result, Err(ApiError::EmailIncorrect)));
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_パスワード不一致はpassword_incorrect(fx: Fixture) {
        create_sue(&fx).await;

        let result = fx.sut.login("sue@example.com", password("wrong")).await;

        assert!(matches!(result, Err(ApiError::PasswordIncorrect)));
    }

    #[tokio::test]
    async fn test_login_ハッシュ形式不正は500() {
        let repository = MockUserRepository::new();
        repository.add_user(User::new(
            name("Sue"),
            email("sue@example.com"),
            PasswordHash::new("not-a-phc-string"),
        ));
        let fx = fixture_with(repository);

        let result = fx.sut.login("sue@example.com", password("secret1!")).await;

        assert!(matches!(result, Err(ApiError::Persistence { .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_user_成功(fx: Fixture) {
        let sue = create_sue(&fx).await;

        fx.sut
            .update_user(
                sue.id(),
                email("sue@example.com"),
                name("Susan"),
                password("changed1!"),
            )
            .await
            .unwrap();

        let stored = fx.repository.users();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id(), sue.id());
        assert_eq!(stored[0].name().as_str(), "Susan");
        assert!(
            fx.sut
                .login("sue@example.com", password("changed1!"))
                .await
                .is_ok()
        );
        assert!(matches!(
            fx.sut.login("sue@example.com", password("secret1!")).await,
            Err(ApiError::PasswordIncorrect)
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_user_対象なしはemail_not_found(fx: Fixture) {
        let error = fx
            .sut
            .update_user(
                &UserId::new(),
                email("nobody@example.com"),
                name("Nobody"),
                password("secret"),
            )
            .await
            .unwrap_err();

        assert_eq!(
            only_failure(error),
            (Location::Body, ValidationFailure::EmailNotFound)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_user_成功(fx: Fixture) {
        let sue = create_sue(&fx).await;

        fx.sut
            .delete_user(sue.id(), email("sue@example.com"))
            .await
            .unwrap();

        assert!(fx.repository.users().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_user_対象なしはクエリのemail_not_found(fx: Fixture) {
        let error = fx
            .sut
            .delete_user(&UserId::new(), email("nobody@example.com"))
            .await
            .unwrap_err();

        assert_eq!(
            only_failure(error),
            (Location::Query, ValidationFailure::EmailNotFound)
        );
    }

    #[tokio::test]
    async fn test_list_users_db障害はusers_not_foundメッセージ() {
        let fx = fixture_with(MockUserRepository::failing("connection refused"));

        let error = fx.sut.list_users().await.unwrap_err();

        assert_eq!(error.to_string(), "Users not found: connection refused");
    }
}
