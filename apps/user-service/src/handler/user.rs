//! # ユーザー管理 API ハンドラ
//!
//! ユーザーの一覧・作成・更新・削除エンドポイントを提供する。
//!
//! ## エンドポイント
//!
//! - `GET /users` - ユーザー一覧（要トークン）
//! - `POST /users/create` - ユーザー作成（トークンを `Authorization` ヘッダーで返す）
//! - `PATCH /users/update` - ユーザー更新（要トークン）
//! - `DELETE /users/delete?email=` - ユーザー削除（要トークン）

use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use userdesk_domain::{
    password::PlainPassword,
    user::{Email, User, UserName},
};
use userdesk_shared::MessageResponse;

use crate::{
    error::ApiError,
    extract::JsonBody,
    middleware::AuthenticatedUser,
    usecase::UserUseCase,
    validation::{CREATE_USER, DELETE_USER, Field, FieldValues, UPDATE_USER, UserValidator},
};

/// ユーザー API の共有状態
pub struct UserState {
    pub usecase:   Arc<dyn UserUseCase>,
    pub validator: UserValidator,
}

// --- リクエスト型 ---

/// ユーザー作成・更新リクエスト
///
/// 欠けたフィールドは空文字列として検証チェーンに渡す。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserRequest {
    pub name:     String,
    pub email:    String,
    pub password: String,
}

impl FieldValues for UserRequest {
    fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Password => &self.password,
        }
    }
}

/// ユーザー削除クエリパラメータ
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteUserQuery {
    pub email: String,
}

impl FieldValues for DeleteUserQuery {
    fn value(&self, field: Field) -> &str {
        match field {
            Field::Email => &self.email,
            Field::Name | Field::Password => "",
        }
    }
}

// --- レスポンス型 ---

/// ユーザー一覧の要素
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub name:  String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            name:  user.name().as_str().to_string(),
            email: user.email().as_str().to_string(),
        }
    }
}

// --- ハンドラ ---

/// GET /users
///
/// 全ユーザーの表示名とメールアドレスをメールアドレス順に返す。
pub async fn list_users(
    State(state): State<Arc<UserState>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.usecase.list_users().await?;
    let body: Vec<UserSummary> = users.into_iter().map(UserSummary::from).collect();
    Ok(Json(body))
}

/// POST /users/create
///
/// ユーザーを作成し、アクセストークンを `Authorization: Bearer` ヘッダーで返す。
pub async fn create_user(
    State(state): State<Arc<UserState>>,
    JsonBody(req): JsonBody<UserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.validator.validate(CREATE_USER, &req).await?;

    let (user, token) = state
        .usecase
        .create_user(
            UserName::new(req.name)?,
            Email::new(req.email)?,
            PlainPassword::new(req.password),
        )
        .await?;

    Ok((
        [(header::AUTHORIZATION, format!("Bearer {}", token.token))],
        Json(MessageResponse::new(format!(
            "User {} successfully created",
            user.email()
        ))),
    ))
}

/// PATCH /users/update
///
/// メールアドレスで特定したユーザーの表示名とパスワードを更新する。
pub async fn update_user(
    State(state): State<Arc<UserState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    JsonBody(req): JsonBody<UserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.validator.validate(UPDATE_USER, &req).await?;

    let email = Email::new(req.email)?;
    let message = format!("User {email} successfully updated");
    state
        .usecase
        .update_user(
            &auth.user_id,
            email,
            UserName::new(req.name)?,
            PlainPassword::new(req.password),
        )
        .await?;

    Ok(Json(MessageResponse::new(message)))
}

/// DELETE /users/delete?email=
///
/// メールアドレスで特定したユーザーを削除する。
pub async fn delete_user(
    State(state): State<Arc<UserState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<DeleteUserQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state.validator.validate(DELETE_USER, &query).await?;

    let email = Email::new(query.email)?;
    let message = format!("User {email} successfully deleted");
    state.usecase.delete_user(&auth.user_id, email).await?;

    Ok(Json(MessageResponse::new(message)))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode},
        routing::{delete, get, patch, post},
    };
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use userdesk_domain::{password::PasswordHash, user::UserId};
    use userdesk_infra::{IssuedToken, mock::MockUserRepository};

    use super::*;

    // テスト用スタブ

    /// 呼び出しを記録し、固定の結果を返すユースケース
    #[derive(Default)]
    struct StubUserUseCase {
        users: Vec<User>,
        calls: Mutex<Vec<String>>,
    }

    impl StubUserUseCase {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl UserUseCase for StubUserUseCase {
        async fn list_users(&self) -> Result<Vec<User>, ApiError> {
            Ok(self.users.clone())
        }

        async fn create_user(
            &self,
            name: UserName,
            email: Email,
            _password: PlainPassword,
        ) -> Result<(User, IssuedToken), ApiError> {
            self.record(format!("create {name} {email}"));
            let user = User::new(name, email, PasswordHash::new("hash"));
            Ok((
                user,
                IssuedToken {
                    token:      "stub-token".to_string(),
                    expires_at: 0,
                },
            ))
        }

        async fn login(
            &self,
            _email: &str,
            _password: PlainPassword,
        ) -> Result<(UserName, IssuedToken), ApiError> {
            Err(ApiError::EmailIncorrect)
        }

        async fn update_user(
            &self,
            _actor: &UserId,
            email: Email,
            name: UserName,
            _password: PlainPassword,
        ) -> Result<(), ApiError> {
            self.record(format!("update {name} {email}"));
            Ok(())
        }

        async fn delete_user(&self, _actor: &UserId, email: Email) -> Result<(), ApiError> {
            self.record(format!("delete {email}"));
            Ok(())
        }
    }

    fn existing_user() -> User {
        User::new(
            UserName::new("Sue").unwrap(),
            Email::new("sue@example.com").unwrap(),
            PasswordHash::new("hash"),
        )
    }

    fn create_test_app(usecase: Arc<StubUserUseCase>) -> Router {
        let repository = MockUserRepository::new();
        repository.add_user(existing_user());
        let state = Arc::new(UserState {
            usecase,
            validator: UserValidator::new(Arc::new(repository)).unwrap(),
        });

        // 認証はミドルウェアのテストで検証するため、ここでは主体を直接注入する
        Router::new()
            .route("/users", get(list_users))
            .route("/users/create", post(create_user))
            .route("/users/update", patch(update_user))
            .route("/users/delete", delete(delete_user))
            .layer(Extension(AuthenticatedUser {
                user_id: UserId::new(),
            }))
            .with_state(state)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_users_名前とメールアドレスのみ返す() {
        // Given
        let sut = create_test_app(Arc::new(StubUserUseCase {
            users: vec![existing_user()],
            ..Default::default()
        }));

        let request = Request::builder()
            .method(Method::GET)
            .uri("/users")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([{ "name": "Sue", "email": "sue@example.com" }])
        );
    }

    #[tokio::test]
    async fn test_create_user_成功() {
        // Given
        let usecase = Arc::new(StubUserUseCase::default());
        let sut = create_test_app(usecase.clone());

        let request = json_request(
            Method::POST,
            "/users/create",
            json!({ "name": "  Amy ", "email": " amy@example.com", "password": "secret1!" }),
        );

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::AUTHORIZATION).unwrap(),
            "Bearer stub-token"
        );
        assert_eq!(
            body_json(response).await,
            json!({ "message": "User amy@example.com successfully created" })
        );
        assert_eq!(
            *usecase.calls.lock().unwrap(),
            vec!["create Amy amy@example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_create_user_検証失敗ではユースケースを呼ばない() {
        // Given
        let usecase = Arc::new(StubUserUseCase::default());
        let sut = create_test_app(usecase.clone());

        let request = json_request(
            Method::POST,
            "/users/create",
            json!({ "name": "Other", "email": "sue@example.com", "password": "secret1!" }),
        );

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "errors": [
                { "field": "email", "location": "body", "message": "Email already in use" }
            ] })
        );
        assert!(usecase.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_user_空ボディは名前の必須エラー() {
        // Given
        let sut = create_test_app(Arc::new(StubUserUseCase::default()));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/users/create")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "errors": [
                { "field": "name", "location": "body", "message": "Name is required" }
            ] })
        );
    }

    #[tokio::test]
    async fn test_update_user_成功() {
        // Given
        let usecase = Arc::new(StubUserUseCase::default());
        let sut = create_test_app(usecase.clone());

        let request = json_request(
            Method::PATCH,
            "/users/update",
            json!({ "name": "Susan", "email": "sue@example.com", "password": "changed1!" }),
        );

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "User sue@example.com successfully updated" })
        );
        assert_eq!(
            *usecase.calls.lock().unwrap(),
            vec!["update Susan sue@example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_user_成功() {
        // Given
        let usecase = Arc::new(StubUserUseCase::default());
        let sut = create_test_app(usecase.clone());

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/users/delete?email=sue%40example.com")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "User sue@example.com successfully deleted" })
        );
        assert_eq!(
            *usecase.calls.lock().unwrap(),
            vec!["delete sue@example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_user_クエリなしは3件の検証エラー() {
        // Given
        let sut = create_test_app(Arc::new(StubUserUseCase::default()));

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/users/delete")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let messages: Vec<_> = body_json(response).await["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["message"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            messages,
            vec![
                "Email is required",
                "Valid email format is required",
                "Email does not exist"
            ]
        );
    }
}
