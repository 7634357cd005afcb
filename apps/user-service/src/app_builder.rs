//! # User Service アプリケーション構築
//!
//! DI（ユースケース・検証チェーン・State）の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。
//!
//! ## ルート
//!
//! | Method | Path | 認証 |
//! |--------|------|------|
//! | GET | `/` | - |
//! | GET | `/health` | - |
//! | GET | `/health/ready` | - |
//! | POST | `/users/create` | - |
//! | POST | `/login` | - |
//! | GET | `/users` | Bearer |
//! | PATCH | `/users/update` | Bearer |
//! | DELETE | `/users/delete` | Bearer |

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;
use userdesk_infra::{PasswordHasher, TokenService, repository::UserRepository};
use userdesk_shared::observability::make_request_span;

use crate::{
    handler::{
        ReadinessState,
        UserState,
        create_user,
        delete_user,
        health_check,
        home,
        list_users,
        login,
        readiness_check,
        update_user,
    },
    middleware::{AuthState, require_token},
    usecase::UserUseCaseImpl,
    validation::UserValidator,
};

/// ルーター構築に必要なインフラ依存
pub struct AppDependencies {
    pub repository:    Arc<dyn UserRepository>,
    pub hasher:        Arc<dyn PasswordHasher>,
    pub token_service: Arc<dyn TokenService>,
}

/// DI コンテナの構築とルーター定義を行う
///
/// インフラ初期化済みの依存を受け取り、ユースケース → State → Router の
/// 順に組み立てる。パスワード許可文字の正規表現が不正な場合のみ失敗する。
pub fn build_router(deps: AppDependencies) -> Result<Router, regex::Error> {
    let AppDependencies {
        repository,
        hasher,
        token_service,
    } = deps;

    let readiness_state = Arc::new(ReadinessState {
        repository: repository.clone(),
    });

    let auth_state = AuthState {
        token_service: token_service.clone(),
    };

    let user_state = Arc::new(UserState {
        usecase:   Arc::new(UserUseCaseImpl::new(
            repository.clone(),
            hasher,
            token_service,
        )),
        validator: UserValidator::new(repository)?,
    });

    // 認証ミドルウェアは route_layer で適用し、未定義パスには 404 を返す
    let protected = Router::new()
        .route("/users", get(list_users))
        .route("/users/update", patch(update_user))
        .route("/users/delete", delete(delete_user))
        .route_layer(from_fn_with_state(auth_state, require_token))
        .with_state(user_state.clone());

    let public = Router::new()
        .route("/users/create", post(create_user))
        .route("/login", post(login))
        .with_state(user_state);

    // TraceLayer により、すべての HTTP リクエストがリクエストスパンで囲まれる
    Ok(Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span)))
}
