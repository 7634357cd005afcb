//! # 認証ミドルウェア
//!
//! `Authorization: Bearer <token>` ヘッダーのアクセストークンを検証する。
//!
//! | 状況 | レスポンス |
//! |------|-----------|
//! | ヘッダーなし・トークン部分なし | 401 `{"error":"Unauthorized"}` |
//! | 署名不正・期限切れ・形式不正 | 403 `{"error":"Forbidden"}` |
//! | 検証成功 | 後続ハンドラへ（[`AuthenticatedUser`] を拡張に格納） |
//!
//! ## 使い方
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//!
//! Router::new()
//!     .route("/users", get(list_users))
//!     .route_layer(from_fn_with_state(auth_state, require_token))
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use userdesk_domain::user::UserId;
use userdesk_infra::TokenService;
use userdesk_shared::event_log::error as log_error;

use crate::error::ApiError;

/// 認証ミドルウェアの状態
#[derive(Clone)]
pub struct AuthState {
    pub token_service: Arc<dyn TokenService>,
}

/// 認証済みリクエストの主体
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// 認証ミドルウェア
///
/// 検証はリクエストボディの検証より先に行う。
pub async fn require_token(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return ApiError::Unauthorized.into_response();
    };

    let claims = match state.token_service.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(
                error.category = log_error::category::AUTHENTICATION,
                error.kind = log_error::kind::TOKEN_VERIFICATION,
                "アクセストークンの検証に失敗: {e}"
            );
            return ApiError::Forbidden.into_response();
        }
    };

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.user_id(),
    });

    next.run(request).await
}

/// ヘッダー値を空白で区切った 2 番目の要素をトークンとして取り出す
fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .split(' ')
        .nth(1)
        .filter(|token| !token.is_empty())
}
