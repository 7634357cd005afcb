//! # 認証ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /login` - メールアドレスとパスワードでログイン
//!
//! 成功時はアクセストークンを `Authorization: Bearer` ヘッダーで返す。
//! 失敗時は「メールアドレス誤り」と「パスワード誤り」を区別して 401 を返す。

use std::sync::Arc;

use axum::{Json, extract::State, http::header, response::IntoResponse};
use serde::Deserialize;
use userdesk_domain::password::PlainPassword;
use userdesk_shared::MessageResponse;

use super::user::UserState;
use crate::{error::ApiError, extract::JsonBody};

/// ログインリクエスト
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email:    String,
    pub password: String,
}

/// POST /login
///
/// ## タイミング攻撃対策
///
/// ユーザーが存在しない場合もユースケース側でダミー検証を行う。
pub async fn login(
    State(state): State<Arc<UserState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (name, token) = state
        .usecase
        .login(&req.email, PlainPassword::new(req.password))
        .await?;

    Ok((
        [(header::AUTHORIZATION, format!("Bearer {}", token.token))],
        Json(MessageResponse::new(format!("Welcome back, {name}!"))),
    ))
}
