//! # ヘルスチェックハンドラ
//!
//! User Service の稼働状態を確認するためのエンドポイント。
//!
//! - `/health`: Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready`: Readiness Check（DB の接続状態を確認）
//!
//! レスポンス型は [`userdesk_shared::HealthResponse`] / [`userdesk_shared::ReadinessResponse`] を参照。

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use userdesk_infra::repository::UserRepository;
use userdesk_shared::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};

/// User Service のヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub repository: Arc<dyn UserRepository>,
}

/// User Service の Readiness Check エンドポイント
///
/// DB チェック OK → 200、失敗 → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let mut checks = BTreeMap::new();
    checks.insert("database", check_database(state.repository.as_ref()).await);

    let response = ReadinessResponse::from_checks(checks);
    let http_status = match response.status {
        ReadinessStatus::Ready => StatusCode::OK,
        ReadinessStatus::NotReady => StatusCode::SERVICE_UNAVAILABLE,
    };

    (http_status, Json(response))
}

/// DB への接続を確認する（タイムアウト: 5 秒）
async fn check_database(repository: &dyn UserRepository) -> CheckStatus {
    match tokio::time::timeout(Duration::from_secs(5), repository.ping()).await {
        Ok(Ok(())) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: database ping failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: database check timed out");
            CheckStatus::Error
        }
    }
}
