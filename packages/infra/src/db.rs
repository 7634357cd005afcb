//! # PostgreSQL データベース接続管理
//!
//! データベース接続プールの作成とスキーマ同期を行う。
//!
//! ## スキーマ同期
//!
//! マイグレーションファイルは持たず、起動時に [`ensure_schema`] が
//! `CREATE TABLE IF NOT EXISTS` を実行する。何度実行しても結果は同じ。
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use sqlx::postgres::PgConnectOptions;
//! use userdesk_infra::db;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = PgConnectOptions::new()
//!         .host("localhost")
//!         .username("postgres")
//!         .password("postgres")
//!         .database("userdesk");
//!     let pool = db::create_pool(options, 10).await?;
//!     db::ensure_schema(&pool).await?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};

use crate::error::InfraError;

/// `users` テーブルの DDL
///
/// `email` の UNIQUE 制約により、検証チェーンをすり抜けた
/// 同時リクエストでも重複は永続化されない。
const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            UUID        PRIMARY KEY,
    name          TEXT        NOT NULL,
    email         TEXT        NOT NULL UNIQUE,
    password_hash TEXT        NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// PostgreSQL 接続プールを作成する
///
/// アプリケーション起動時に一度だけ呼び出し、作成したプールを
/// アプリケーション全体で共有する。
///
/// # 設定値
///
/// - `max_connections`: 最大接続数
/// - `acquire_timeout(5秒)`: 接続取得のタイムアウト。超過時はエラー
pub async fn create_pool(
    options: PgConnectOptions,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}

/// `users` テーブルが存在しなければ作成する
#[tracing::instrument(skip_all, level = "debug")]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), InfraError> {
    sqlx::query(CREATE_USERS_TABLE).execute(pool).await?;
    Ok(())
}
