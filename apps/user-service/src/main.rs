//! # User Service サーバー
//!
//! ユーザーアカウントの作成・一覧・更新・削除とログインを提供する API サーバー。
//!
//! ## 役割
//!
//! - **アカウント管理**: `users` テーブルに対する CRUD
//! - **認証**: Argon2id によるパスワード検証と JWT（HS256）の発行
//! - **入力検証**: ハンドラ実行前の検証チェーン
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `APP_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `APP_PORT` | No | ポート番号（デフォルト: `3000`） |
//! | `DB_HOST` / `DB_PORT` | No | PostgreSQL の接続先（デフォルト: `localhost:5432`） |
//! | `DB_USERNAME` / `DB_PASSWORD` / `DB_DATABASE` | **Yes** | PostgreSQL の認証情報とデータベース名 |
//! | `DB_MAX_CONNECTIONS` | No | 接続プールの最大数（デフォルト: `10`） |
//! | `TOKEN_SECRET` | **Yes** | トークンの署名鍵 |
//! | `TOKEN_EXPIRES_IN` | No | トークンの有効期間（秒、デフォルト: `1800`） |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用）
//! cargo run -p userdesk-user-service
//!
//! # 本番環境
//! DB_USERNAME=... DB_PASSWORD=... DB_DATABASE=... TOKEN_SECRET=... \
//!   LOG_FORMAT=json cargo run -p userdesk-user-service --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use tokio::net::TcpListener;
use userdesk_infra::{
    Argon2PasswordHasher,
    JwtTokenService,
    db,
    repository::{PostgresUserRepository, UserRepository},
};
use userdesk_shared::observability::{LogFormat, init_tracing};
use userdesk_user_service::{
    app_builder::{AppDependencies, build_router},
    config::AppConfig,
};

/// User Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    init_tracing(LogFormat::from_env());
    let _tracing_guard = tracing::info_span!("app", service = "user-service").entered();

    // 設定読み込み
    let config = AppConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "User Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成
    let pool = db::create_pool(
        config.database.connect_options(),
        config.database.max_connections,
    )
    .await
    .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    // スキーマ同期
    db::ensure_schema(&pool)
        .await
        .context("スキーマの同期に失敗しました")?;

    // 依存コンポーネントを初期化
    let repository: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool));
    let user_count = repository
        .count()
        .await
        .context("ユーザー数の取得に失敗しました")?;
    tracing::info!(user_count, "スキーマを同期しました");

    let hasher = Arc::new(Argon2PasswordHasher::new().context("Argon2 の初期化に失敗しました")?);
    let token_service = Arc::new(JwtTokenService::new(
        &config.token.secret,
        config.token.expires_in,
    ));

    // ルーター構築
    let app = build_router(AppDependencies {
        repository,
        hasher,
        token_service,
    })
    .context("ルーターの構築に失敗しました")?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("User Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("User Service サーバーを停止しました");
    Ok(())
}

/// Ctrl-C または SIGTERM を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Ctrl-C ハンドラの登録に失敗しました: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("SIGTERM ハンドラの登録に失敗しました: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("シャットダウンシグナルを受信しました");
}
