//! # ログ出力
//!
//! `tracing` サブスクライバの初期化と、HTTP リクエスト単位のスパン生成。
//! 出力形式は環境変数 `LOG_FORMAT`（`json` / `pretty`）で選ぶ。

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "info,userdesk=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 行 1 イベントの JSON
    Json,
    /// 端末向けの整形出力
    #[default]
    Pretty,
}

impl LogFormat {
    /// `LOG_FORMAT` の値から形式を決める
    ///
    /// 前後の空白と大文字小文字は無視する。未設定・空は `Pretty`。
    /// 不明な値も `Pretty` にするが、サブスクライバ初期化前なので stderr に警告を出す。
    pub fn from_value(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::default();
        };

        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else if value.eq_ignore_ascii_case("pretty") {
            Self::Pretty
        } else {
            eprintln!("WARNING: LOG_FORMAT={value:?} is not json or pretty, using pretty");
            Self::Pretty
        }
    }

    pub fn from_env() -> Self {
        Self::from_value(std::env::var("LOG_FORMAT").ok().as_deref())
    }
}

/// グローバルサブスクライバを登録する
///
/// `ErrorLayer` を含めるので、`InfraError` が捕捉する `SpanTrace` に
/// ハンドラからリポジトリまでのスパンが残る。
#[cfg(feature = "observability")]
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();
}

/// `TraceLayer::make_span_with` 用のリクエストスパン
///
/// クエリ文字列はメールアドレスを含みうるため記録しない。
#[cfg(feature = "observability")]
pub fn make_request_span<B>(request: &http::Request<B>) -> tracing::Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none");

    tracing::info_span!(
        "http.request",
        http.method = %request.method(),
        http.path = request.uri().path(),
        request_id,
    )
}
