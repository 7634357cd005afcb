//! # インフラ層エラー定義
//!
//! データベース、パスワードハッシュ、トークン処理で発生するエラーを表現する。
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別（Database, Conflict, Token 等）
//!
//! `From` 実装や convenience constructor でエラーを生成すると、
//! その時点のスパン情報が自動的にキャプチャされる。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別に応じた処理には [`kind()`](InfraError::kind) を使用する:
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::Conflict { entity, id } => { /* 一意制約違反 */ }
///     _ => { /* その他 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
///
/// `Display` はレスポンスの `<cause>` 部分にそのまま使われるため、
/// 英語のメッセージで定義する。
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// データベースエラー
    ///
    /// SQL クエリの実行失敗、接続エラーなど。
    #[error("{0}")]
    Database(#[source] sqlx::Error),

    /// 一意制約違反
    #[error("{entity} {id} already exists")]
    Conflict {
        /// エンティティ名（"User" など）
        entity: String,
        /// 競合した識別子
        id:     String,
    },

    /// パスワードハッシュの生成・解析失敗
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// トークンの発行・検証失敗
    #[error("token error: {0}")]
    Token(#[source] jsonwebtoken::errors::Error),

    /// 予期しないエラー
    #[error("{0}")]
    Unexpected(String),
}

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// エラー生成時の SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 一意制約違反の場合はエンティティ名と ID を返す
    pub fn as_conflict(&self) -> Option<(&str, &str)> {
        match &self.kind {
            InfraErrorKind::Conflict { entity, id } => Some((entity.as_str(), id.as_str())),
            _ => None,
        }
    }

    // Convenience constructors

    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::from_kind(InfraErrorKind::Conflict {
            entity: entity.into(),
            id:     id.into(),
        })
    }

    pub fn password_hash(msg: impl Into<String>) -> Self {
        Self::from_kind(InfraErrorKind::PasswordHash(msg.into()))
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::from_kind(InfraErrorKind::Unexpected(msg.into()))
    }

    fn from_kind(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        Self::from_kind(InfraErrorKind::Database(source))
    }
}

impl From<jsonwebtoken::errors::Error> for InfraError {
    fn from(source: jsonwebtoken::errors::Error) -> Self {
        Self::from_kind(InfraErrorKind::Token(source))
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;

    fn with_error_layer(f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
        let _guard = tracing::subscriber::set_default(subscriber);
        f();
    }

    #[test]
    fn test_from_sqlx_errorでspan_traceがキャプチャされる() {
        with_error_layer(|| {
            let span = tracing::info_span!("test_repo", email = "sue@example.com");
            let _enter = span.enter();

            let err: InfraError = sqlx::Error::RowNotFound.into();

            assert!(matches!(err.kind(), InfraErrorKind::Database(_)));
            let trace_str = format!("{}", err.span_trace());
            assert!(
                trace_str.contains("test_repo"),
                "SpanTrace がスパン名を含むこと: {trace_str}",
            );
        });
    }

    #[test]
    fn test_conflictでspan_traceがキャプチャされる() {
        with_error_layer(|| {
            let span = tracing::info_span!("test_insert");
            let _enter = span.enter();

            let err = InfraError::conflict("User", "sue@example.com");

            assert_eq!(err.as_conflict(), Some(("User", "sue@example.com")));
            let trace_str = format!("{}", err.span_trace());
            assert!(
                trace_str.contains("test_insert"),
                "SpanTrace がスパン名を含むこと: {trace_str}",
            );
        });
    }

    #[test]
    fn test_displayはエラー種別のメッセージを返す() {
        let err = InfraError::unexpected("connection reset");
        assert_eq!(err.to_string(), "connection reset");

        let err = InfraError::conflict("User", "sue@example.com");
        assert_eq!(err.to_string(), "User sue@example.com already exists");
    }

    #[test]
    fn test_conflict以外はas_conflictがnone() {
        let err = InfraError::password_hash("invalid salt");
        assert!(err.as_conflict().is_none());
        assert!(matches!(err.kind(), InfraErrorKind::PasswordHash(_)));
    }
}
