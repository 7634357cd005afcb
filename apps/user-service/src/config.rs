//! # User Service 設定
//!
//! 環境変数から User Service の設定を読み込む。
//!
//! 起動時に一度だけ構築し、各コンポーネントへ値として渡す。
//! 構築後に変更されることはない。

use std::env;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値の形式が不正
    #[error("{name} の値が不正です: {reason}")]
    Invalid {
        name:   &'static str,
        reason: String,
    },
}

/// トークン有効期間の上限（秒、365 日）
pub const MAX_TOKEN_EXPIRES_IN: u64 = 365 * 24 * 60 * 60;

/// User Service サーバーの設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// バインドアドレス
    pub host:     String,
    /// ポート番号
    pub port:     u16,
    /// データベース接続設定
    pub database: DatabaseConfig,
    /// トークン設定
    pub token:    TokenConfig,
}

/// PostgreSQL 接続設定
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host:            String,
    pub port:            u16,
    pub username:        String,
    pub password:        String,
    pub database:        String,
    pub max_connections: u32,
}

/// アクセストークン設定
#[derive(Clone)]
pub struct TokenConfig {
    /// HS256 署名鍵
    pub secret:     String,
    /// 有効期間（秒）
    pub expires_in: u64,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意のルックアップ関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let token = TokenConfig {
            secret:     vars.required("TOKEN_SECRET")?,
            expires_in: vars.parsed("TOKEN_EXPIRES_IN", 1800)?,
        };
        if token.expires_in == 0 || token.expires_in > MAX_TOKEN_EXPIRES_IN {
            return Err(ConfigError::Invalid {
                name:   "TOKEN_EXPIRES_IN",
                reason: format!("must be between 1 and {MAX_TOKEN_EXPIRES_IN}"),
            });
        }

        Ok(Self {
            host: vars.optional("APP_HOST", "0.0.0.0"),
            port: vars.parsed("APP_PORT", 3000)?,
            database: DatabaseConfig {
                host:            vars.optional("DB_HOST", "localhost"),
                port:            vars.parsed("DB_PORT", 5432)?,
                username:        vars.required("DB_USERNAME")?,
                password:        vars.required("DB_PASSWORD")?,
                database:        vars.required("DB_DATABASE")?,
                max_connections: vars.parsed("DB_MAX_CONNECTIONS", 10)?,
            },
            token,
        })
    }
}

impl DatabaseConfig {
    /// sqlx の接続オプションに変換する
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// 環境変数ルックアップのラッパー
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn optional(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: format!("{value:?}: {e}"),
            }),
            None => Ok(default),
        }
    }
}
