//! # アクセストークン
//!
//! HS256 で署名した JWT の発行と検証を提供する。
//!
//! ## クレーム
//!
//! | クレーム | 内容 |
//! |---------|------|
//! | `sub` | ユーザー ID（UUID） |
//! | `iat` | 発行時刻（UNIX 秒） |
//! | `exp` | 有効期限（UNIX 秒） |
//!
//! サーバー側にセッションは持たない。失効リストもない。

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use userdesk_domain::user::UserId;
use uuid::Uuid;

use crate::InfraError;

/// トークンのクレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub iat: u64,
    pub exp: u64,
}

impl AccessClaims {
    /// クレームが示すユーザー ID
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.sub)
    }
}

/// 発行済みトークン
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// エンコード済みトークン
    pub token:      String,
    /// 有効期限（UNIX 秒）
    pub expires_at: u64,
}

/// トークンサービストレイト
pub trait TokenService: Send + Sync {
    /// ユーザー ID を主体とするトークンを発行する
    fn issue(&self, user_id: &UserId) -> Result<IssuedToken, InfraError>;

    /// 署名と有効期限を検証し、クレームを返す
    fn verify(&self, token: &str) -> Result<AccessClaims, InfraError>;
}

/// JWT（HS256）によるトークンサービス
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation:   Validation,
    expires_in:   u64,
}

impl JwtTokenService {
    /// 署名鍵と有効期間（秒）を指定して作成する
    pub fn new(secret: &str, expires_in: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expires_in,
        }
    }

    /// 発行時刻を指定してトークンを作成する
    fn issue_at(&self, user_id: &UserId, now: u64) -> Result<IssuedToken, InfraError> {
        let exp = now.checked_add(self.expires_in).ok_or_else(|| {
            InfraError::unexpected(format!(
                "token expiry overflows: now={now}, expires_in={}",
                self.expires_in
            ))
        })?;
        let claims = AccessClaims {
            sub: *user_id.as_uuid(),
            iat: now,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("secret", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: &UserId) -> Result<IssuedToken, InfraError> {
        self.issue_at(user_id, jsonwebtoken::get_current_timestamp())
    }

    fn verify(&self, token: &str) -> Result<AccessClaims, InfraError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
