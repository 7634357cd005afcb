//! # パスワードハッシュ
//!
//! Argon2id を使用したパスワードのハッシュ化と検証を提供する。
//!
//! ## パラメータ
//!
//! | 項目 | 値 |
//! |------|----|
//! | アルゴリズム | Argon2id |
//! | バージョン | 0x13 |
//! | メモリ | 64 MiB |
//! | 反復回数 | 1 |
//! | 並列度 | 1 |
//! | ソルト | 16 バイト（OS 乱数） |
//!
//! ハッシュ化・検証は CPU 負荷が高いため、呼び出し側で
//! `tokio::task::spawn_blocking` に載せて実行する。

use argon2::{
    Algorithm,
    Argon2,
    Params,
    PasswordHasher as _,
    PasswordVerifier as _,
    Version,
    password_hash::{PasswordHash as Argon2PasswordHash, Salt, SaltString},
};
use rand::{TryRngCore, rngs::OsRng};
use userdesk_domain::password::{PasswordHash, PasswordVerifyResult, PlainPassword};

use crate::InfraError;

/// ダミーハッシュ（有効な Argon2id 形式）
///
/// 存在しないユーザーへのログイン試行でも、実在ユーザーと同じ
/// コストの検証を行うために使用する。
pub const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=65536,t=1,p=1$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// パスワードハッシュトレイト
pub trait PasswordHasher: Send + Sync {
    /// 平文パスワードをハッシュ化する
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError>;

    /// パスワードを検証する
    ///
    /// ハッシュ形式が不正な場合は `Err` を返す。
    fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<PasswordVerifyResult, InfraError>;

    /// ダミーハッシュで検証を実行する
    ///
    /// 結果は常に破棄する。
    fn verify_dummy(&self, password: &PlainPassword) {
        let _ = self.verify(password, &PasswordHash::new(DUMMY_PASSWORD_HASH));
    }
}

/// Argon2id によるパスワードハッシュ実装
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    const MEMORY_KIB: u32 = 64 * 1024;
    const ITERATIONS: u32 = 1;
    const PARALLELISM: u32 = 1;

    /// 本番用パラメータで作成する
    pub fn new() -> Result<Self, InfraError> {
        Self::with_params(Self::MEMORY_KIB, Self::ITERATIONS, Self::PARALLELISM)
    }

    /// パラメータを指定して作成する
    ///
    /// テストでは軽量なパラメータを渡して実行時間を短縮する。
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, InfraError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| InfraError::password_hash(format!("invalid Argon2 parameters: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError> {
        let mut salt_bytes = [0u8; Salt::RECOMMENDED_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| InfraError::password_hash(e.to_string()))?;
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| InfraError::password_hash(e.to_string()))?;

        let hash = self
            .argon2
            .hash_password(password.as_str().as_bytes(), &salt)
            .map_err(|e| InfraError::password_hash(e.to_string()))?;

        Ok(PasswordHash::new(hash.to_string()))
    }

    fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<PasswordVerifyResult, InfraError> {
        let parsed = Argon2PasswordHash::new(hash.as_str())
            .map_err(|e| InfraError::password_hash(format!("malformed hash: {e}")))?;

        let matched = self
            .argon2
            .verify_password(password.as_str().as_bytes(), &parsed)
            .is_ok();

        Ok(PasswordVerifyResult::from(matched))
    }
}
