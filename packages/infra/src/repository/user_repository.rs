//! # UserRepository
//!
//! ユーザー情報の永続化を担当するリポジトリ。
//!
//! クエリは実行時に組み立てる（`sqlx::query_as`）。ビルド時に
//! データベース接続を必要としない。

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use userdesk_domain::{
    password::PasswordHash,
    user::{Email, User, UserId, UserName},
};
use uuid::Uuid;

use crate::error::InfraError;

/// ユーザーリポジトリトレイト
///
/// ユーザー情報の永続化操作を定義する。
/// ユースケース層・検証チェーンから `Arc<dyn UserRepository>` として利用する。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 全ユーザーをメールアドレスの昇順で取得
    ///
    /// 順序はバイト列の比較（照合順序 `C`）。大文字は小文字より前に並ぶ。
    async fn find_all(&self) -> Result<Vec<User>, InfraError>;

    /// メールアドレスでユーザーを検索
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(user))`: ユーザーが見つかった場合
    /// - `Ok(None)`: ユーザーが見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError>;

    /// ユーザーを挿入
    ///
    /// メールアドレスが既に存在する場合は `InfraErrorKind::Conflict` を返す。
    async fn insert(&self, user: &User) -> Result<(), InfraError>;

    /// メールアドレスで特定したユーザーの表示名とパスワードハッシュを更新
    ///
    /// 更新対象が存在した場合は `true` を返す。
    async fn update_by_email(
        &self,
        email: &Email,
        name: &UserName,
        password_hash: &PasswordHash,
    ) -> Result<bool, InfraError>;

    /// メールアドレスで特定したユーザーを削除
    ///
    /// 削除対象が存在した場合は `true` を返す。
    async fn delete_by_email(&self, email: &Email) -> Result<bool, InfraError>;

    /// ユーザー数を取得
    async fn count(&self) -> Result<i64, InfraError>;

    /// データベースへの疎通確認
    async fn ping(&self) -> Result<(), InfraError>;
}

/// `users` テーブルの行
#[derive(Debug, FromRow)]
struct UserRow {
    id:            Uuid,
    name:          String,
    email:         String,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = InfraError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User::from_db(
            UserId::from_uuid(row.id),
            UserName::new(row.name).map_err(|e| InfraError::unexpected(e.to_string()))?,
            Email::new(row.email).map_err(|e| InfraError::unexpected(e.to_string()))?,
            PasswordHash::new(row.password_hash),
        ))
    }
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<User>, InfraError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash
            FROM users
            ORDER BY email COLLATE "C" ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%email))]
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(user_id = %user.id()))]
    async fn insert(&self, user: &User) -> Result<(), InfraError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.name().as_str())
        .bind(user.email().as_str())
        .bind(user.password_hash().as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(InfraError::conflict("User", user.email().as_str()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%email))]
    async fn update_by_email(
        &self,
        email: &Email,
        name: &UserName,
        password_hash: &PasswordHash,
    ) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, password_hash = $3, updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .bind(name.as_str())
        .bind(password_hash.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%email))]
    async fn delete_by_email(&self, email: &Email) -> Result<bool, InfraError> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn count(&self) -> Result<i64, InfraError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn ping(&self) -> Result<(), InfraError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
