//! # リポジトリ実装
//!
//! ユースケース層が利用するリポジトリトレイトと、その PostgreSQL 実装を提供する。

pub mod user_repository;

pub use user_repository::{PostgresUserRepository, UserRepository};
