//! # ミドルウェア
//!
//! User Service 用のミドルウェアを提供する。

mod authenticate;

pub use authenticate::{AuthState, AuthenticatedUser, require_token};
