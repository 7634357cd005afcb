//! # User Service ライブラリ
//!
//! ユーザーアカウント管理 API のコアモジュール。
//!
//! ## モジュール構成
//!
//! - `app_builder`: DI とルーター構築
//! - `config`: 環境変数からの設定読み込み
//! - `error`: エラー定義と HTTP レスポンスへの変換
//! - `extract`: リクエストボディのエクストラクタ
//! - `handler`: HTTP ハンドラ
//! - `middleware`: 認証ミドルウェア
//! - `usecase`: ビジネスロジック
//! - `validation`: 検証チェーン

pub mod app_builder;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod middleware;
pub mod usecase;
pub mod validation;
