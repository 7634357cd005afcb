//! # ドメイン層エラー定義
//!
//! ビジネスルール違反を表現するエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 値オブジェクトの生成失敗 |

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// メッセージはそのままレスポンスボディに載る可能性があるため、
/// クライアント向けの英語文言で定義する。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 値オブジェクトの不変条件（必須、文字数、形式）に違反した場合に使用する。
    #[error("{0}")]
    Validation(String),
}
