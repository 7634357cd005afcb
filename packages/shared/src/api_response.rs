//! # API レスポンス
//!
//! 成功時のメッセージレスポンス `{ "message": "..." }` を提供する。

use serde::{Deserialize, Serialize};

/// 成功メッセージレスポンス
///
/// アカウントの作成・更新・削除・ログイン成功時に返す。
///
/// ## 使用例
///
/// ```
/// use userdesk_shared::MessageResponse;
///
/// let response = MessageResponse::new("User sue@example.com successfully created");
/// assert_eq!(response.message, "User sue@example.com successfully created");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// 新しい `MessageResponse` を作成する
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_serializeを正しいjson形状にする() {
        let response = MessageResponse::new("Welcome back, Sue!");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, serde_json::json!({ "message": "Welcome back, Sue!" }));
    }

    #[test]
    fn test_deserializeでjsonからオブジェクトに変換する() {
        let json = r#"{"message": "User a@example.com successfully deleted"}"#;
        let response: MessageResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.message, "User a@example.com successfully deleted");
    }
}
