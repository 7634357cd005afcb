//! # リクエストボディ抽出
//!
//! JSON ボディを読み取るエクストラクタ。
//!
//! `axum::Json` と異なり、以下を許容する:
//!
//! - 空ボディ・空白のみのボディ → `T::default()`
//! - `Content-Type` ヘッダーの欠落
//!
//! 欠けたフィールドは検証チェーンで「必須」エラーとして報告する。

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// 寛容な JSON ボディ
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::MalformedBody(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| ApiError::MalformedBody(format!("Malformed JSON body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Payload {
        name:  String,
        email: String,
    }

    async fn extract(body: &'static str) -> Result<Payload, ApiError> {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap();
        JsonBody::<Payload>::from_request(request, &())
            .await
            .map(|JsonBody(payload)| payload)
    }

    #[rstest]
    #[case::空ボディ("")]
    #[case::空白のみ("  \n ")]
    #[case::空オブジェクト("{}")]
    #[tokio::test]
    async fn test_空の入力はデフォルト値になる(#[case] body: &'static str) {
        assert_eq!(extract(body).await.unwrap(), Payload::default());
    }

    #[tokio::test]
    async fn test_一部のフィールドのみ指定できる() {
        let payload = extract(r#"{"name":"Sue"}"#).await.unwrap();

        assert_eq!(
            payload,
            Payload {
                name:  "Sue".to_string(),
                email: String::new(),
            }
        );
    }

    #[rstest]
    #[case::不正なjson("{not json")]
    #[case::型不一致(r#"{"name":1}"#)]
    #[tokio::test]
    async fn test_解釈できないボディはmalformed_body(#[case] body: &'static str) {
        let result = extract(body).await;

        assert!(
            matches!(result, Err(ApiError::MalformedBody(ref m)) if m.starts_with("Malformed JSON body"))
        );
    }
}
