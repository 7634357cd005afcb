//! # ルートハンドラ

/// GET /
pub async fn home() -> &'static str {
    "Hello!"
}
