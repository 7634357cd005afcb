//! # ヘルスチェックのレスポンス型
//!
//! `/health` と `/health/ready` が返す JSON の形状。

use std::collections::BTreeMap;

use serde::Serialize;

/// `/health` のレスポンス
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// プロセスが応答できれば常に `"healthy"`
    pub status:  &'static str,
    pub version: &'static str,
}

/// 依存先 1 件分の確認結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Ready,
    NotReady,
}

/// `/health/ready` のレスポンス
///
/// `checks` は依存先名の昇順で出力する。
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: ReadinessStatus,
    pub checks: BTreeMap<&'static str, CheckStatus>,
}

impl ReadinessResponse {
    /// 全依存先が `Ok` のときだけ `Ready` にする
    pub fn from_checks(checks: BTreeMap<&'static str, CheckStatus>) -> Self {
        let status = if checks.values().all(|c| *c == CheckStatus::Ok) {
            ReadinessStatus::Ready
        } else {
            ReadinessStatus::NotReady
        };
        Self { status, checks }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::全てok(&[("database", CheckStatus::Ok)], json!({ "status": "ready", "checks": { "database": "ok" } }))]
    #[case::一つでもerror(
        &[("database", CheckStatus::Ok), ("cache", CheckStatus::Error)],
        json!({ "status": "not_ready", "checks": { "cache": "error", "database": "ok" } })
    )]
    #[case::チェックなし(&[], json!({ "status": "ready", "checks": {} }))]
    fn test_from_checksの判定とjson形状(
        #[case] checks: &[(&'static str, CheckStatus)],
        #[case] expected: serde_json::Value,
    ) {
        let response = ReadinessResponse::from_checks(checks.iter().copied().collect());

        assert_eq!(serde_json::to_value(&response).unwrap(), expected);
    }
}
