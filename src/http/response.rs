use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

/// 传输失败时的状态文本
pub const FAILED_STATUS_TEXT: &str = "Request Failed";

/// 一次请求的结果
///
/// `status == 0` 表示没有收到 HTTP 响应（网络错误、超时、URL 无效等）。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// 原始响应体文本，不做结构化解析
    #[serde(default)]
    pub data: String,
    /// 耗时 (毫秒)
    #[serde(default)]
    pub time: u64,
    /// `data` 的字节长度
    #[serde(default)]
    pub size: usize,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl ResponseRecord {
    pub fn new(
        status: u16,
        status_text: impl Into<String>,
        headers: &HeaderMap,
        data: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: flatten_headers(headers),
            size: data.len(),
            data,
            time: elapsed.as_millis() as u64,
            error: false,
        }
    }

    /// 合成一个传输失败的结果，保证耗时和大小依然可用
    pub fn failure(description: impl Into<String>, elapsed: Duration) -> Self {
        let data = description.into();
        Self {
            status: 0,
            status_text: FAILED_STATUS_TEXT.to_string(),
            headers: BTreeMap::new(),
            size: data.len(),
            data,
            time: elapsed.as_millis() as u64,
            error: true,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error || self.status == 0
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..=399).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..=499).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// 同名响应头用 ", " 合并
fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers.iter() {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}
