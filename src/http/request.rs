use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::ReqlabError;
use crate::http::types::{BodyType, Method};
use crate::i18n::Notice;

/// 未能从 URL 推断名称时使用的默认 API 名称
pub const FALLBACK_API_NAME: &str = "API";

/// 一行请求头或查询参数
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub enabled: bool,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(key, value)
        }
    }

    /// 启用且 key、value 都非空时才会被发送
    pub fn is_applied(&self) -> bool {
        self.enabled && !self.key.is_empty() && !self.value.is_empty()
    }

    /// 占位空行：key 和 value 都为空
    pub fn is_blank(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

/// 去掉界面补齐用的空行，只保留真实数据
pub fn compact_rows(rows: &[KeyValue]) -> Vec<KeyValue> {
    rows.iter().filter(|row| !row.is_blank()).cloned().collect()
}

/// 生成显示用的行：真实数据之后补齐空行，至少 `min_rows` 行
pub fn display_rows(rows: &[KeyValue], min_rows: usize) -> Vec<KeyValue> {
    let mut display = compact_rows(rows);
    while display.len() < min_rows {
        display.push(KeyValue::disabled("", ""));
    }
    display
}

/// 一次 HTTP 调用的完整描述
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestModel {
    #[serde(default)]
    pub method: Method,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    #[serde(default)]
    pub params: Vec<KeyValue>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub body_type: BodyType,
}

impl RequestModel {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push(KeyValue::new(key, value));
        self
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.params.push(KeyValue::new(key, value));
        self
    }

    pub fn with_body(mut self, body: &str, body_type: BodyType) -> Self {
        self.body = body.to_owned();
        self.body_type = body_type;
        self
    }

    /// 发送前校验：URL 不能为空
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(ReqlabError::Validation(Notice::UrlRequired));
        }
        Ok(())
    }

    pub fn applied_headers(&self) -> impl Iterator<Item = &KeyValue> {
        self.headers.iter().filter(|h| h.is_applied())
    }

    pub fn applied_params(&self) -> impl Iterator<Item = &KeyValue> {
        self.params.iter().filter(|p| p.is_applied())
    }

    /// 实际发送的请求头
    ///
    /// 按顺序应用，同名（不区分大小写）时后者覆盖前者；
    /// 需要请求体时 Content-Type 由 body 类型决定。
    pub fn effective_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = Vec::new();
        for header in self.applied_headers() {
            set_header(&mut headers, &header.key, &header.value);
        }
        if self.carries_body() {
            set_header(&mut headers, "Content-Type", self.body_type.content_type());
        }
        headers
    }

    /// 实际请求的 URL
    ///
    /// 查询参数追加在 URL 已有的 query 之后，重复的 key 会保留为多个参数。
    pub fn effective_url(&self) -> Result<url::Url> {
        let mut url = url::Url::parse(self.url.trim())?;
        if self.applied_params().next().is_some() {
            let mut pairs = url.query_pairs_mut();
            for param in self.applied_params() {
                pairs.append_pair(&param.key, &param.value);
            }
        }
        Ok(url)
    }

    /// GET / DELETE / HEAD / OPTIONS 永远不带请求体
    pub fn carries_body(&self) -> bool {
        self.method.allows_body() && !self.body.is_empty()
    }

    /// 保存到集合时的默认名称：URL 路径的最后一段
    pub fn suggested_name(&self) -> String {
        url::Url::parse(self.url.trim())
            .ok()
            .and_then(|url| {
                url.path_segments()
                    .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| FALLBACK_API_NAME.to_string())
    }

    /// 去掉 headers / params 中的空行
    pub fn compacted(&self) -> RequestModel {
        RequestModel {
            headers: compact_rows(&self.headers),
            params: compact_rows(&self.params),
            ..self.clone()
        }
    }
}

fn set_header(headers: &mut Vec<(String, String)>, key: &str, value: &str) {
    if let Some(existing) = headers
        .iter_mut()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
    {
        existing.1 = value.to_string();
    } else {
        headers.push((key.to_string(), value.to_string()));
    }
}
