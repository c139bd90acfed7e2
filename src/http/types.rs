use std::fmt;
use std::str::FromStr;

use crate::{ReqlabError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl FromStr for Method {
    type Err = ReqlabError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(ReqlabError::Other(format!("Invalid HTTP method: {}", s))),
        }
    }
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Head,
        Method::Options,
    ];

    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// 只有 POST / PUT / PATCH 会携带请求体
    pub fn allows_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 请求体类型
///
/// 只影响 Content-Type，请求体本身总是原样发送。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    #[default]
    Json,
    Form,
    Xml,
    Text,
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::Json => "json",
            BodyType::Form => "form",
            BodyType::Xml => "xml",
            BodyType::Text => "text",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            BodyType::Json => "application/json",
            _ => "application/x-www-form-urlencoded",
        }
    }
}

impl FromStr for BodyType {
    type Err = ReqlabError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(BodyType::Json),
            "form" => Ok(BodyType::Form),
            "xml" => Ok(BodyType::Xml),
            "text" => Ok(BodyType::Text),
            _ => Err(ReqlabError::Other(format!("Invalid body type: {}", s))),
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 默认 host，当输入中未指定 host 时使用
const DEFAULT_HOST: &str = "localhost";
/// 默认 scheme，当输入中未指定 scheme 时使用
const DEFAULT_SCHEME: &str = "http";

/// 补全命令行里的 URL 简写
///
/// 处理各种简化格式:
/// 1. ":3000" -> "http://localhost:3000/"
/// 2. "localhost:3000" -> "http://localhost:3000/"
/// 3. "https://:8080" -> "https://localhost:8080/"
/// 4. ":/api" -> "http://localhost/api"
///
/// 空输入保持为空，交给发送前的校验处理。
pub fn normalize_url(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }

    let normalized = if input.starts_with(':') {
        format!("{}://{}{}", DEFAULT_SCHEME, DEFAULT_HOST, input)
    } else if let Some(pos) = input.find("://") {
        let after_scheme = &input[pos + 3..];
        if after_scheme.starts_with(':') {
            format!("{}://{}{}", &input[..pos], DEFAULT_HOST, after_scheme)
        } else {
            input.to_string()
        }
    } else {
        format!("{}://{}", DEFAULT_SCHEME, input)
    };

    // 交给 url 解析器规范化（去掉空端口、补根路径）；无法解析时原样保留
    url::Url::parse(&normalized)
        .map(|url| url.to_string())
        .unwrap_or(normalized)
}
