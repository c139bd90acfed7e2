use thiserror::Error;

use crate::i18n::Notice;

#[derive(Error, Debug)]
pub enum ReqlabError {
    #[error("校验失败: {0}")]
    Validation(Notice),

    #[error("无效的 URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP 请求失败: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL 解析错误: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("配置文件解析错误: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl ReqlabError {
    /// 校验类错误携带的提示，其余错误返回 None
    pub fn notice(&self) -> Option<Notice> {
        match self {
            ReqlabError::Validation(notice) => Some(*notice),
            _ => None,
        }
    }
}

// Add conversion from anyhow::Error
impl From<anyhow::Error> for ReqlabError {
    fn from(err: anyhow::Error) -> Self {
        ReqlabError::Other(err.to_string())
    }
}

/// Result type for reqlab crate
pub type Result<T> = std::result::Result<T, ReqlabError>;
