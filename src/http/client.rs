use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::Result;
use crate::error::ReqlabError;
use crate::http::request::RequestModel;
use crate::http::response::ResponseRecord;

/// 请求超时时间，超时按传输失败处理
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    pub fn new() -> Result<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self {
            inner: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// 发送请求
    ///
    /// 只有 URL 为空时返回 `Err`（此时不会发起任何网络调用）；
    /// 其余所有失败都会变成 `status == 0` 的 [`ResponseRecord`]。
    pub async fn execute(&self, request: &RequestModel) -> Result<ResponseRecord> {
        request.validate()?;

        let start = Instant::now();
        debug!("Sending {} {}", request.method, request.url);

        match self.perform(request, start).await {
            Ok(record) => {
                debug!("Received {} in {}ms", record.status, record.time);
                Ok(record)
            }
            Err(e) => {
                debug!("Request failed: {}", e);
                Ok(ResponseRecord::failure(describe(&e), start.elapsed()))
            }
        }
    }

    /// 把 RequestModel 转换为实际发送的请求
    pub fn prepare(&self, request: &RequestModel) -> Result<reqwest::Request> {
        let url = request.effective_url()?;

        let mut headers = HeaderMap::new();
        for (key, value) in request.effective_headers() {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| ReqlabError::Other(format!("Invalid header name {:?}: {}", key, e)))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|e| ReqlabError::Other(format!("Invalid value for {}: {}", key, e)))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .inner
            .request(request.method.to_reqwest(), url)
            .headers(headers);

        // 请求体原样发送
        if request.carries_body() {
            builder = builder.body(request.body.clone());
        }

        Ok(builder.build()?)
    }

    async fn perform(&self, request: &RequestModel, start: Instant) -> Result<ResponseRecord> {
        let prepared = self.prepare(request)?;
        let response = self.inner.execute(prepared).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let data = response.text().await?;

        Ok(ResponseRecord::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            &headers,
            data,
            start.elapsed(),
        ))
    }
}

/// 错误描述：首行为错误本身，随后列出底层原因
fn describe(err: &ReqlabError) -> String {
    let mut description = format!("Error: {}", err);

    let mut details = Vec::new();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        details.push(cause.to_string());
        source = cause.source();
    }

    if !details.is_empty() {
        description.push_str("\n\nDetails:\n");
        description.push_str(&details.join("\n"));
    }
    description
}
