use tracing::{debug, info};

use crate::Result;
use crate::collection::{CollectionStorage, SaveTarget, SavedRequest};
use crate::history::{HistoryEntry, record_history};
use crate::http::{CancelToken, Client, RequestModel, ResponseRecord};
use crate::replay::RetryBridge;
use crate::settings::AppContext;

/// 一次发送的结果
#[derive(Debug)]
pub enum SendOutcome {
    /// 请求已完成（包括传输失败）；`history` 为写入的历史记录
    Completed {
        response: ResponseRecord,
        history: Option<HistoryEntry>,
    },
    /// 请求在完成前被取消，不写入历史
    Cancelled,
}

/// 请求构建器
///
/// 初始化时取出重放缓冲中的请求。`send` 需要 `&mut self`，
/// 同一个构建器上的发送天然串行；构建器被销毁时取消进行中的请求。
pub struct RequestBuilder<'a> {
    ctx: &'a AppContext,
    client: Client,
    request: RequestModel,
    cancel: CancelToken,
    replayed: bool,
}

impl<'a> RequestBuilder<'a> {
    pub fn open(ctx: &'a AppContext, client: Client) -> Self {
        let mut request = RequestModel::default();
        let replayed = RetryBridge::new(ctx.store().clone()).consume(&mut request);
        if replayed {
            info!("Loaded staged request {} {}", request.method, request.url);
        }

        Self {
            ctx,
            client,
            request,
            cancel: CancelToken::new(),
            replayed,
        }
    }

    /// 用给定请求打开构建器，不读取重放缓冲
    pub fn with_request(ctx: &'a AppContext, client: Client, request: RequestModel) -> Self {
        Self {
            ctx,
            client,
            request,
            cancel: CancelToken::new(),
            replayed: false,
        }
    }

    /// 构建器是否从重放缓冲载入了请求
    pub fn replayed(&self) -> bool {
        self.replayed
    }

    pub fn request(&self) -> &RequestModel {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut RequestModel {
        &mut self.request
    }

    pub fn set_request(&mut self, request: RequestModel) {
        self.request = request;
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// 发送当前请求
    ///
    /// URL 为空时返回校验错误，不发起网络调用也不写历史。
    pub async fn send(&mut self) -> Result<SendOutcome> {
        self.request.validate()?;

        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("Send cancelled");
                return Ok(SendOutcome::Cancelled);
            }
            result = self.client.execute(&self.request) => result?,
        };

        let history = record_history(self.ctx, &self.request, &response);
        Ok(SendOutcome::Completed { response, history })
    }

    /// 把当前请求保存到集合
    pub fn save(&self, api_name: &str, target: SaveTarget) -> Result<SavedRequest> {
        self.request.validate()?;
        CollectionStorage::new(self.ctx.store().clone()).save_request(
            &self.request,
            api_name,
            target,
        )
    }
}

impl Drop for RequestBuilder<'_> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryStorage;
    use crate::http::Method;
    use crate::i18n::Notice;
    use crate::store::FileStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_open_consumes_staged_request() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = AppContext::load(Arc::new(FileStore::new(temp_dir.path()))).unwrap();
        let staged = RequestModel::new(Method::Delete, "https://example.test/items/3");
        RetryBridge::new(ctx.store().clone()).stage(&staged).unwrap();

        let builder = RequestBuilder::open(&ctx, Client::new().unwrap());
        assert!(builder.replayed());
        assert_eq!(builder.request(), &staged);

        let second = RequestBuilder::open(&ctx, Client::new().unwrap());
        assert!(!second.replayed());
        assert_eq!(second.request(), &RequestModel::default());
    }

    #[test]
    fn test_with_request_keeps_staged_request() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = AppContext::load(Arc::new(FileStore::new(temp_dir.path()))).unwrap();
        let bridge = RetryBridge::new(ctx.store().clone());
        bridge
            .stage(&RequestModel::new(Method::Get, "https://example.test/staged"))
            .unwrap();

        let given = RequestModel::new(Method::Post, "https://example.test/given");
        let builder = RequestBuilder::with_request(&ctx, Client::new().unwrap(), given.clone());
        assert!(!builder.replayed());
        assert_eq!(builder.request(), &given);
        assert!(bridge.is_pending().unwrap());
    }

    #[tokio::test]
    async fn test_send_without_url_records_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = AppContext::load(Arc::new(FileStore::new(temp_dir.path()))).unwrap();
        let mut builder = RequestBuilder::open(&ctx, Client::new().unwrap());

        let err = builder.send().await.unwrap_err();
        assert_eq!(err.notice(), Some(Notice::UrlRequired));
        assert!(
            HistoryStorage::new(ctx.store().clone())
                .list()
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_cancelled_send_records_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = AppContext::load(Arc::new(FileStore::new(temp_dir.path()))).unwrap();
        let mut builder = RequestBuilder::open(&ctx, Client::new().unwrap());
        builder.set_request(RequestModel::new(Method::Get, "http://10.255.255.1/slow"));

        builder.cancel_token().cancel();
        let outcome = builder.send().await.unwrap();

        assert!(matches!(outcome, SendOutcome::Cancelled));
        assert!(
            HistoryStorage::new(ctx.store().clone())
                .list()
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_save_requires_url() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = AppContext::load(Arc::new(FileStore::new(temp_dir.path()))).unwrap();
        let builder = RequestBuilder::open(&ctx, Client::new().unwrap());

        let err = builder
            .save("name", SaveTarget::New { name: "c".into() })
            .unwrap_err();
        assert_eq!(err.notice(), Some(Notice::UrlRequired));
    }
}
