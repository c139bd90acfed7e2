//! 重试/重放通道
//!
//! 单槽缓冲：历史记录或集合中的请求先被"暂存"，
//! 请求构建器初始化时"取出"并填充到当前请求中。
//! 槽位只保存最新一次暂存的值，取出操作是原子的读取并删除。

use tracing::{debug, warn};

use crate::Result;
use crate::collection::SavedRequest;
use crate::history::HistoryEntry;
use crate::http::RequestModel;
use crate::store::{SharedStore, StoreKey, json};

/// 可以被重放的记录
pub trait Replayable {
    fn request_model(&self) -> RequestModel;
}

impl Replayable for RequestModel {
    fn request_model(&self) -> RequestModel {
        self.clone()
    }
}

impl Replayable for HistoryEntry {
    fn request_model(&self) -> RequestModel {
        self.request.clone()
    }
}

impl Replayable for SavedRequest {
    fn request_model(&self) -> RequestModel {
        self.request.clone()
    }
}

pub struct RetryBridge {
    store: SharedStore,
}

impl RetryBridge {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// 暂存一个请求，覆盖尚未被取出的旧值
    pub fn stage(&self, item: &impl Replayable) -> Result<()> {
        let request = item.request_model().compacted();
        debug!("Staging replay of {} {}", request.method, request.url);
        json::save(self.store.as_ref(), StoreKey::RetryBuffer, &request)
    }

    /// 取出暂存的请求并写入 `target`
    ///
    /// 返回是否载入了新请求。槽位内容损坏时直接清除，`target` 保持不变。
    pub fn consume(&self, target: &mut RequestModel) -> bool {
        let raw = match self.store.take(StoreKey::RetryBuffer) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                warn!("Failed to read retry buffer: {}", e);
                return false;
            }
        };

        match json::decode::<RequestModel>(&raw) {
            Ok(request) => {
                *target = request;
                true
            }
            Err(e) => {
                warn!("Discarding corrupt retry buffer: {}", e);
                false
            }
        }
    }

    /// 是否有待取出的请求
    pub fn is_pending(&self) -> Result<bool> {
        Ok(self.store.get(StoreKey::RetryBuffer)?.is_some())
    }
}
