use crate::history::model::HistoryEntry;
use crate::history::storage::HistoryStorage;
use crate::http::{RequestModel, ResponseRecord};
use crate::settings::AppContext;
use tracing::{debug, warn};

/// 记录请求历史
///
/// 自动保存关闭时什么也不做。
/// 这是一个 Best-effort 操作，如果写入失败会打印警告，但不会返回错误。
pub fn record_history(
    ctx: &AppContext,
    request: &RequestModel,
    response: &ResponseRecord,
) -> Option<HistoryEntry> {
    if !ctx.auto_save() {
        debug!("Auto-save disabled, skipping history");
        return None;
    }

    let entry = HistoryEntry::new(request.clone(), response.clone());
    let storage = HistoryStorage::new(ctx.store().clone());

    match storage.prepend(entry.clone()) {
        Ok(()) => Some(entry),
        Err(e) => {
            warn!("Failed to save request history: {}", e);
            None
        }
    }
}
