use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::{RequestModel, ResponseRecord};
use crate::utils::next_id;

/// 历史记录条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 创建时的毫秒时间戳，单调递增
    pub id: i64,

    /// 请求完成时间 (ISO-8601)
    pub timestamp: DateTime<Utc>,

    /// 请求快照，字段平铺在条目中
    #[serde(flatten)]
    pub request: RequestModel,

    /// 响应（或合成的失败结果）
    pub response: ResponseRecord,
}

impl HistoryEntry {
    pub fn new(request: RequestModel, response: ResponseRecord) -> Self {
        Self {
            id: next_id(),
            timestamp: Utc::now(),
            request: request.compacted(),
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{KeyValue, Method};

    #[test]
    fn test_request_fields_are_flattened() {
        let mut request = RequestModel::new(Method::Get, "https://example.test/ok");
        request.headers = vec![KeyValue::new("Accept", "*/*"), KeyValue::disabled("", "")];

        let entry = HistoryEntry::new(request, ResponseRecord::default());
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["method"], "GET");
        assert_eq!(value["url"], "https://example.test/ok");
        assert_eq!(value["bodyType"], "json");
        assert_eq!(value["headers"].as_array().unwrap().len(), 1);
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
        assert_eq!(value["response"]["status"], 0);
    }

    #[test]
    fn test_parses_browser_shaped_entry() {
        let raw = r#"{
            "id": 1718000000000,
            "timestamp": "2024-06-10T06:13:20.000Z",
            "method": "POST",
            "url": "https://example.test/users",
            "headers": [{"key": "X-A", "value": "1", "enabled": true}],
            "params": [],
            "body": "{}",
            "bodyType": "json",
            "response": {
                "status": 0,
                "statusText": "Request Failed",
                "headers": {},
                "data": "Error: Failed to fetch",
                "time": 12,
                "size": 15,
                "error": true
            }
        }"#;

        let entry: HistoryEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.id, 1718000000000);
        assert_eq!(entry.request.method, Method::Post);
        assert!(entry.response.error);
    }
}
