use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::RequestModel;
use crate::utils::next_id;

/// 用户命名的 API 集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requests: Vec<SavedRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Collection {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            name: name.into(),
            description: description.into(),
            requests: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn find_request(&self, request_id: i64) -> Option<&SavedRequest> {
        self.requests.iter().find(|r| r.id == request_id)
    }
}

/// 保存在集合中的请求定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRequest {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub request: RequestModel,
    pub created_at: DateTime<Utc>,
}

impl SavedRequest {
    pub fn new(name: impl Into<String>, request: &RequestModel) -> Self {
        Self {
            id: next_id(),
            name: name.into(),
            request: request.compacted(),
            created_at: Utc::now(),
        }
    }
}

/// 保存目标：已有集合或新建集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Existing(i64),
    New { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;

    #[test]
    fn test_saved_request_shape() {
        let request = RequestModel::new(Method::Put, "https://example.test/users/1");
        let saved = SavedRequest::new("users", &request);
        let value = serde_json::to_value(&saved).unwrap();

        assert_eq!(value["name"], "users");
        assert_eq!(value["method"], "PUT");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_collection_without_requests_field() {
        let raw = r#"{"id": 1, "name": "legacy"}"#;
        let collection: Collection = serde_json::from_str(raw).unwrap();
        assert!(collection.requests.is_empty());
        assert!(collection.description.is_empty());
        assert!(collection.created_at.is_none());
    }
}
