use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::{KeyValueStore, StoreKey};
use crate::Result;
use crate::error::ReqlabError;

/// Current on-disk schema version
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    data: &'a T,
}

pub fn encode<T: Serialize>(value: &T) -> Result<String> {
    let envelope = EnvelopeRef {
        version: SCHEMA_VERSION,
        data: value,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// 解码存储值
///
/// 同时带有 `version` 和 `data` 的对象是版本化信封，只解码 `data`，失败即报错；
/// 其余内容按早期没有版本号的裸 JSON 处理。
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let mut envelope = match value {
        serde_json::Value::Object(map) if map.contains_key("version") && map.contains_key("data") => {
            map
        }
        legacy => return Ok(serde_json::from_value(legacy)?),
    };

    let version = envelope.remove("version").and_then(|v| v.as_u64());
    let data = envelope.remove("data").unwrap_or_default();
    match version {
        Some(v) if v > u64::from(SCHEMA_VERSION) => warn!(
            "Stored schema version {} is newer than supported {}",
            v, SCHEMA_VERSION
        ),
        Some(_) => {}
        None => return Err(ReqlabError::Other("invalid store schema version".to_string())),
    }
    Ok(serde_json::from_value(data)?)
}

/// Decode a raw value, treating absence and corruption alike as the default.
pub fn decode_or_default<T: DeserializeOwned + Default>(key: StoreKey, raw: Option<&str>) -> T {
    let Some(raw) = raw else {
        return T::default();
    };
    match decode(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Discarding corrupt {}: {}", key.file_name(), e);
            T::default()
        }
    }
}

pub fn load<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: StoreKey) -> Result<T> {
    let raw = store.get(key)?;
    Ok(decode_or_default(key, raw.as_deref()))
}

pub fn save<T: Serialize>(store: &dyn KeyValueStore, key: StoreKey, value: &T) -> Result<()> {
    store.set(key, &encode(value)?)
}

/// Atomically load, mutate and write back the value under `key`.
///
/// If `f` fails the stored value is left untouched.
pub fn modify<T, R, F>(store: &dyn KeyValueStore, key: StoreKey, f: F) -> Result<R>
where
    T: Serialize + DeserializeOwned + Default,
    F: FnOnce(&mut T) -> Result<R>,
{
    let mut f = Some(f);
    let mut output = None;

    store.update(key, &mut |raw| {
        let mut value: T = decode_or_default(key, raw.as_deref());
        let f = f
            .take()
            .ok_or_else(|| ReqlabError::Other("store update re-entered".to_string()))?;
        output = Some(f(&mut value)?);
        Ok(Some(encode(&value)?))
    })?;

    output.ok_or_else(|| ReqlabError::Other("store update did not run".to_string()))
}
