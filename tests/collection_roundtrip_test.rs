use std::sync::Arc;

use reqlab::builder::RequestBuilder;
use reqlab::collection::{CollectionStorage, SaveTarget};
use reqlab::http::{BodyType, Client, KeyValue, Method, RequestModel};
use reqlab::i18n::Notice;
use reqlab::replay::RetryBridge;
use reqlab::settings::AppContext;
use reqlab::store::FileStore;
use reqlab::ReqlabError;
use tempfile::TempDir;

fn context(temp_dir: &TempDir) -> AppContext {
    AppContext::load(Arc::new(FileStore::new(temp_dir.path()))).unwrap()
}

#[test]
fn test_save_to_new_collection_and_run_it() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir);

    let mut request = RequestModel::new(Method::Put, "https://api.example.test/users/7")
        .with_header("Authorization", "Bearer t")
        .with_body("name=ann", BodyType::Form);
    request.params.push(KeyValue::disabled("", ""));

    let mut builder = RequestBuilder::open(&ctx, Client::new().unwrap());
    builder.set_request(request.clone());
    let saved = builder
        .save("Update user", SaveTarget::New { name: "  Users  ".into() })
        .unwrap();
    drop(builder);

    let storage = CollectionStorage::new(ctx.store().clone());
    let collections = storage.list().unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].name, "Users");
    assert_eq!(collections[0].requests.len(), 1);

    let found = storage
        .find_request(collections[0].id, saved.id)
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "Update user");
    assert_eq!(found.request.method, Method::Put);
    assert_eq!(found.request.body_type, BodyType::Form);
    assert!(found.request.params.is_empty());

    // 执行集合中的请求：暂存后由下一个构建器载入
    RetryBridge::new(ctx.store().clone()).stage(&found).unwrap();
    let builder = RequestBuilder::open(&ctx, Client::new().unwrap());
    assert!(builder.replayed());
    assert_eq!(builder.request().url, request.url);
    assert_eq!(builder.request().headers, request.headers);
}

#[test]
fn test_save_to_existing_collection_appends() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir);
    let storage = CollectionStorage::new(ctx.store().clone());
    let collection = storage.create("Shop", "orders api").unwrap();

    let first = RequestModel::new(Method::Get, "https://shop.test/orders");
    let second = RequestModel::new(Method::Post, "https://shop.test/orders");
    storage
        .save_request(&first, "List", SaveTarget::Existing(collection.id))
        .unwrap();
    storage
        .save_request(&second, "Create", SaveTarget::Existing(collection.id))
        .unwrap();

    let collection = storage.get(collection.id).unwrap().unwrap();
    let names: Vec<_> = collection.requests.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["List", "Create"]);
    assert_eq!(collection.description, "orders api");
}

#[test]
fn test_save_validation() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir);
    let storage = CollectionStorage::new(ctx.store().clone());
    let request = RequestModel::new(Method::Get, "https://x.test");

    let err = storage
        .save_request(&request, "  ", SaveTarget::New { name: "c".into() })
        .unwrap_err();
    assert_eq!(err.notice(), Some(Notice::ApiNameRequired));

    let err = storage
        .save_request(&request, "name", SaveTarget::New { name: "".into() })
        .unwrap_err();
    assert_eq!(err.notice(), Some(Notice::CollectionNameRequired));

    let err = storage
        .save_request(&request, "name", SaveTarget::Existing(42))
        .unwrap_err();
    assert!(matches!(err, ReqlabError::NotFound(_)));

    assert!(storage.list().unwrap().is_empty());
}

#[test]
fn test_delete_request_and_collection() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir);
    let storage = CollectionStorage::new(ctx.store().clone());
    let request = RequestModel::new(Method::Get, "https://x.test/a");

    let saved = storage
        .save_request(&request, "a", SaveTarget::New { name: "Temp".into() })
        .unwrap();
    let collection_id = storage.list().unwrap()[0].id;

    assert!(storage.delete_request(collection_id, saved.id).unwrap());
    assert!(!storage.delete_request(collection_id, saved.id).unwrap());
    assert!(storage.get(collection_id).unwrap().unwrap().requests.is_empty());

    assert!(storage.delete(collection_id).unwrap());
    assert!(!storage.delete(collection_id).unwrap());
    assert!(storage.list().unwrap().is_empty());
}
