//! In-process tests of the router against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use reel_core::{
  entity::{NewRecord, NewVideo, Record},
  store::RecordStore,
};
use reel_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

struct Fixture {
  store:  Arc<SqliteStore>,
  record: Record,
}

async fn fixture() -> Fixture {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  let folder = store.add_folder("Movies".into()).await.unwrap();
  let user = store.add_user("Ann".into()).await.unwrap();
  let video = store
    .add_video(NewVideo {
      name: "Vid".into(),
      folder_id: Some(folder.id),
      ..Default::default()
    })
    .await
    .unwrap();
  let record = store
    .add_record(NewRecord { name: "Clip A".into(), user_id: user.id, video_id: video.id })
    .await
    .unwrap();
  Fixture { store: Arc::new(store), record }
}

fn app(store: &Arc<SqliteStore>) -> Router { api_router(store.clone()) }

async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
  let res = app.oneshot(req).await.unwrap();
  let status = res.status();
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
  (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
  Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
  Request::builder()
    .method(method)
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_record_renders_resource_in_envelope() {
  let f = fixture().await;
  let r = &f.record;
  let video = r.video.as_ref().unwrap();

  let (status, body) = send(app(&f.store), get(&format!("/records/{}", r.id))).await;
  assert_eq!(status, StatusCode::OK);

  let value: Value = serde_json::from_str(&body).unwrap();
  assert_eq!(
    value,
    json!({
      "data": {
        "id": r.id.to_string(),
        "attributes": {
          "name": "Clip A",
          "created_at": r.created_at,
          "updated_at": r.updated_at,
        },
        "relationships": {
          "user_id": r.user.as_ref().unwrap().id.to_string(),
          "user_name": "Ann",
          "video_id": video.id.to_string(),
          "video_name": "Vid",
          "folder_id": video.folder_id.unwrap(),
          "folder_name": "Movies",
        },
      }
    })
  );

  // Key order on the wire.
  let id_at = body.find("\"id\"").unwrap();
  let attributes_at = body.find("\"attributes\"").unwrap();
  let relationships_at = body.find("\"relationships\"").unwrap();
  assert!(id_at < attributes_at && attributes_at < relationships_at);
}

#[tokio::test]
async fn repeated_reads_are_byte_identical() {
  let f = fixture().await;
  let uri = format!("/records/{}", f.record.id);
  let (_, first) = send(app(&f.store), get(&uri)).await;
  let (_, second) = send(app(&f.store), get(&uri)).await;
  assert_eq!(first, second);
}

#[tokio::test]
async fn list_records_wraps_collection() {
  let f = fixture().await;
  let (status, body) = send(app(&f.store), get("/records")).await;
  assert_eq!(status, StatusCode::OK);

  let value: Value = serde_json::from_str(&body).unwrap();
  let data = value["data"].as_array().unwrap();
  assert_eq!(data.len(), 1);
  assert_eq!(data[0]["id"], json!(f.record.id.to_string()));
}

#[tokio::test]
async fn missing_record_is_404() {
  let f = fixture().await;
  let (status, body) = send(app(&f.store), get("/records/9999")).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let value: Value = serde_json::from_str(&body).unwrap();
  assert!(value["error"].as_str().unwrap().contains("9999"));
}

#[tokio::test]
async fn record_without_folder_is_server_error() {
  let f = fixture().await;
  let user = f.store.add_user("Bob".into()).await.unwrap();
  let loose = f
    .store
    .add_video(NewVideo { name: "Loose".into(), ..Default::default() })
    .await
    .unwrap();
  let record = f
    .store
    .add_record(NewRecord { name: "Clip B".into(), user_id: user.id, video_id: loose.id })
    .await
    .unwrap();

  let (status, body) =
    send(app(&f.store), get(&format!("/records/{}", record.id))).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert!(body.contains("folder"));

  let (status, _) = send(app(&f.store), get("/records")).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn create_record_returns_201() {
  let f = fixture().await;
  let user_id = f.record.user.as_ref().unwrap().id;
  let video_id = f.record.video.as_ref().unwrap().id;

  let (status, body) = send(
    app(&f.store),
    json_request(
      Method::POST,
      "/records",
      json!({ "name": "Clip C", "user_id": user_id, "video_id": video_id }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let value: Value = serde_json::from_str(&body).unwrap();
  assert_eq!(value["data"]["attributes"]["name"], json!("Clip C"));
  assert_eq!(value["data"]["relationships"]["user_id"], json!(user_id.to_string()));
  assert_eq!(f.store.list_records().await.unwrap().len(), 2);
}

#[tokio::test]
async fn create_record_with_blank_name_is_400() {
  let f = fixture().await;
  let (status, _) = send(
    app(&f.store),
    json_request(
      Method::POST,
      "/records",
      json!({ "name": "  ", "user_id": 1, "video_id": 1 }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_record_with_unknown_user_is_422() {
  let f = fixture().await;
  let video_id = f.record.video.as_ref().unwrap().id;

  let (status, body) = send(
    app(&f.store),
    json_request(
      Method::POST,
      "/records",
      json!({ "name": "Clip D", "user_id": 77, "video_id": video_id }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  let value: Value = serde_json::from_str(&body).unwrap();
  assert!(value["error"].as_str().unwrap().contains("77"));

  let (status, _) = send(
    app(&f.store),
    json_request(
      Method::POST,
      "/records",
      json!({ "name": "Clip D", "user_id": f.record.user.as_ref().unwrap().id, "video_id": 88 }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(f.store.list_records().await.unwrap().len(), 1);
}

// ─── Videos ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_metadata_then_get_video() {
  let f = fixture().await;
  let video_id = f.record.video.as_ref().unwrap().id;

  let (status, _) = send(
    app(&f.store),
    json_request(
      Method::PUT,
      &format!("/videos/{video_id}/metadata"),
      json!({ "title": "Pilot", "season": 1, "episode": 1, "duration": 1320 }),
    ),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) =
    send(app(&f.store), get(&format!("/videos/{video_id}"))).await;
  assert_eq!(status, StatusCode::OK);

  let value: Value = serde_json::from_str(&body).unwrap();
  let video = &value["data"];
  assert_eq!(video["title"], json!("Pilot"));
  assert_eq!(video["season"], json!(1));
  assert_eq!(video["view_count"], Value::Null);
  assert_eq!(video["folder"]["name"], json!("Movies"));
}

#[tokio::test]
async fn unknown_video_is_404() {
  let f = fixture().await;
  let (status, _) = send(app(&f.store), get("/videos/4242")).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(
    app(&f.store),
    json_request(Method::PUT, "/videos/4242/metadata", json!({})),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
