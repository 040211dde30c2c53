//! Router tests with fake collaborators.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use npm_risk_engine::{CommitRecord, Engine};
use scan_service::{AppState, CommitSource, PackageResolver, RepoRef, ScanError, ScanLimits};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

struct FakeResolver;

#[async_trait]
impl PackageResolver for FakeResolver {
  async fn resolve(&self, package: &str) -> Result<RepoRef, ScanError> {
    match package {
      "event-stream" => Ok(RepoRef::new("dominictarr", "event-stream")),
      "empty-repo" => Ok(RepoRef::new("someone", "empty")),
      "rate-limited" => Ok(RepoRef::new("someone", "limited")),
      other => Err(ScanError::resolution(format!("npm package '{}' not found", other))),
    }
  }
}

#[derive(Default)]
struct FakeCommits {
  requested: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl CommitSource for FakeCommits {
  async fn recent_commits(&self, repo: &RepoRef, count: usize) -> Result<Vec<CommitRecord>, ScanError> {
    self.requested.lock().unwrap().push((repo.to_string(), count));
    match repo.repo.as_str() {
      "empty" => Ok(Vec::new()),
      "limited" => Err(ScanError::retrieval("GitHub commits API returned 403 Forbidden for someone/limited")),
      _ => Ok(vec![
        CommitRecord {
          sha: "e316336".into(),
          author_name: Some("right9ctrl".into()),
          author_email: Some("right9ctrl@example.com".into()),
          message: Some("add flatmap-stream".into()),
          date: Some("2018-09-09T10:00:00Z".into()),
          added_lines: Some(1),
          diff: "+++ b/package.json\n \"dependencies\": {\n+  \"flatmap-stream\": \"^0.1.0\"\n".into(),
        },
        CommitRecord {
          sha: "0ff1ce0".into(),
          author_name: Some("Dominic".into()),
          author_email: Some("dom@example.com".into()),
          message: Some("docs".into()),
          date: Some("2018-01-01T00:00:00Z".into()),
          added_lines: Some(3),
          diff: String::new(),
        },
        CommitRecord {
          sha: "0ff1ce1".into(),
          author_name: Some("Dominic".into()),
          author_email: Some("dom@example.com".into()),
          message: Some("docs".into()),
          date: Some("2018-01-02T00:00:00Z".into()),
          added_lines: Some(3),
          diff: String::new(),
        },
      ]),
    }
  }
}

fn state(commits: Arc<FakeCommits>) -> Arc<AppState> {
  Arc::new(AppState {
    resolver: Arc::new(FakeResolver),
    commits,
    engine: Engine::with_defaults(),
    limits: ScanLimits::default(),
  })
}

fn post_scan(body: &str) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri("/scan")
    .header("content-type", "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

async fn json_body(res: axum::response::Response) -> serde_json::Value {
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn scan_returns_scored_commits_in_order() {
  let fake = Arc::new(FakeCommits::default());
  let app = scan_service::app(state(fake.clone()));

  let res = app.oneshot(post_scan(r#"{"package":"event-stream","numCommits":3}"#)).await.unwrap();
  assert_eq!(res.status(), StatusCode::OK);

  let v = json_body(res).await;
  assert_eq!(v["package"], "event-stream");
  assert_eq!(v["repo"]["owner"], "dominictarr");
  assert_eq!(v["repo"]["repo"], "event-stream");

  let commits = v["commits"].as_array().unwrap();
  assert_eq!(commits.len(), 3);
  assert_eq!(commits[0]["sha"], "e316336");
  assert_eq!(commits[0]["riskScore"], 30);
  assert_eq!(commits[0]["riskLevel"], "medium");
  assert_eq!(commits[0]["flags"], serde_json::json!(["new_author", "new_dependency"]));
  assert_eq!(commits[1]["flags"], serde_json::json!([]));

  assert_eq!(
    fake.requested.lock().unwrap().as_slice(),
    &[("dominictarr/event-stream".to_string(), 3)]
  );
}

#[tokio::test]
async fn default_window_is_thirty() {
  let fake = Arc::new(FakeCommits::default());
  let app = scan_service::app(state(fake.clone()));
  let res = app.oneshot(post_scan(r#"{"package":"event-stream"}"#)).await.unwrap();
  assert_eq!(res.status(), StatusCode::OK);
  assert_eq!(fake.requested.lock().unwrap()[0].1, 30);
}

#[tokio::test]
async fn missing_package_is_400() {
  let app = scan_service::app(state(Arc::new(FakeCommits::default())));
  let res = app.oneshot(post_scan(r#"{"numCommits":5}"#)).await.unwrap();
  assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  let v = json_body(res).await;
  assert!(v["error"].as_str().unwrap().contains("package"));
}

#[tokio::test]
async fn out_of_range_window_is_400() {
  let app = scan_service::app(state(Arc::new(FakeCommits::default())));
  let res = app.oneshot(post_scan(r#"{"package":"event-stream","numCommits":0}"#)).await.unwrap();
  assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_bodies_are_json_400() {
  let bad_json = post_scan(r#"{"package":"#);
  let wrong_type = post_scan(r#"{"package":"event-stream","numCommits":"30"}"#);
  let no_content_type = Request::builder()
    .method("POST")
    .uri("/scan")
    .body(Body::from(r#"{"package":"event-stream"}"#))
    .unwrap();

  for req in [bad_json, wrong_type, no_content_type] {
    let fake = Arc::new(FakeCommits::default());
    let app = scan_service::app(state(fake.clone()));
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let v = json_body(res).await;
    assert!(v["error"].as_str().unwrap().starts_with("Invalid request body"));
    assert!(fake.requested.lock().unwrap().is_empty());
  }
}

#[tokio::test]
async fn unknown_package_is_404_without_retrieval() {
  let fake = Arc::new(FakeCommits::default());
  let app = scan_service::app(state(fake.clone()));
  let res = app.oneshot(post_scan(r#"{"package":"does-not-exist"}"#)).await.unwrap();
  assert_eq!(res.status(), StatusCode::NOT_FOUND);
  let v = json_body(res).await;
  assert!(v["error"].as_str().unwrap().contains("does-not-exist"));
  assert!(fake.requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upstream_failure_is_502() {
  let app = scan_service::app(state(Arc::new(FakeCommits::default())));
  let res = app.oneshot(post_scan(r#"{"package":"rate-limited"}"#)).await.unwrap();
  assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
  let v = json_body(res).await;
  assert!(v["error"].as_str().unwrap().contains("403"));
}

#[tokio::test]
async fn empty_history_is_ok_with_no_commits() {
  let app = scan_service::app(state(Arc::new(FakeCommits::default())));
  let res = app.oneshot(post_scan(r#"{"package":"empty-repo"}"#)).await.unwrap();
  assert_eq!(res.status(), StatusCode::OK);
  let v = json_body(res).await;
  assert_eq!(v["commits"], serde_json::json!([]));
}

#[tokio::test]
async fn health_and_index() {
  let app = scan_service::app(state(Arc::new(FakeCommits::default())));
  let res = app
    .clone()
    .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
    .await
    .unwrap();
  assert_eq!(res.status(), StatusCode::OK);
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
  assert_eq!(&bytes[..], b"ok");

  let res = app
    .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
    .await
    .unwrap();
  assert_eq!(res.status(), StatusCode::OK);
}
