//! End-to-end forwarding through a real listener.

use axum::http::StatusCode;
use webhook_filter::routing::RuleSpec;

mod common;

const PUSH_MAIN: &str = r#"{"ref":"refs/heads/main","repository":{"name":"api","owner":{"username":"acme"}},"commits":[{"id":"c0ffee"}]}"#;

#[tokio::test]
async fn test_forwards_body_method_and_headers() {
    let (target, mut captured) = common::start_capture_target(StatusCode::OK).await;
    let filter = common::start_filter(vec![RuleSpec::new(
        "refs/heads/main",
        format!("http://{}/hooks/main", target),
    )])
    .await;

    let res = common::client()
        .post(filter.url("/webhook"))
        .header("X-Gogs-Event", "push")
        .header("X-Gogs-Delivery", "d-1")
        .header("Content-Type", "text/plain")
        .header("Authorization", "Bearer secret")
        .body(PUSH_MAIN)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "OK");

    let req = common::next_capture(&mut captured).await.expect("target was not called");
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/hooks/main");
    assert_eq!(&req.body[..], PUSH_MAIN.as_bytes());
    assert_eq!(req.headers["x-gogs-event"], "push");
    assert_eq!(req.headers["x-gogs-delivery"], "d-1");
    assert_eq!(req.headers["content-type"], "application/json");
    assert!(req.headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_method_is_preserved() {
    let (target, mut captured) = common::start_capture_target(StatusCode::OK).await;
    let filter = common::start_filter(vec![RuleSpec::new("", format!("http://{}/", target))]).await;

    let res = common::client()
        .put(filter.url("/"))
        .body(PUSH_MAIN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let req = common::next_capture(&mut captured).await.expect("target was not called");
    assert_eq!(req.method, "PUT");
}

#[tokio::test]
async fn test_first_matching_rule_wins() {
    let (first, mut first_rx) = common::start_capture_target(StatusCode::OK).await;
    let (second, mut second_rx) = common::start_capture_target(StatusCode::OK).await;
    let filter = common::start_filter(vec![
        RuleSpec::new("", format!("http://{}/any", first)),
        RuleSpec::new("refs/heads/main", format!("http://{}/main", second)),
    ])
    .await;

    let res = common::client().post(filter.url("/")).body(PUSH_MAIN).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let req = common::next_capture(&mut first_rx).await.expect("wildcard rule not used");
    assert_eq!(req.path, "/any");
    assert!(common::next_capture(&mut second_rx).await.is_none());
}

#[tokio::test]
async fn test_template_target() {
    let (target, mut captured) = common::start_capture_target(StatusCode::OK).await;
    let filter = common::start_filter(vec![RuleSpec::new(
        "refs/heads/main",
        format!(
            "http://{}/{{{{ .repository.owner.username }}}}/{{{{ .repository.name }}}}?sha={{{{ (index .commits 0).id | urlquery }}}}",
            target
        ),
    )])
    .await;

    let res = common::client().post(filter.url("/")).body(PUSH_MAIN).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let req = common::next_capture(&mut captured).await.expect("target was not called");
    assert_eq!(req.path, "/acme/api");
    assert_eq!(req.query.as_deref(), Some("sha=c0ffee"));
}

#[tokio::test]
async fn test_no_match_is_not_forwarded() {
    let (target, mut captured) = common::start_capture_target(StatusCode::OK).await;
    let filter = common::start_filter(vec![RuleSpec::new(
        "refs/heads/release",
        format!("http://{}/", target),
    )])
    .await;

    let res = common::client().post(filter.url("/")).body(PUSH_MAIN).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "OK");
    assert!(common::next_capture(&mut captured).await.is_none());
}

#[tokio::test]
async fn test_empty_rule_set_replies_ok() {
    let filter = common::start_filter(vec![]).await;
    let res = common::client().post(filter.url("/")).body(PUSH_MAIN).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_probe_is_not_filtered() {
    let (target, mut captured) = common::start_capture_target(StatusCode::OK).await;
    let filter = common::start_filter(vec![RuleSpec::new("", format!("http://{}/", target))]).await;

    let res = common::client()
        .get(filter.url("/healthz"))
        .header("User-Agent", "kube-probe/1.29")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "OK");
    assert!(common::next_capture(&mut captured).await.is_none());
}

#[tokio::test]
async fn test_target_status_does_not_change_reply() {
    let (target, mut captured) = common::start_capture_target(StatusCode::SERVICE_UNAVAILABLE).await;
    let filter = common::start_filter(vec![RuleSpec::new("", format!("http://{}/", target))]).await;

    let res = common::client().post(filter.url("/")).body(PUSH_MAIN).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(common::next_capture(&mut captured).await.is_some());
}
