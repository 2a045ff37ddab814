//! HttpProbe and Runner against a live mock server

use httpmock::prelude::*;
use std::time::Duration;
use tempfile::TempDir;

use docprobe_harness::{
    health_check, HarnessConfig, HarnessError, HttpProbe, Outcome, Probe, RunState, Runner, TargetRegistry,
};

fn probe() -> HttpProbe {
    HttpProbe::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn fetch_records_status_size_and_body() {
    let server = MockServer::start_async().await;
    let page = server
        .mock_async(|when, then| {
            when.method(GET).path("/story/button");
            then.status(200).body("<div id=\"storybook-root\"></div>");
        })
        .await;

    let outcome = probe().fetch(&server.url("/story/button")).await;

    page.assert_async().await;
    assert_eq!(outcome.http_status, Some(200));
    assert_eq!(outcome.byte_size, 31);
    assert!(outcome.body.contains("storybook-root"));
    assert!(outcome.network_error.is_none());
}

#[tokio::test]
async fn fetch_keeps_non_success_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("not here");
        })
        .await;

    let outcome = probe().fetch(&server.url("/missing")).await;

    assert_eq!(outcome.http_status, Some(404));
    assert!(outcome.network_error.is_none());
}

#[tokio::test]
async fn connection_refused_is_a_network_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let outcome = probe().fetch(&format!("http://{}/", addr)).await;

    assert_eq!(outcome.http_status, None);
    assert!(outcome.network_error.is_some());
    assert_eq!(outcome.byte_size, 0);
}

#[tokio::test]
async fn health_check_against_live_server() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body("<html></html>");
        })
        .await;
    assert!(health_check(&probe(), &server.base_url()).await.is_ok());

    let broken = MockServer::start_async().await;
    broken
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(502);
        })
        .await;
    match health_check(&probe(), &broken.base_url()).await {
        Err(HarnessError::Unhealthy { reason, .. }) => assert!(reason.contains("502")),
        other => panic!("expected Unhealthy, got {:?}", other),
    }
}

#[tokio::test]
async fn full_run_over_http() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body("<html></html>");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/docs/intro");
            then.status(200).body("<div id=\"storybook-root\">intro</div>");
        })
        .await;
    let broken = server
        .mock_async(|when, then| {
            when.method(GET).path("/story/button");
            then.status(200)
                .body("ReferenceError: Icon is not defined <div class=\"code-variants\"></div>");
        })
        .await;

    let dir = TempDir::new().unwrap();
    let config = HarnessConfig {
        base_url: server.base_url(),
        throttle_ms: 0,
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let registry = TargetRegistry::builder()
        .doc("/docs/intro", "Intro")
        .story("/story/button", "Button")
        .build();

    let mut runner = Runner::from_config(config, registry).unwrap();
    let outcome = runner.run().await;

    broken.assert_async().await;
    assert_eq!(outcome.state, RunState::Done);
    assert_eq!(outcome.exit_code(), 1);

    let summary = outcome.summary.unwrap();
    assert_eq!(summary.results[0].outcome, Outcome::Passed);
    assert_eq!(summary.results[1].outcome, Outcome::Failed);
    assert_eq!(summary.results[1].defects[0].kind, "reference_error");
    assert!(summary.results[1].has_optional_feature_markup);

    let artifacts = outcome.artifacts.unwrap();
    let html = std::fs::read_to_string(artifacts.html).unwrap();
    assert!(html.contains("ReferenceError"));
}
