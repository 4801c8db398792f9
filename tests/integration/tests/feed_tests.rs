//! End-to-end tests of the client feed against a live server
//!
//! Run with: cargo test -p integration-tests --test feed_tests

use std::time::Duration;

use integration_tests::{assert_json, CreatePollRequest, TestServer, VoteRequest};
use poll_client::{BackoffConfig, ClientConfig, PollFeed, SupervisorState};
use poll_core::Poll;
use reqwest::StatusCode;

fn feed_for(server: &TestServer) -> PollFeed {
    let config = ClientConfig::from_api_url(&server.base_url())
        .unwrap()
        .with_backoff(BackoffConfig::fixed(Duration::from_millis(50)));
    PollFeed::connect(&config).expect("Failed to start feed")
}

async fn wait_until(feed: &PollFeed, check: impl Fn(&PollFeed) -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check(feed) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for feed");
}

async fn create_poll(server: &TestServer) -> Poll {
    let response = server.post("/polls", &CreatePollRequest::unique()).await.unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

#[tokio::test]
async fn test_feed_follows_server() {
    let server = TestServer::start().await.expect("Failed to start server");
    let existing = create_poll(&server).await;

    let feed = feed_for(&server);
    wait_until(&feed, |f| f.status().state == SupervisorState::Connected).await;
    assert_eq!(feed.current_view(), vec![existing.clone()]);
    assert!(!feed.status().is_stale);

    let created = create_poll(&server).await;
    wait_until(&feed, |f| f.current_view().len() == 2).await;
    assert_eq!(feed.current_view()[0].id, created.id);

    let response = server
        .post(
            &format!("/polls/{}/vote", existing.id),
            &VoteRequest {
                option_id: existing.options[0].id.into_inner(),
            },
        )
        .await
        .unwrap();
    let voted: Poll = assert_json(response, StatusCode::OK).await.unwrap();

    wait_until(&feed, |f| f.current_view().contains(&voted)).await;
    assert_eq!(feed.status().anomalies, 0);

    feed.stop().await;
    assert_eq!(feed.status().state, SupervisorState::Disconnected);
}

#[tokio::test]
async fn test_feed_keeps_view_when_server_goes_away() {
    let server = TestServer::start().await.expect("Failed to start server");
    create_poll(&server).await;

    let feed = feed_for(&server);
    wait_until(&feed, |f| f.status().state == SupervisorState::Connected).await;
    assert_eq!(feed.current_view().len(), 1);

    server.shutdown().await.unwrap();
    wait_until(&feed, |f| f.status().state != SupervisorState::Connected).await;

    let status = feed.status();
    assert!(status.is_stale);
    assert!(status.last_error.is_some());
    assert_eq!(feed.current_view().len(), 1);

    feed.stop().await;
}

#[tokio::test]
async fn test_refresh_pulls_full_collection() {
    let server = TestServer::start().await.expect("Failed to start server");
    let feed = feed_for(&server);
    wait_until(&feed, |f| f.status().state == SupervisorState::Connected).await;

    create_poll(&server).await;
    create_poll(&server).await;
    feed.refresh().await.unwrap();

    let response = server.get("/polls").await.unwrap();
    let polls: Vec<Poll> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(feed.current_view(), polls);

    feed.stop().await;
}
