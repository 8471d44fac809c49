//! End-to-end harvests against a mock HTTP API
//!
//! These tests drive the real [`HttpFetcher`](reply_harvest::HttpFetcher) through
//! wiremock, covering URL shape, status handling, decoding and flattening together.

mod common;

use std::time::Duration;

use common::{
    comment, config_for, listing, more, mount_listing, mount_thread, post, reply_chain, thread,
};
use reply_harvest::config::MAX_DEPTH_CEILING;
use reply_harvest::{Error, Harvester, LeafRecord, StructuralError, TransportError};
use serde_json::json;
use wiremock::{MockServer, ResponseTemplate};

fn leaf(body: &str, score: i64) -> LeafRecord {
    LeafRecord::new(Some(body), Some(score))
}

#[tokio::test]
async fn harvests_nested_threads_over_http() {
    let server = MockServer::start().await;
    mount_listing(&server, listing(vec![post("a1", "First"), post("b2", "Second")])).await;
    mount_thread(
        &server,
        "a1",
        ResponseTemplate::new(200).set_body_json(thread(
            "a1",
            vec![comment(
                "top",
                10,
                Some(vec![comment("nested", 4, Some(vec![comment("deeper", 1, None)]))]),
            )],
        )),
    )
    .await;
    mount_thread(
        &server,
        "b2",
        ResponseTemplate::new(200)
            .set_body_json(thread("b2", vec![comment("top", 10, None), comment("other", 2, None)]))
            .set_delay(Duration::from_millis(50)),
    )
    .await;

    let harvester = Harvester::from_config(config_for(&server)).unwrap();
    let harvest = harvester.harvest().await.unwrap();

    assert_eq!(
        harvest.replies.to_sorted_vec(),
        vec![leaf("deeper", 1), leaf("nested", 4), leaf("other", 2), leaf("top", 10)]
    );
    assert_eq!(harvest.items, 2);
    assert!(harvest.failures.is_empty());
}

#[tokio::test]
async fn output_serializes_without_tree_structure() {
    let server = MockServer::start().await;
    mount_listing(&server, listing(vec![post("a1", "Only")])).await;
    mount_thread(
        &server,
        "a1",
        ResponseTemplate::new(200).set_body_json(thread(
            "a1",
            vec![comment("parent", 3, Some(vec![comment("child", 1, None)]))],
        )),
    )
    .await;

    let harvest = Harvester::from_config(config_for(&server))
        .unwrap()
        .harvest()
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&harvest.replies).unwrap(),
        json!([
            { "body": "child", "score": 1 },
            { "body": "parent", "score": 3 },
        ])
    );
}

#[tokio::test]
async fn load_more_stubs_collapse_into_one_empty_record() {
    let server = MockServer::start().await;
    mount_listing(&server, listing(vec![post("a1", "First"), post("b2", "Second")])).await;
    mount_thread(
        &server,
        "a1",
        ResponseTemplate::new(200)
            .set_body_json(thread("a1", vec![comment("x", 1, None), more(12)])),
    )
    .await;
    mount_thread(
        &server,
        "b2",
        ResponseTemplate::new(200).set_body_json(thread("b2", vec![more(3)])),
    )
    .await;

    let harvest = Harvester::from_config(config_for(&server))
        .unwrap()
        .harvest()
        .await
        .unwrap();

    assert_eq!(harvest.replies.len(), 2);
    assert_eq!(harvest.replies.iter().filter(|r| r.is_empty()).count(), 1);
}

#[tokio::test]
async fn server_error_on_one_thread_is_absorbed() {
    let server = MockServer::start().await;
    mount_listing(&server, listing(vec![post("ok", "Fine"), post("bad", "Broken")])).await;
    mount_thread(
        &server,
        "ok",
        ResponseTemplate::new(200).set_body_json(thread("ok", vec![comment("kept", 1, None)])),
    )
    .await;
    mount_thread(&server, "bad", ResponseTemplate::new(500)).await;

    let harvest = Harvester::from_config(config_for(&server))
        .unwrap()
        .harvest()
        .await
        .unwrap();

    assert_eq!(harvest.replies.to_sorted_vec(), vec![leaf("kept", 1)]);
    assert_eq!(harvest.failures.len(), 1);
    assert_eq!(harvest.failures[0].item.as_str(), "bad");
    assert!(matches!(
        harvest.failures[0].error,
        Error::Transport(TransportError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn too_deep_thread_fails_the_depth_guard_over_http() {
    let server = MockServer::start().await;
    mount_listing(&server, listing(vec![post("deep", "Deep"), post("edge", "Edge")])).await;
    mount_thread(
        &server,
        "deep",
        ResponseTemplate::new(200)
            .set_body_json(thread("deep", reply_chain(MAX_DEPTH_CEILING + 1))),
    )
    .await;
    mount_thread(
        &server,
        "edge",
        ResponseTemplate::new(200).set_body_json(thread("edge", reply_chain(MAX_DEPTH_CEILING))),
    )
    .await;

    let mut config = config_for(&server);
    config.max_depth = MAX_DEPTH_CEILING;
    let harvest = Harvester::from_config(config).unwrap().harvest().await.unwrap();

    // The chain at exactly the limit is kept whole
    assert_eq!(harvest.replies.len(), MAX_DEPTH_CEILING);
    assert!(harvest.replies.contains(&leaf(
        &format!("level-{MAX_DEPTH_CEILING}"),
        MAX_DEPTH_CEILING as i64
    )));

    assert_eq!(harvest.failures.len(), 1);
    assert_eq!(harvest.failures[0].item.as_str(), "deep");
    assert!(
        matches!(
            harvest.failures[0].error,
            Error::Structural(StructuralError::DepthExceeded { max_depth })
                if max_depth == MAX_DEPTH_CEILING
        ),
        "got {:?}",
        harvest.failures[0].error
    );
}

#[tokio::test]
async fn listing_error_status_is_fatal() {
    let server = MockServer::start().await;
    // Nothing mounted: wiremock answers 404

    let err = Harvester::from_config(config_for(&server))
        .unwrap()
        .harvest()
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Transport(TransportError::Status { status: 404, .. })),
        "got {err:?}"
    );
}

#[tokio::test]
async fn empty_listing_makes_no_detail_requests() {
    let server = MockServer::start().await;
    mount_listing(&server, listing(vec![])).await;

    let harvest = Harvester::from_config(config_for(&server))
        .unwrap()
        .harvest()
        .await
        .unwrap();

    assert!(harvest.replies.is_empty());
    assert_eq!(harvest.items, 0);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}
