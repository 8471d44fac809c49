//! API response fixtures and mock server wiring

use reply_harvest::Config;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path of the community the fixtures live under
pub const COMMUNITY: &str = "/r/rust";

/// A listing item as the API sends it
pub fn post(id: &str, title: &str) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id,
            "title": title,
            "subreddit": "rust",
            "selftext": "",
            "score": 100,
            "num_comments": 3
        }
    })
}

/// A reply with optional nested replies (pass `None` for the API's `""` marker)
pub fn comment(body: &str, score: i64, replies: Option<Vec<Value>>) -> Value {
    let replies = match replies {
        Some(children) => json!({ "kind": "Listing", "data": { "children": children } }),
        None => json!(""),
    };
    json!({ "kind": "t1", "data": { "body": body, "score": score, "replies": replies } })
}

/// A single line of replies nested `depth` levels deep, bodies `level-1..=level-depth`
pub fn reply_chain(depth: usize) -> Vec<Value> {
    (1..=depth).rev().fold(Vec::new(), |replies, level| {
        let nested = (!replies.is_empty()).then_some(replies);
        vec![comment(&format!("level-{level}"), level as i64, nested)]
    })
}

/// A "load more" stub as it appears at the end of long reply lists
pub fn more(count: u64) -> Value {
    json!({ "kind": "more", "data": { "count": count, "children": ["abc", "def"] } })
}

/// Listing response wrapping the given posts
pub fn listing(posts: Vec<Value>) -> Value {
    json!({ "kind": "Listing", "data": { "after": null, "children": posts } })
}

/// Detail response for one post
pub fn thread(id: &str, comments: Vec<Value>) -> Value {
    json!([listing(vec![post(id, "echo")]), listing(comments)])
}

/// Config pointing at the mock server's community
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.source.base_url = format!("{}{}", server.uri(), COMMUNITY);
    config
}

/// Serve `body` as the hot listing
pub async fn mount_listing(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("{}/hot.json", COMMUNITY)))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Serve `response` as the detail of post `id`
pub async fn mount_thread(server: &MockServer, id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("{}/comments/{}.json", COMMUNITY, id)))
        .and(query_param("sort", "confidence"))
        .and(query_param("limit", "100"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}
