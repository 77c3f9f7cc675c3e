//! Feed-style adapter behavior against canned Reddit JSON payloads.

use chrono::{Duration, Utc};
use serde_json::json;

use keywatch_scout::matcher::KeyMatcher;
use keywatch_scout::recency::RecencyWindow;
use keywatch_scout::sources::{RedditSource, Source};
use keywatch_scout::testing::MockFetcher;

const KEY: &str = "AAAAA-BBBBB-CCCCC-DDDDD-EEEEE";
const OTHER_KEY: &str = "11111-22222-33333-44444-55555";

const LISTING_URL: &str = "https://www.reddit.com/r/Piracy/new.json?limit=100";
const POST_PERMALINK: &str = "/r/Piracy/comments/1abc/free_keys";
const COMMENTS_URL: &str =
    "https://www.reddit.com/r/Piracy/comments/1abc/free_keys.json?limit=50";

fn listing_with_post(title: &str, selftext: &str, created_utc: i64, num_comments: u32) -> serde_json::Value {
    json!({
        "data": {
            "children": [{
                "data": {
                    "title": title,
                    "selftext": selftext,
                    "permalink": POST_PERMALINK,
                    "created_utc": created_utc,
                    "num_comments": num_comments
                }
            }]
        }
    })
}

fn comments_payload(comments: Vec<(String, i64, &str)>) -> serde_json::Value {
    let children: Vec<serde_json::Value> = comments
        .into_iter()
        .map(|(body, created_utc, permalink)| {
            json!({
                "data": {
                    "body": body,
                    "permalink": permalink,
                    "created_utc": created_utc
                }
            })
        })
        .collect();

    // Reddit returns [post listing, comment listing].
    json!([
        { "data": { "children": [] } },
        { "data": { "children": children } }
    ])
}

#[tokio::test]
async fn stale_posts_are_skipped_entirely() {
    let now = Utc::now();
    let stale = (now - Duration::hours(48)).timestamp();
    let fetcher = MockFetcher::new().on_json(
        LISTING_URL,
        listing_with_post(&format!("old {KEY}"), "", stale, 3),
    );
    // No canned comments response: reaching for it would be an error entry.

    let source = RedditSource::new("Piracy", false);
    let out = source
        .scrape(&fetcher, &KeyMatcher::default(), &RecencyWindow::new(now, 6), now)
        .await;

    assert!(out.hits.is_empty());
    assert!(out.errors.is_empty());
}

#[tokio::test]
async fn stale_post_comments_are_scanned_when_configured() {
    let now = Utc::now();
    let stale = (now - Duration::hours(48)).timestamp();
    let comment_permalink = "/r/Piracy/comments/1abc/free_keys/c1";
    let fetcher = MockFetcher::new()
        .on_json(
            LISTING_URL,
            listing_with_post("old thread", "", stale, 1),
        )
        .on_json(
            COMMENTS_URL,
            comments_payload(vec![(
                format!("fresh comment {KEY}"),
                now.timestamp(),
                comment_permalink,
            )]),
        );

    let source = RedditSource::new("Piracy", true);
    let out = source
        .scrape(&fetcher, &KeyMatcher::default(), &RecencyWindow::new(now, 6), now)
        .await;

    assert_eq!(out.hits.len(), 1);
    assert_eq!(out.hits[0].key, KEY);
    assert_eq!(
        out.hits[0].source_url,
        format!("https://reddit.com{comment_permalink}")
    );
}

#[tokio::test]
async fn comments_are_filtered_by_their_own_timestamps() {
    let now = Utc::now();
    let stale_comment = (now - Duration::hours(48)).timestamp();
    let fetcher = MockFetcher::new()
        .on_json(
            LISTING_URL,
            listing_with_post(&format!("title {KEY}"), "", now.timestamp(), 2),
        )
        .on_json(
            COMMENTS_URL,
            comments_payload(vec![
                (
                    format!("recent {OTHER_KEY}"),
                    now.timestamp(),
                    "/r/Piracy/comments/1abc/free_keys/c1",
                ),
                (
                    "too old ZZZZZ-ZZZZZ-ZZZZZ-ZZZZZ-ZZZZZ".to_string(),
                    stale_comment,
                    "/r/Piracy/comments/1abc/free_keys/c2",
                ),
            ]),
        );

    let source = RedditSource::new("Piracy", false);
    let out = source
        .scrape(&fetcher, &KeyMatcher::default(), &RecencyWindow::new(now, 6), now)
        .await;

    let keys: Vec<&str> = out.hits.iter().map(|h| h.key.as_str()).collect();
    assert_eq!(keys, vec![KEY, OTHER_KEY]);
}

#[tokio::test]
async fn duplicate_key_in_post_and_comment_is_emitted_once() {
    let now = Utc::now();
    let fetcher = MockFetcher::new()
        .on_json(
            LISTING_URL,
            listing_with_post(&format!("Key: {KEY}"), "", now.timestamp(), 1),
        )
        .on_json(
            COMMENTS_URL,
            comments_payload(vec![(
                format!("same code {KEY}"),
                now.timestamp(),
                "/r/Piracy/comments/1abc/free_keys/c1",
            )]),
        );

    let source = RedditSource::new("Piracy", false);
    let out = source
        .scrape(&fetcher, &KeyMatcher::default(), &RecencyWindow::new(now, 6), now)
        .await;

    assert_eq!(out.hits.len(), 1);
    // First occurrence wins: the post, not the comment.
    assert_eq!(
        out.hits[0].source_url,
        format!("https://reddit.com{POST_PERMALINK}")
    );
}

#[tokio::test]
async fn comment_fetch_failure_keeps_post_hits() {
    let now = Utc::now();
    let fetcher = MockFetcher::new()
        .on_json(
            LISTING_URL,
            listing_with_post(&format!("Key: {KEY}"), "", now.timestamp(), 5),
        )
        .failing(COMMENTS_URL);

    let source = RedditSource::new("Piracy", false);
    let out = source
        .scrape(&fetcher, &KeyMatcher::default(), &RecencyWindow::new(now, 6), now)
        .await;

    assert_eq!(out.hits.len(), 1);
    assert_eq!(out.errors.len(), 1);
}

#[tokio::test]
async fn listing_fetch_failure_returns_empty_with_error() {
    let now = Utc::now();
    let fetcher = MockFetcher::new();

    let source = RedditSource::new("Piracy", false);
    let out = source
        .scrape(&fetcher, &KeyMatcher::default(), &RecencyWindow::new(now, 6), now)
        .await;

    assert!(out.hits.is_empty());
    assert_eq!(out.errors.len(), 1);
}

#[tokio::test]
async fn found_at_is_the_post_creation_time() {
    let now = Utc::now();
    let created = now - Duration::hours(2);
    let fetcher = MockFetcher::new().on_json(
        LISTING_URL,
        listing_with_post(&format!("Key: {KEY}"), "", created.timestamp(), 0),
    );

    let source = RedditSource::new("Piracy", false);
    let out = source
        .scrape(&fetcher, &KeyMatcher::default(), &RecencyWindow::new(now, 6), now)
        .await;

    assert_eq!(out.hits[0].found_at.timestamp(), created.timestamp());
}
