use castgate::{
    classify::HLS_CONTENT_TYPE,
    status::Severity,
    HeaderSet, LoadRequest, NetworkRequest, ReceiverHooks, RequestKind, ResumePolicy, StreamType,
};
use serde_json::json;

use crate::new_session;

fn load(value: serde_json::Value) -> LoadRequest {
    serde_json::from_value(value).unwrap()
}

fn segment_request(url: &str) -> NetworkRequest {
    NetworkRequest::new(RequestKind::Segment, url.parse().unwrap())
}

#[test]
fn live_playlist_load_installs_headers() {
    let mut session = new_session(ResumePolicy::default());

    let corrected = session.on_load(load(json!({
        "contentId": "https://x/live/ch1.m3u8",
        "contentType": "video/mp4",
        "streamType": "BUFFERED",
        "customData": { "headers": { "Authorization": "Bearer abc" } }
    })));

    assert_eq!(corrected.stream_type, Some(StreamType::Live));
    assert_eq!(corrected.content_type.as_deref(), Some(HLS_CONTENT_TYPE));
    assert_eq!(
        session.headers(),
        &HeaderSet::from_iter([("Authorization", "Bearer abc")])
    );

    let mut request = segment_request("https://x/live/seg1.ts");
    session.before_fetch(&mut request);
    assert_eq!(request.header("Authorization"), Some("Bearer abc"));
}

#[test]
fn second_load_without_headers_clears_store() {
    let mut session = new_session(ResumePolicy::default());

    session.on_load(load(json!({
        "contentId": "https://x/live/ch1.m3u8",
        "customData": { "headers": { "Authorization": "Bearer abc" } }
    })));
    session.on_load(load(json!({
        "contentId": "https://x/live/ch2.m3u8",
        "customData": { "isLive": true }
    })));

    assert!(session.headers().is_empty());

    let mut request = segment_request("https://x/live/seg1.ts");
    session.before_fetch(&mut request);
    assert!(request.headers.is_empty());
}

#[test]
fn later_load_replaces_previous_headers() {
    let mut session = new_session(ResumePolicy::default());

    session.on_load(load(json!({
        "contentId": "https://a/stream.m3u8",
        "customData": { "headers": { "Authorization": "Bearer one", "Cookie": "sid=1" } }
    })));
    session.on_load(load(json!({
        "contentId": "https://b/stream.m3u8",
        "customData": { "headers": { "X-Api-Key": "two" } }
    })));

    assert_eq!(session.headers(), &HeaderSet::from_iter([("X-Api-Key", "two")]));

    let mut request = NetworkRequest::new(
        RequestKind::License,
        "https://b/license".parse().unwrap(),
    );
    session.before_fetch(&mut request);
    assert_eq!(request.header("X-Api-Key"), Some("two"));
    assert_eq!(request.header("Authorization"), None);
    assert_eq!(request.header("Cookie"), None);
}

#[test]
fn rejected_load_keeps_headers_and_reports() {
    let mut session = new_session(ResumePolicy::default());

    session.on_load(load(json!({
        "contentId": "https://a/stream.m3u8",
        "customData": { "headers": { "Authorization": "Bearer one" } }
    })));
    let rejected = load(json!({
        "contentId": "",
        "contentType": "video/mp4",
        "customData": { "headers": { "Authorization": "Bearer two" } }
    }));
    let returned = session.on_load(rejected.clone());

    assert_eq!(returned, rejected);
    assert_eq!(session.headers().get("Authorization"), Some("Bearer one"));

    let status = session.status().last().unwrap();
    assert_eq!(status.severity, Severity::Error);
    assert!(status.message.contains("no media URL"));
}

#[test]
fn missing_credentials_is_an_advisory() {
    let mut session = new_session(ResumePolicy::default());

    session.on_load(LoadRequest::new("https://x/movies/film.mp4"));

    let status = session.status().last().unwrap();
    assert_eq!(status.severity, Severity::Warning);
    assert!(status.message.contains("unauthenticated"));
}

#[test]
fn augmentation_overwrites_host_defaults() {
    let mut session = new_session(ResumePolicy::default());
    session.on_load(load(json!({
        "contentId": "https://x/live/ch1.m3u8",
        "customData": { "headers": { "Authorization": "Bearer abc", "Referer": "https://app/" } }
    })));

    let mut request = segment_request("https://x/live/seg1.ts")
        .with_header("Referer", "https://receiver/")
        .with_header("Accept", "*/*");
    session.before_fetch(&mut request);
    let once = request.clone();
    session.before_fetch(&mut request);

    assert_eq!(request, once);
    assert_eq!(request.header("Referer"), Some("https://app/"));
    assert_eq!(request.header("Authorization"), Some("Bearer abc"));
    assert_eq!(request.header("Accept"), Some("*/*"));
}
