use std::time::Duration;

use castgate::{
    status::Severity, HeadlessPlayer, HttpClient, LoadRequest, PlaybackState, ReceiverError,
    ResumePolicy,
};
use serde_json::json;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::new_session;

const TOKEN: &str = "Bearer abc";

trait AuthMock {
    async fn mock_authed(&self, mock_path: &str, body: &[u8]) -> &Self;

    /// Anything without valid credentials is refused.
    async fn mock_forbidden(&self) -> &Self;
}

impl AuthMock for MockServer {
    async fn mock_authed(&self, mock_path: &str, body: &[u8]) -> &Self {
        Mock::given(method("GET"))
            .and(path(mock_path))
            .and(header("Authorization", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(self)
            .await;
        self
    }

    async fn mock_forbidden(&self) -> &Self {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .with_priority(10)
            .mount(self)
            .await;
        self
    }
}

async fn live_server() -> MockServer {
    let server = MockServer::start().await;
    server
        .mock_authed(
            "/live/ch1.m3u8",
            include_bytes!("../fixtures/live-ch1.m3u8"),
        )
        .await
        .mock_authed("/live/key.bin", &[0u8; 16])
        .await
        .mock_authed("/live/seg1.ts", b"segment-1")
        .await
        .mock_authed("/live/seg2.ts", b"segment-2")
        .await
        .mock_authed("/live/seg3.ts", b"segment-3")
        .await
        .mock_forbidden()
        .await;
    server
}

fn policy() -> ResumePolicy {
    ResumePolicy {
        enabled: true,
        delay: Duration::from_millis(10),
        suppress_window: Duration::from_secs(3600),
    }
}

fn authed_load(server: &MockServer, mock_path: &str) -> LoadRequest {
    serde_json::from_value(json!({
        "contentId": format!("{}{mock_path}", server.uri()),
        "contentType": "video/mp4",
        "customData": { "headers": { "Authorization": TOKEN } }
    }))
    .unwrap()
}

#[tokio::test]
async fn plays_authenticated_live_stream() -> anyhow::Result<()> {
    let server = live_server().await;
    let mut player =
        HeadlessPlayer::new(HttpClient::default(), new_session(policy())).with_segment_limit(2);

    let report = player.load(authed_load(&server, "/live/ch1.m3u8")).await?;

    assert!(report.live);
    assert_eq!(report.segments, 2);
    assert_eq!(report.licenses, 1);
    assert_eq!(report.resumes, 0);
    assert_eq!(report.bytes, 16 + 9 * 2 + include_bytes!("../fixtures/live-ch1.m3u8").len() as u64);
    assert_eq!(player.state(), PlaybackState::Idle);

    let messages: Vec<_> = player
        .session()
        .status()
        .entries()
        .iter()
        .map(|s| s.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Loading live stream",
            "Loading",
            "Buffering",
            "Playing",
            "Ready to cast"
        ]
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
    assert!(requests
        .iter()
        .all(|r| r.headers.get("authorization").unwrap() == TOKEN));

    Ok(())
}

#[tokio::test]
async fn reload_without_headers_fails_with_auth_error() -> anyhow::Result<()> {
    let server = live_server().await;
    let mut player =
        HeadlessPlayer::new(HttpClient::default(), new_session(policy())).with_segment_limit(1);

    player.load(authed_load(&server, "/live/ch1.m3u8")).await?;
    let first_session_requests = server.received_requests().await.unwrap().len();

    let unauthenticated = LoadRequest::new(format!("{}/live/ch1.m3u8", server.uri()));
    let result = player.load(unauthenticated).await;

    assert!(matches!(
        result,
        Err(ReceiverError::HttpError(status)) if status.as_u16() == 403
    ));
    assert!(player.session().headers().is_empty());
    assert!(player.session().observer().is_error_latched());

    let status = player.session().status().last().unwrap();
    assert_eq!(status.severity, Severity::Error);
    assert!(status.message.starts_with("Authentication failed"));

    // one auto-resume, then the error stands
    let requests = server.received_requests().await.unwrap();
    let retried = &requests[first_session_requests..];
    assert_eq!(retried.len(), 2);
    assert!(retried
        .iter()
        .all(|r| r.headers.get("authorization").is_none()));

    Ok(())
}

#[tokio::test]
async fn follows_master_playlist_with_headers() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    server
        .mock_authed("/vod/master.m3u8", include_bytes!("../fixtures/master.m3u8"))
        .await
        .mock_authed("/vod/hd/index.m3u8", include_bytes!("../fixtures/vod.m3u8"))
        .await
        .mock_authed("/vod/hd/part0.ts", b"part-0")
        .await
        .mock_authed("/vod/hd/part1.ts", b"part-1")
        .await
        .mock_forbidden()
        .await;

    let mut player = HeadlessPlayer::new(HttpClient::default(), new_session(policy()));
    let report = player.load(authed_load(&server, "/vod/master.m3u8")).await?;

    // the playlist extension alone marks the session live
    assert!(report.live);
    assert_eq!(
        report.playlist_url.as_str(),
        format!("{}/vod/hd/index.m3u8", server.uri())
    );
    assert_eq!(report.segments, 2);
    assert_eq!(report.licenses, 0);

    Ok(())
}

#[tokio::test]
async fn plays_progressive_media_file() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let film = vec![7u8; 200_000];
    server
        .mock_authed("/movies/film.mp4", &film)
        .await
        .mock_forbidden()
        .await;

    let mut player = HeadlessPlayer::new(HttpClient::default(), new_session(policy()));
    let report = player.load(authed_load(&server, "/movies/film.mp4")).await?;

    assert!(!report.live);
    assert_eq!(report.segments, 1);
    assert_eq!(report.licenses, 0);
    assert_eq!(report.resumes, 0);
    assert_eq!(report.bytes, film.len() as u64);

    let messages: Vec<_> = player
        .session()
        .status()
        .entries()
        .iter()
        .map(|s| s.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Loading on-demand stream",
            "Loading",
            "Buffering",
            "Playing",
            "Ready to cast"
        ]
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn resume_recovers_from_transient_failure() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vod/index.m3u8"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    server
        .mock_authed("/vod/index.m3u8", include_bytes!("../fixtures/vod.m3u8"))
        .await
        .mock_authed("/vod/part0.ts", b"part-0")
        .await
        .mock_authed("/vod/part1.ts", b"part-1")
        .await
        .mock_forbidden()
        .await;

    let mut player = HeadlessPlayer::new(HttpClient::default(), new_session(policy()));
    let report = player.load(authed_load(&server, "/vod/index.m3u8")).await?;

    assert_eq!(report.resumes, 1);
    assert_eq!(report.segments, 2);
    assert!(!player.session().observer().is_error_latched());

    let errors: Vec<_> = player
        .session()
        .status()
        .entries()
        .iter()
        .filter(|s| s.is_error())
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Playback failed (NETWORK_HTTP_503)");

    Ok(())
}

#[tokio::test]
async fn rejected_load_issues_no_requests() -> anyhow::Result<()> {
    let server = live_server().await;
    let mut player = HeadlessPlayer::new(HttpClient::default(), new_session(policy()));

    let result = player.load(LoadRequest::default()).await;

    assert!(matches!(result, Err(ReceiverError::MissingContentId)));
    assert_eq!(player.state(), PlaybackState::Idle);
    assert!(server.received_requests().await.unwrap().is_empty());

    Ok(())
}
