use std::{collections::HashSet, time::Duration};

use bytes::Bytes;
use m3u8_rs::{KeyMethod, Playlist};
use url::Url;

use crate::{
    classify::{is_dash_locator, is_hls_locator},
    error::{ReceiverError, ReceiverResult},
    hls::{parse_playlist, select_variant},
    load::{LoadRequest, StreamType},
    observer::{PlaybackState, PlayerEvent},
    request::{NetworkRequest, RequestKind},
    session::{Host, ReceiverHooks, SessionContext},
    status::StatusSurface,
    util::http::HttpClient,
};

/// Player-side state the session observer may inspect and act on.
#[derive(Debug, Default)]
pub struct PlayerControl {
    state: PlaybackState,
    pending_resume: Option<Duration>,
}

impl Host for PlayerControl {
    fn player_state(&self) -> PlaybackState {
        self.state
    }

    fn resume_after(&mut self, delay: Duration) {
        self.pending_resume = Some(delay);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Media playlist the segments were read from.
    pub playlist_url: Url,
    pub live: bool,
    pub segments: usize,
    pub licenses: usize,
    pub bytes: u64,
    pub resumes: u32,
}

/// A receiver without a screen: it walks the HLS playlist of each LOAD and
/// fetches the first segments through the session hooks. Anything that is
/// not a playlist is fetched once as progressive media.
pub struct HeadlessPlayer<S> {
    client: HttpClient,
    session: SessionContext<S>,
    control: PlayerControl,
    segment_limit: usize,
}

impl<S> HeadlessPlayer<S>
where
    S: StatusSurface,
{
    pub fn new(client: HttpClient, session: SessionContext<S>) -> Self {
        Self {
            client,
            session,
            control: PlayerControl::default(),
            segment_limit: 5,
        }
    }

    pub fn with_segment_limit(mut self, segment_limit: usize) -> Self {
        self.segment_limit = segment_limit;
        self
    }

    pub fn session(&self) -> &SessionContext<S> {
        &self.session
    }

    pub fn state(&self) -> PlaybackState {
        self.control.state
    }

    fn emit(&mut self, state: PlaybackState) {
        self.control.state = state;
        self.session
            .on_state_change(&PlayerEvent::new(state), &mut self.control);
    }

    fn fail(&mut self, error: &ReceiverError) {
        // the player gives up on the media before reporting
        self.control.state = PlaybackState::Idle;
        self.session.on_state_change(
            &PlayerEvent::error(error.detailed_code()),
            &mut self.control,
        );
    }

    async fn fetch(&self, kind: RequestKind, url: Url) -> ReceiverResult<Bytes> {
        let mut request = NetworkRequest::new(kind, url);
        self.session.before_fetch(&mut request);
        self.client.fetch(&request).await
    }

    pub async fn load(&mut self, request: LoadRequest) -> ReceiverResult<PlaybackReport> {
        self.control.pending_resume = None;

        let request = self.session.on_load(request);
        let Some(locator) = request.locator() else {
            return Err(ReceiverError::MissingContentId);
        };
        let live = request.stream_type == Some(StreamType::Live);
        let playlist = is_hls_locator(locator)
            || request
                .content_type
                .as_deref()
                .is_some_and(|t| t.to_ascii_lowercase().contains("mpegurl"));

        self.emit(PlaybackState::Loading);
        let url = match Url::parse(locator) {
            Ok(url) => url,
            Err(e) => {
                let e = ReceiverError::from(e);
                self.fail(&e);
                return Err(e);
            }
        };

        let mut resumes = 0;
        loop {
            let played = if playlist || is_dash_locator(url.as_str()) {
                self.play(&url, live).await
            } else {
                self.play_progressive(&url, live).await
            };
            match played {
                Ok(mut report) => {
                    report.resumes = resumes;
                    self.emit(PlaybackState::Idle);
                    return Ok(report);
                }
                Err(e) => {
                    log::error!("Playback failed: {e}");
                    self.fail(&e);

                    let Some(delay) = self.control.pending_resume.take() else {
                        return Err(e);
                    };
                    tokio::time::sleep(delay).await;
                    resumes += 1;
                    log::info!("Resuming playback, attempt {resumes}");
                    self.emit(PlaybackState::Loading);
                }
            }
        }
    }

    async fn play_progressive(&mut self, url: &Url, live: bool) -> ReceiverResult<PlaybackReport> {
        self.emit(PlaybackState::Buffering);
        let data = self.fetch(RequestKind::Segment, url.clone()).await?;
        self.emit(PlaybackState::Playing);

        log::info!("Fetched progressive media, {} bytes", data.len());
        Ok(PlaybackReport {
            playlist_url: url.clone(),
            live,
            segments: 1,
            licenses: 0,
            bytes: data.len() as u64,
            resumes: 0,
        })
    }

    async fn play(&mut self, url: &Url, live: bool) -> ReceiverResult<PlaybackReport> {
        let manifest = self.fetch(RequestKind::Manifest, url.clone()).await?;
        let mut report = PlaybackReport {
            playlist_url: url.clone(),
            live,
            segments: 0,
            licenses: 0,
            bytes: manifest.len() as u64,
            resumes: 0,
        };

        if is_dash_locator(url.as_str()) {
            log::info!("DASH manifest fetched, segments are left to the platform player");
            return Ok(report);
        }

        let playlist = match parse_playlist(&manifest)? {
            Playlist::MasterPlaylist(master) => {
                let variant = select_variant(&master).ok_or(ReceiverError::NoVariant)?;
                let variant_url = url.join(&variant.uri)?;
                log::info!(
                    "Best stream: {variant_url}; Bandwidth: {bandwidth}",
                    bandwidth = variant.bandwidth
                );

                let data = self
                    .fetch(RequestKind::Manifest, variant_url.clone())
                    .await?;
                report.bytes += data.len() as u64;
                report.playlist_url = variant_url;
                match parse_playlist(&data)? {
                    Playlist::MediaPlaylist(playlist) => playlist,
                    Playlist::MasterPlaylist(_) => {
                        return Err(ReceiverError::M3u8ParseError(
                            "variant points to another master playlist".to_string(),
                        ))
                    }
                }
            }
            Playlist::MediaPlaylist(playlist) => playlist,
        };

        self.emit(PlaybackState::Buffering);

        let mut licenses = HashSet::new();
        for segment in playlist.segments.iter().take(self.segment_limit) {
            if let Some(key) = &segment.key {
                if !matches!(key.method, KeyMethod::None) {
                    if let Some(uri) = &key.uri {
                        let key_url = report.playlist_url.join(uri)?;
                        if key_url.scheme().starts_with("http") && licenses.insert(key_url.clone())
                        {
                            let data = self.fetch(RequestKind::License, key_url).await?;
                            report.licenses += 1;
                            report.bytes += data.len() as u64;
                        }
                    }
                }
            }

            let segment_url = report.playlist_url.join(&segment.uri)?;
            let data = self.fetch(RequestKind::Segment, segment_url).await?;
            report.segments += 1;
            report.bytes += data.len() as u64;

            if report.segments == 1 {
                self.emit(PlaybackState::Playing);
            }
        }

        log::info!(
            "Fetched {} segment(s), {} license(s), {} bytes",
            report.segments,
            report.licenses,
            report.bytes
        );
        Ok(report)
    }
}
