use std::time::Duration;

use crate::{
    header::{HeaderSet, HeaderStore},
    load::{intercept_load, LoadRequest},
    observer::{PlaybackObserver, PlaybackState, PlayerEvent, ResumePolicy},
    request::{augment, NetworkRequest},
    status::{Status, StatusSurface},
    ReceiverError,
};

/// Controls the receiver exposes to the pipeline.
pub trait Host {
    /// State of the underlying media player.
    fn player_state(&self) -> PlaybackState;

    /// Ask the player to resume once `delay` has passed.
    fn resume_after(&mut self, delay: Duration);
}

/// Callbacks a host invokes while playing a cast session.
///
/// ```text
///  LOAD ──► on_load ──► HeaderStore ◄── before_fetch ◄── manifest / segment / license
///                                                          fetches
///  player events ──► on_state_change ──► status surface, Host::resume_after
/// ```
pub trait ReceiverHooks {
    /// Called synchronously for every LOAD. Returns the request to continue with.
    fn on_load(&mut self, request: LoadRequest) -> LoadRequest;

    /// Called right before each outbound fetch.
    fn before_fetch(&self, request: &mut NetworkRequest);

    fn on_state_change(&mut self, event: &PlayerEvent, host: &mut dyn Host);
}

/// Everything one receiver keeps between callbacks.
pub struct SessionContext<S> {
    headers: HeaderStore,
    observer: PlaybackObserver,
    status: S,
}

impl<S> SessionContext<S>
where
    S: StatusSurface,
{
    pub fn new(status: S) -> Self {
        Self::with_policy(status, ResumePolicy::default())
    }

    pub fn with_policy(status: S, policy: ResumePolicy) -> Self {
        Self {
            headers: HeaderStore::new(),
            observer: PlaybackObserver::new(policy),
            status,
        }
    }

    pub fn headers(&self) -> &HeaderSet {
        self.headers.current()
    }

    pub fn observer(&self) -> &PlaybackObserver {
        &self.observer
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut S {
        &mut self.status
    }
}

impl<S> ReceiverHooks for SessionContext<S>
where
    S: StatusSurface,
{
    fn on_load(&mut self, request: LoadRequest) -> LoadRequest {
        let interception = intercept_load(&mut self.headers, request);
        match &interception.outcome {
            Ok(summary) => {
                self.observer.session_started();
                let kind = if summary.classification.is_live() {
                    "live"
                } else {
                    "on-demand"
                };
                if summary.header_count == 0 {
                    self.status.report(Status::warning(format!(
                        "No credentials supplied, playing {kind} stream unauthenticated"
                    )));
                } else {
                    log::info!(
                        "Session authenticated with {} header(s): [{}]",
                        summary.header_count,
                        self.headers
                            .current()
                            .names()
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                    self.status
                        .report(Status::info(format!("Loading {kind} stream")));
                }
            }
            Err(ReceiverError::MissingContentId) => {
                self.status
                    .report(Status::error("LOAD rejected: no media URL was provided"));
            }
            Err(e) => {
                self.status.report(Status::error(format!("LOAD rejected: {e}")));
            }
        }
        interception.request
    }

    fn before_fetch(&self, request: &mut NetworkRequest) {
        augment(self.headers.current(), request);
    }

    fn on_state_change(&mut self, event: &PlayerEvent, host: &mut dyn Host) {
        self.observer.on_event(event, host, &mut self.status);
    }
}
