use std::time::{Duration, Instant};

use crate::{
    session::Host,
    status::{Status, StatusSurface},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Buffering,
    Playing,
    Paused,
    Error,
}

impl PlaybackState {
    fn label(self) -> &'static str {
        match self {
            Self::Idle => "Ready to cast",
            Self::Loading => "Loading",
            Self::Buffering => "Buffering",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEvent {
    pub state: PlaybackState,
    pub detailed_error_code: Option<String>,
}

impl PlayerEvent {
    pub fn new(state: PlaybackState) -> Self {
        Self {
            state,
            detailed_error_code: None,
        }
    }

    pub fn error(detailed_error_code: impl Into<String>) -> Self {
        Self {
            state: PlaybackState::Error,
            detailed_error_code: Some(detailed_error_code.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The origin refused the credentials (HTTP 401/403).
    Authentication,
    Playback,
}

impl ErrorKind {
    pub fn classify(detailed_error_code: Option<&str>) -> Self {
        match detailed_error_code {
            Some(code) if code.contains("401") || code.contains("403") => Self::Authentication,
            _ => Self::Playback,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePolicy {
    pub enabled: bool,
    /// Wait before asking the host to resume.
    pub delay: Duration,
    /// No second auto-resume is issued this soon after the previous one.
    pub suppress_window: Duration,
}

impl ResumePolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

impl Default for ResumePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: Duration::from_secs(1),
            suppress_window: Duration::from_secs(30),
        }
    }
}

/// Follows the host's playback events and keeps the status surface current.
///
/// An error status stays on screen until PLAYING is observed or a new
/// session starts. On an error that left the player idle, at most one
/// resume is requested per error episode.
#[derive(Debug)]
pub struct PlaybackObserver {
    policy: ResumePolicy,
    state: PlaybackState,
    error_latched: bool,
    resume_armed: bool,
    last_resume: Option<Instant>,
}

impl PlaybackObserver {
    pub fn new(policy: ResumePolicy) -> Self {
        Self {
            policy,
            state: PlaybackState::Idle,
            error_latched: false,
            resume_armed: true,
            last_resume: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_error_latched(&self) -> bool {
        self.error_latched
    }

    /// A new LOAD was accepted.
    pub fn session_started(&mut self) {
        self.error_latched = false;
        self.resume_armed = true;
    }

    pub fn on_event(
        &mut self,
        event: &PlayerEvent,
        host: &mut dyn Host,
        status: &mut dyn StatusSurface,
    ) {
        let previous = std::mem::replace(&mut self.state, event.state);
        if previous != event.state {
            log::debug!("Playback state: {previous:?} -> {:?}", event.state);
        }

        match event.state {
            PlaybackState::Error => {
                let code = event.detailed_error_code.as_deref();
                let message = match ErrorKind::classify(code) {
                    ErrorKind::Authentication => {
                        log::error!(
                            "Authentication failed ({}), check the headers sent with LOAD",
                            code.unwrap_or("unknown")
                        );
                        format!(
                            "Authentication failed ({}): the stream rejected the supplied credentials",
                            code.unwrap_or("unknown")
                        )
                    }
                    ErrorKind::Playback => {
                        log::error!("Playback failed ({})", code.unwrap_or("unknown"));
                        format!("Playback failed ({})", code.unwrap_or("unknown"))
                    }
                };
                self.error_latched = true;
                status.report(Status::error(message));
                if previous != PlaybackState::Error {
                    self.try_resume(host);
                }
            }
            PlaybackState::Playing => {
                self.error_latched = false;
                self.resume_armed = true;
                if previous != PlaybackState::Playing {
                    status.report(Status::info(event.state.label()));
                }
            }
            state => {
                if !self.error_latched && previous != state {
                    status.report(Status::info(state.label()));
                }
            }
        }
    }

    fn try_resume(&mut self, host: &mut dyn Host) {
        if !self.policy.enabled || host.player_state() != PlaybackState::Idle {
            return;
        }
        if !self.resume_armed {
            log::warn!("Auto-resume already attempted for this error, waiting for a new LOAD");
            return;
        }
        if let Some(last) = self.last_resume {
            if last.elapsed() < self.policy.suppress_window {
                log::warn!(
                    "Auto-resume suppressed: previous attempt was {:.1}s ago",
                    last.elapsed().as_secs_f32()
                );
                return;
            }
        }

        log::info!("Resuming playback in {}ms", self.policy.delay.as_millis());
        self.resume_armed = false;
        self.last_resume = Some(Instant::now());
        host.resume_after(self.policy.delay);
    }
}

impl Default for PlaybackObserver {
    fn default() -> Self {
        Self::new(ResumePolicy::default())
    }
}
