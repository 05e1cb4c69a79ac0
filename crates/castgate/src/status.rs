use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A short line for whatever display the receiver is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub severity: Severity,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub trait StatusSurface {
    fn report(&mut self, status: Status);
}

impl<T: StatusSurface + ?Sized> StatusSurface for Box<T> {
    fn report(&mut self, status: Status) {
        self.as_mut().report(status)
    }
}

/// Status surface backed by the log output.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatus;

impl StatusSurface for LogStatus {
    fn report(&mut self, status: Status) {
        match status.severity {
            Severity::Info => log::info!("[status] {status}"),
            Severity::Warning => log::warn!("[status] {status}"),
            Severity::Error => log::error!("[status] {status}"),
        }
    }
}

/// Keeps every reported status, newest last.
#[derive(Debug, Default, Clone)]
pub struct StatusHistory {
    entries: Vec<Status>,
}

impl StatusHistory {
    pub fn entries(&self) -> &[Status] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Status> {
        self.entries.last()
    }
}

impl StatusSurface for StatusHistory {
    fn report(&mut self, status: Status) {
        self.entries.push(status);
    }
}
