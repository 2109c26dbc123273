use std::time::{Duration, Instant};

/// How long a notification stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_millis(3200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

impl Toast {
    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < TOAST_DURATION
    }
}

/// Holds the notification currently on screen. Showing a new one replaces it.
#[derive(Debug, Default)]
pub struct Toaster {
    current: Option<Toast>,
}

impl Toaster {
    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.show_at(message, kind, Instant::now());
    }

    pub fn show_at(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) {
        self.current = Some(Toast {
            message: message.into(),
            kind,
            shown_at: now,
        });
    }

    /// The visible toast, if it has not been dismissed yet.
    pub fn current(&self) -> Option<&Toast> {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> Option<&Toast> {
        self.current.as_ref().filter(|toast| toast.is_visible_at(now))
    }

    pub fn hide(&mut self) {
        self.current = None;
    }
}
