//! Timed flash banner shown after a server round-trip.
//!
//! The server attaches at most one `(kind, message)` pair to the response that
//! follows a mutation. The notifier turns it into a banner that stays up for a
//! fixed timeout. A newer flash replaces the banner and restarts the timer.
//!
//! Handlers only use [`FlashNotifier::arrive`] and the banner view. The clock
//! side (`poll_at`, `teardown`) models what `static/app.js` does with the
//! `data-dismiss-after` attribute, so the timing rules stay testable in Rust.

use std::time::{Duration, Instant};

use serde::Serialize;

pub const FLASH_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Create,
    Update,
    Delete,
}

impl FlashKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashKind::Create => "create",
            FlashKind::Update => "update",
            FlashKind::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(FlashKind::Create),
            "update" => Some(FlashKind::Update),
            "delete" => Some(FlashKind::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BannerStyle {
    pub color: &'static str,
    pub icon: &'static str,
}

/// Unknown or missing kinds fall back to the affirmative style.
pub fn banner_style(kind: Option<FlashKind>) -> BannerStyle {
    match kind {
        Some(FlashKind::Update) => BannerStyle {
            color: "bg-blue-600",
            icon: "refresh-cw",
        },
        Some(FlashKind::Delete) => BannerStyle {
            color: "bg-red-600",
            icon: "trash-2",
        },
        Some(FlashKind::Create) | None => BannerStyle {
            color: "bg-green-600",
            icon: "check-circle",
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashInfo {
    pub message: String,
    pub kind: Option<FlashKind>,
}

impl FlashInfo {
    pub fn new(kind: FlashKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: Some(kind),
        }
    }

    /// Builds a flash from its wire parts. An empty message is no flash at all.
    pub fn from_parts(kind: &str, message: &str) -> Option<Self> {
        if message.is_empty() {
            return None;
        }
        Some(Self {
            message: message.to_string(),
            kind: FlashKind::parse(kind),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashBanner {
    pub message: String,
    pub method: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub dismiss_after_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FlashState {
    Idle,
    Showing { info: FlashInfo, deadline: Instant },
}

#[derive(Debug, Clone)]
pub struct FlashNotifier {
    timeout: Duration,
    state: FlashState,
}

impl Default for FlashNotifier {
    fn default() -> Self {
        Self::new(FLASH_TIMEOUT)
    }
}

impl FlashNotifier {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            state: FlashState::Idle,
        }
    }

    pub fn arrive(&mut self, info: Option<FlashInfo>) {
        self.arrive_at(info, Instant::now());
    }

    /// A response without a flash leaves the current banner alone.
    pub fn arrive_at(&mut self, info: Option<FlashInfo>, now: Instant) {
        let Some(info) = info else {
            return;
        };
        self.state = FlashState::Showing {
            info,
            deadline: now + self.timeout,
        };
    }

    /// Returns true when this poll cleared the banner.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        let expired = matches!(
            &self.state,
            FlashState::Showing { deadline, .. } if now >= *deadline
        );
        if expired {
            self.state = FlashState::Idle;
        }
        expired
    }

    pub fn teardown(&mut self) {
        self.state = FlashState::Idle;
    }

    pub fn is_showing(&self) -> bool {
        matches!(self.state, FlashState::Showing { .. })
    }

    pub fn current(&self) -> Option<&FlashInfo> {
        match &self.state {
            FlashState::Showing { info, .. } => Some(info),
            FlashState::Idle => None,
        }
    }

    pub fn banner(&self) -> Option<FlashBanner> {
        let info = self.current()?;
        let style = banner_style(info.kind);
        Some(FlashBanner {
            message: info.message.clone(),
            method: info.kind.map(FlashKind::as_str).unwrap_or(""),
            color: style.color,
            icon: style.icon,
            dismiss_after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }
}
