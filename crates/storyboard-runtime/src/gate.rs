#![forbid(unsafe_code)]

//! Email gate and interest tracking.
//!
//! The editor opens once the user has left a valid email address. The
//! address is reported through a [`SignupNotifier`] and remembered in a
//! [`StorageBackend`] under [`EMAIL_KEY`]; it is stored only when the
//! notifier accepted it, so a failed submission can simply be retried.
//!
//! The transport (an HTTP webhook, a queue, a test double) is the caller's
//! [`SignupNotifier`] implementation. Nothing here performs network I/O.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::persistence::{StorageBackend, StorageError};

const TARGET: &str = "storyboard.gate";

/// Storage key of the accepted email address.
pub const EMAIL_KEY: &str = "user_email";
/// Site identifier sent with every payload.
pub const SITE_NAME: &str = "StoryBuilder";
/// Path reported with signups.
pub const SIGNUP_PATH: &str = "/storytelling";
/// Email reported with interest events when none was stored.
pub const UNKNOWN_EMAIL: &str = "unknown";

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Loose email shape: some non-space text containing `x@y.z`.
const EMAIL_PATTERN: &str = r"\S+@\S+\.\S+";

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

/// Whether `input` contains something shaped like an email address.
///
/// The match is unanchored, so surrounding text is tolerated.
#[must_use]
pub fn is_valid_email(input: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(input))
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Where the signup came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub user_agent: String,
    pub referrer: String,
}

/// Sent when a user submits their email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    pub email: String,
    pub website: String,
    pub path: String,
    pub timestamp: String,
    pub user_agent: String,
    pub referrer: String,
}

impl SignupPayload {
    #[must_use]
    pub fn new(email: &str, context: &ClientContext, timestamp: String) -> Self {
        Self {
            email: email.to_owned(),
            website: SITE_NAME.to_owned(),
            path: SIGNUP_PATH.to_owned(),
            timestamp,
            user_agent: context.user_agent.clone(),
            referrer: context.referrer.clone(),
        }
    }
}

/// Sent when a user asks for the AI analysis feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterestPayload {
    pub email: String,
    pub website: String,
    pub timestamp: String,
}

impl InterestPayload {
    #[must_use]
    pub fn new(email: Option<&str>, timestamp: String) -> Self {
        Self {
            email: email.unwrap_or(UNKNOWN_EMAIL).to_owned(),
            website: SITE_NAME.to_owned(),
            timestamp,
        }
    }
}

/// Current UTC time as ISO 8601 with milliseconds, e.g.
/// `2024-05-01T12:30:00.250Z`.
#[must_use]
pub fn now_iso8601() -> String {
    // web-time keeps this working on wasm targets
    let since_epoch = web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format_iso8601(since_epoch.as_secs(), since_epoch.subsec_millis())
}

fn format_iso8601(secs: u64, millis: u32) -> String {
    let days = secs / 86400;
    let time_secs = secs % 86400;
    let hours = time_secs / 3600;
    let minutes = (time_secs % 3600) / 60;
    let seconds = time_secs % 60;
    let (year, month, day) = days_to_ymd(days);
    format!("{year:04}-{month:02}-{day:02}T{hours:02}:{minutes:02}:{seconds:02}.{millis:03}Z")
}

fn days_to_ymd(days_since_epoch: u64) -> (u64, u64, u64) {
    // Howard Hinnant's civil_from_days
    let z = days_since_epoch as i64 + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y as u64, m, d)
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Delivery failure reported by a [`SignupNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError {
    message: String,
}

impl NotifyError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification failed: {}", self.message)
    }
}

impl std::error::Error for NotifyError {}

/// Outbound channel for signup and interest events.
pub trait SignupNotifier {
    fn notify_signup(&mut self, payload: &SignupPayload) -> Result<(), NotifyError>;

    fn notify_interest(&mut self, payload: &InterestPayload) -> Result<(), NotifyError>;
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Errors from [`EmailGate::submit`].
#[derive(Debug)]
pub enum GateError {
    /// The input does not look like an email address.
    InvalidEmail,
    /// The notifier rejected the signup. Nothing was stored.
    Notify(NotifyError),
    /// The address could not be remembered.
    Storage(StorageError),
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "invalid email address"),
            Self::Notify(e) => write!(f, "{e}"),
            Self::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for GateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEmail => None,
            Self::Notify(e) => Some(e),
            Self::Storage(e) => Some(e),
        }
    }
}

impl From<NotifyError> for GateError {
    fn from(e: NotifyError) -> Self {
        Self::Notify(e)
    }
}

impl From<StorageError> for GateError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Whether the user has passed the email gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailGate {
    email: Option<String>,
}

impl EmailGate {
    /// Read the remembered email from `backend`.
    ///
    /// A blank stored value counts as absent.
    pub fn open(backend: &dyn StorageBackend) -> Result<Self, StorageError> {
        let email = backend
            .load(EMAIL_KEY)?
            .filter(|email| !email.trim().is_empty());
        debug!(target: TARGET, open = email.is_some(), "email gate loaded");
        Ok(Self { email })
    }

    /// Whether the editor may load and autosave the document.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.email.is_some()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Validate, notify, then remember `input`.
    ///
    /// The email is stored exactly as entered. When the notifier fails the
    /// gate stays closed and nothing is written.
    pub fn submit(
        &mut self,
        input: &str,
        context: &ClientContext,
        notifier: &mut dyn SignupNotifier,
        backend: &mut dyn StorageBackend,
    ) -> Result<(), GateError> {
        if input.trim().is_empty() || !is_valid_email(input) {
            return Err(GateError::InvalidEmail);
        }
        let payload = SignupPayload::new(input, context, now_iso8601());
        if let Err(e) = notifier.notify_signup(&payload) {
            warn!(target: TARGET, error = %e, "signup notification failed");
            return Err(e.into());
        }
        backend.save(EMAIL_KEY, input)?;
        self.email = Some(input.to_owned());
        info!(target: TARGET, "email gate opened");
        Ok(())
    }

    /// Report interest in the AI feature.
    ///
    /// Always returns `true`: the user is thanked whether or not the event
    /// was delivered. Delivery failures are logged.
    pub fn register_ai_interest(&self, notifier: &mut dyn SignupNotifier) -> bool {
        let payload = InterestPayload::new(self.email(), now_iso8601());
        if let Err(e) = notifier.notify_interest(&payload) {
            warn!(target: TARGET, error = %e, "interest notification failed");
        } else {
            debug!(target: TARGET, "interest registered");
        }
        true
    }
}
