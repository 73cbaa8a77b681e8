use std::time::Duration;

use url::Url;

use crate::error::ViewerError;

/// Path of the WebSocket endpoint on the host serving the page.
pub const DEFAULT_ENDPOINT_PATH: &str = "/ws";

/// How long the table keeps the pulse marker after new data arrives.
pub const DEFAULT_PULSE_DURATION: Duration = Duration::from_millis(250);

/// CSS class toggled on the table container for the pulse.
pub const DEFAULT_PULSE_CLASS: &str = "pulse";

/// Placeholder shown once the server closes the connection.
pub const CLOSED_TEXT: &str = "Connection closed. Please refresh the page.";

/// Placeholder shown when the transport reports an error.
pub const ERROR_TEXT: &str = "An error occurred. Please check the console.";

/// What a session does once its connection is closed or errored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Stay on the placeholder until the page is reloaded.
    #[default]
    Never,
    /// Re-enter `Connecting` after an exponentially growing delay.
    Backoff {
        /// Delay before the first retry.
        initial: Duration,
        /// Upper bound for any single delay.
        max: Duration,
        /// Retries allowed before giving up. The count resets once a
        /// connection opens.
        max_attempts: u32,
    },
}

impl ReconnectPolicy {
    /// Bounded exponential backoff: 500ms doubling up to 30s, ten attempts.
    pub fn backoff() -> Self {
        ReconnectPolicy::Backoff {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(30),
            max_attempts: 10,
        }
    }

    pub fn allows_retry(&self) -> bool {
        matches!(self, ReconnectPolicy::Backoff { max_attempts, .. } if *max_attempts > 0)
    }

    /// Delay before retry number `attempt` (1-based), or `None` when the
    /// policy does not allow that attempt.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        match *self {
            ReconnectPolicy::Never => None,
            ReconnectPolicy::Backoff {
                initial,
                max,
                max_attempts,
            } => {
                if attempt == 0 || attempt > max_attempts {
                    return None;
                }
                let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
                Some(initial.saturating_mul(factor).min(max))
            }
        }
    }
}

/// Settings for a live view session.
///
/// ```rust
/// use std::time::Duration;
/// use regview_client::{ReconnectPolicy, ViewerConfig};
///
/// let config = ViewerConfig::default()
///     .with_pulse_duration(Duration::from_millis(400))
///     .with_reconnect(ReconnectPolicy::backoff());
///
/// let url = config.endpoint_url("plc-gateway:8080", false).unwrap();
/// assert_eq!(url.as_str(), "ws://plc-gateway:8080/ws");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    /// Path of the WebSocket endpoint (default: `/ws`)
    pub endpoint_path: String,
    /// How long the pulse marker stays on the table (default: 250ms)
    pub pulse_duration: Duration,
    /// CSS class used as the pulse marker (default: `pulse`)
    pub pulse_class: String,
    /// Behaviour after the connection ends (default: never reconnect)
    pub reconnect: ReconnectPolicy,
    /// Placeholder row rendered on close
    pub closed_text: String,
    /// Placeholder row rendered on transport error
    pub error_text: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            pulse_duration: DEFAULT_PULSE_DURATION,
            pulse_class: DEFAULT_PULSE_CLASS.to_string(),
            reconnect: ReconnectPolicy::Never,
            closed_text: CLOSED_TEXT.to_string(),
            error_text: ERROR_TEXT.to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn with_endpoint_path(mut self, path: impl Into<String>) -> Self {
        self.endpoint_path = path.into();
        self
    }

    pub fn with_pulse_duration(mut self, duration: Duration) -> Self {
        self.pulse_duration = duration;
        self
    }

    pub fn with_pulse_class(mut self, class: impl Into<String>) -> Self {
        self.pulse_class = class.into();
        self
    }

    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    pub fn with_placeholders(
        mut self,
        closed_text: impl Into<String>,
        error_text: impl Into<String>,
    ) -> Self {
        self.closed_text = closed_text.into();
        self.error_text = error_text.into();
        self
    }

    /// Builds the WebSocket URL for `host` (a `host[:port]` authority).
    ///
    /// `secure` selects `wss` and should follow the scheme the page was
    /// served with.
    pub fn endpoint_url(&self, host: &str, secure: bool) -> Result<Url, ViewerError> {
        let scheme = if secure { "wss" } else { "ws" };
        let base = Url::parse(&format!("{scheme}://{host}/"))?;
        Ok(base.join(&self.endpoint_path)?)
    }
}
