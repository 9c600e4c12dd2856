use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Default token lifetime, in ticks of the configured [`TimeResolution`].
pub const DEFAULT_EXPIRE_INTERVAL: i64 = 10 * 60 * 1000;

/// Unit of the timestamps stored in tokens and returned by a [`Clock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
pub enum TimeResolution {
    #[default]
    Seconds,
    Milliseconds,
}

impl TimeResolution {
    fn ticks(self, since_epoch: Duration) -> i64 {
        let ticks = match self {
            TimeResolution::Seconds => u128::from(since_epoch.as_secs()),
            TimeResolution::Milliseconds => since_epoch.as_millis(),
        };
        i64::try_from(ticks).unwrap_or(i64::MAX)
    }
}

impl FromStr for TimeResolution {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "s" | "seconds" => Ok(TimeResolution::Seconds),
            "ms" | "milliseconds" => Ok(TimeResolution::Milliseconds),
            other => Err(format!("unknown time resolution {other:?}")),
        }
    }
}

/// How [`AuthToken::is_expired`] decides expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
pub enum ExpiryMode {
    /// Historical check: a token is expired only when it was stamped after
    /// `now`. Elapsed time never expires it and the interval is ignored.
    /// Known defect.
    #[default]
    Legacy,
    /// Expired once `now >= create_time + interval`.
    Elapsed,
}

impl FromStr for ExpiryMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "legacy" => Ok(ExpiryMode::Legacy),
            "elapsed" => Ok(ExpiryMode::Elapsed),
            other => Err(format!("unknown expiry mode {other:?}")),
        }
    }
}

/// Expiry settings handed to the token check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
pub struct ExpiryPolicy {
    /// Token lifetime, in ticks of `resolution`.
    pub interval: i64,
    pub resolution: TimeResolution,
    pub mode: ExpiryMode,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_EXPIRE_INTERVAL,
            resolution: TimeResolution::default(),
            mode: ExpiryMode::default(),
        }
    }
}

impl ExpiryPolicy {
    pub fn elapsed(interval: i64, resolution: TimeResolution) -> Self {
        Self {
            interval,
            resolution,
            mode: ExpiryMode::Elapsed,
        }
    }
}

#[cfg(feature = "with-serde")]
impl common_config::ServiceConfig for ExpiryPolicy {
    const PREFIX: &'static str = "AUTH_TOKEN_";

    fn apply_environment_overrides(&mut self, prefix: &str) {
        common_config::env_override(prefix, "EXPIRE_INTERVAL", &mut self.interval);
        common_config::env_override(prefix, "TIME_RESOLUTION", &mut self.resolution);
        common_config::env_override(prefix, "EXPIRY_MODE", &mut self.mode);
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self, resolution: TimeResolution) -> i64;
}

/// Wall clock based on [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self, resolution: TimeResolution) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since_epoch) => resolution.ticks(since_epoch),
            Err(err) => -resolution.ticks(err.duration()),
        }
    }
}

/// Clock frozen at a single instant, whatever resolution is asked for.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self, _resolution: TimeResolution) -> i64 {
        self.0
    }
}

/// Token issued for an API request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
pub struct AuthToken {
    create_time: i64,
    token: String,
    original_url: String,
}

impl AuthToken {
    pub fn new(create_time: i64, token: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            create_time,
            token: token.into(),
            original_url: original_url.into(),
        }
    }

    pub fn create_time(&self) -> i64 {
        self.create_time
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    /// Check expiry against `clock`, read in the policy's resolution.
    pub fn is_expired(&self, policy: &ExpiryPolicy, clock: &dyn Clock) -> bool {
        self.is_expired_at(policy, clock.now(policy.resolution))
    }

    /// Check expiry against an explicit `now`, in the policy's resolution.
    pub fn is_expired_at(&self, policy: &ExpiryPolicy, now: i64) -> bool {
        let expired = match policy.mode {
            ExpiryMode::Legacy => self.create_time > now,
            ExpiryMode::Elapsed => now >= self.create_time.saturating_add(policy.interval),
        };
        tracing::trace!(
            create_time = self.create_time,
            now,
            mode = ?policy.mode,
            expired,
            "token expiry check"
        );
        expired
    }

    /// Token comparison has not been implemented; no token ever matches.
    pub fn matches(&self, _other: &AuthToken) -> bool {
        false
    }
}
