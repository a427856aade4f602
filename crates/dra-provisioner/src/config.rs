use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
// Associations on one file system are processed one at a time by the
// service, so a single create can sit behind several others.
const DEFAULT_MAX_WAIT_MINUTES: u64 = 120;

/// Floor applied to the poll interval so a zero setting cannot spin on
/// describe calls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Bounds for polling an association until it settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizeConfig {
    pub poll_interval: Duration,
    pub max_wait: Duration,
    /// How long one invocation may block on polling before handing an
    /// in-progress event back to the host. `None` blocks up to `max_wait`.
    pub invocation_budget: Option<Duration>,
}

impl StabilizeConfig {
    /// The interval actually slept between polls.
    pub fn poll_every(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }
}

impl Default for StabilizeConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_wait: Duration::from_secs(DEFAULT_MAX_WAIT_MINUTES * 60),
            invocation_budget: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    #[serde(default)]
    pub region: Option<String>,
    pub poll_interval_secs: u64,
    pub max_wait_minutes: u64,
    #[serde(default)]
    pub invocation_budget_secs: Option<u64>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            region: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_wait_minutes: DEFAULT_MAX_WAIT_MINUTES,
            invocation_budget_secs: None,
        }
    }
}

impl HandlerConfig {
    /// Defaults overridden by `AWS_REGION`, `DRA_POLL_INTERVAL_SECS`,
    /// `DRA_MAX_WAIT_MINUTES` and `DRA_INVOCATION_BUDGET_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            region: env::var("AWS_REGION").ok().filter(|r| !r.is_empty()),
            poll_interval_secs: env_u64("DRA_POLL_INTERVAL_SECS")
                .unwrap_or(defaults.poll_interval_secs),
            max_wait_minutes: env_u64("DRA_MAX_WAIT_MINUTES").unwrap_or(defaults.max_wait_minutes),
            invocation_budget_secs: env_u64("DRA_INVOCATION_BUDGET_SECS"),
        }
    }

    pub fn stabilize(&self) -> StabilizeConfig {
        StabilizeConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            max_wait: Duration::from_secs(self.max_wait_minutes.saturating_mul(60)),
            invocation_budget: self.invocation_budget_secs.map(Duration::from_secs),
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring non-numeric config override");
            None
        }
    }
}
