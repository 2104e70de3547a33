use std::path::PathBuf;
use std::time::Duration;

use crate::{
    Error, Result, COLUMN_LABELS, DEFAULT_MAX_LOADS, DEFAULT_WAIT_SECS, DISCOVERY_TIMEOUT_SECS,
    SOURCE_NAME, TARGET_URL,
};

/// Everything a single pipeline run needs to know.
///
/// Only `wait_secs` and `max_loads` are user tunables in the usual sense; the
/// rest default to the fixed target and naming of the exported file.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Seconds to wait after navigation and after every growth action.
    pub wait_secs: f64,
    /// Upper bound on growth actions.
    pub max_loads: u32,
    pub target_url: String,
    pub source_name: String,
    pub output_dir: PathBuf,
    /// Column labels for title, owner and amount, in that order.
    pub column_labels: [String; 3],
    pub discovery_timeout: Duration,
    /// Optional limit on the whole run. Expiry is treated as a fatal failure.
    pub deadline_secs: Option<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            wait_secs: DEFAULT_WAIT_SECS,
            max_loads: DEFAULT_MAX_LOADS,
            target_url: TARGET_URL.into(),
            source_name: SOURCE_NAME.into(),
            output_dir: PathBuf::from("."),
            column_labels: COLUMN_LABELS.map(String::from),
            discovery_timeout: Duration::from_secs(DISCOVERY_TIMEOUT_SECS),
            deadline_secs: None,
        }
    }
}

impl RunConfig {
    /// Rejects out-of-range tunables before any run state is created.
    pub fn validate(&self) -> Result<()> {
        if self.wait_secs.is_nan()
            || self.wait_secs < 1.0
            || Duration::try_from_secs_f64(self.wait_secs).is_err()
        {
            return Err(Error::Validation(format!(
                "the wait interval must be at least 1.0 seconds and representable, got {}",
                self.wait_secs
            )));
        }
        if self.max_loads < 1 {
            return Err(Error::Validation(
                "the load limit must be at least 1".into(),
            ));
        }
        if let Some(deadline) = self.deadline_secs {
            if deadline.is_nan()
                || deadline <= 0.0
                || Duration::try_from_secs_f64(deadline).is_err()
            {
                return Err(Error::Validation(format!(
                    "the deadline must be a positive, representable number of seconds, got {deadline}"
                )));
            }
        }
        if self.source_name.trim().is_empty() {
            return Err(Error::Validation("the source name must not be empty".into()));
        }
        Ok(())
    }

    /// Only meaningful after `validate` succeeded; never panics, values that
    /// don't fit saturate.
    pub fn wait_interval(&self) -> Duration {
        to_duration(self.wait_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(to_duration)
    }
}

fn to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(if secs > 0.0 {
        Duration::MAX
    } else {
        Duration::ZERO
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = RunConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.wait_interval(), Duration::from_secs(3));
        assert_eq!(cfg.max_loads, 50);
    }

    #[test]
    fn rejects_short_wait_interval() {
        for wait_secs in [0.0, 0.99, -1.0, f64::NAN, f64::INFINITY, 1e20] {
            let cfg = RunConfig {
                wait_secs,
                ..RunConfig::default()
            };
            assert!(
                matches!(cfg.validate(), Err(Error::Validation(_))),
                "accepted {wait_secs}"
            );
        }
        let cfg = RunConfig {
            wait_secs: 1.0,
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_bound_and_bad_deadline() {
        let cfg = RunConfig {
            max_loads: 0,
            ..RunConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Validation(_))));

        for deadline in [0.0, -3.0, f64::NAN, f64::INFINITY, 1e20] {
            let cfg = RunConfig {
                deadline_secs: Some(deadline),
                ..RunConfig::default()
            };
            assert!(
                matches!(cfg.validate(), Err(Error::Validation(_))),
                "accepted {deadline}"
            );
        }
    }

    #[test]
    fn oversized_values_never_panic() {
        let cfg = RunConfig {
            wait_secs: 1e20,
            deadline_secs: Some(1e20),
            ..RunConfig::default()
        };
        assert_eq!(cfg.wait_interval(), Duration::MAX);
        assert_eq!(cfg.deadline(), Some(Duration::MAX));
    }
}
