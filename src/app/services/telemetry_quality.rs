//! Timestamp sanity checks and data-completeness flags for decoded telegrams
//!
//! Both telegram decoders run their embedded timestamp through [`sanitize_timestamp`]
//! and summarize field parsing with a [`DataStatus`] before handing the health
//! record on.

use crate::app::models::StationHealth;
use crate::constants::{MAX_TIMESTAMP_AGE_DAYS, MAX_TIMESTAMP_LEAD_DAYS};
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use tracing::warn;

/// Fixed-width parse flags, one per tracked observation field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStatus {
    flags: Vec<bool>,
}

impl DataStatus {
    pub fn from_flags(flags: impl IntoIterator<Item = bool>) -> Self {
        Self {
            flags: flags.into_iter().collect(),
        }
    }

    /// Number of fields that parsed
    pub fn count(&self) -> u32 {
        self.flags.iter().filter(|f| **f).count() as u32
    }

    /// Number of tracked fields
    pub fn width(&self) -> usize {
        self.flags.len()
    }

    pub fn is_complete(&self) -> bool {
        self.flags.iter().all(|f| *f)
    }
}

impl fmt::Display for DataStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in &self.flags {
            f.write_str(if *flag { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Direction of an out-of-window telegram timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeDrift {
    Behind { days: i64 },
    Ahead { days: i64 },
}

impl fmt::Display for TimeDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeDrift::Behind { days } => write!(
                f,
                "telegram timestamp is {} days behind decode time; replaced with decode time",
                days
            ),
            TimeDrift::Ahead { days } => write!(
                f,
                "telegram timestamp is {} days ahead of decode time; replaced with decode time",
                days
            ),
        }
    }
}

/// Result of running a telegram timestamp through the sanity window
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedTimestamp {
    /// Timestamp to store (decode time when clamped)
    pub timestamp: DateTime<Utc>,
    /// `now - telegram timestamp` in whole minutes, computed before clamping
    pub drift_minutes: i64,
    /// Set when the telegram timestamp fell outside the window
    pub drift: Option<TimeDrift>,
}

/// Clamp a telegram timestamp to `now` when it is more than 90 days old or more
/// than 1 day in the future
pub fn sanitize_timestamp(telegram_ts: DateTime<Utc>, now: DateTime<Utc>) -> SanitizedTimestamp {
    let offset = now - telegram_ts;
    let drift_minutes = offset.num_minutes();

    let drift = if offset > Duration::days(MAX_TIMESTAMP_AGE_DAYS) {
        Some(TimeDrift::Behind {
            days: offset.num_days(),
        })
    } else if -offset > Duration::days(MAX_TIMESTAMP_LEAD_DAYS) {
        Some(TimeDrift::Ahead {
            days: (-offset).num_days(),
        })
    } else {
        None
    };

    match drift {
        Some(d) => {
            warn!("Clamping telegram timestamp {}: {}", telegram_ts, d);
            SanitizedTimestamp {
                timestamp: now,
                drift_minutes,
                drift,
            }
        }
        None => SanitizedTimestamp {
            timestamp: telegram_ts,
            drift_minutes,
            drift: None,
        },
    }
}

/// Stamp completeness, drift and anomaly annotation onto a health record
pub fn annotate_health(
    mut health: StationHealth,
    status: &DataStatus,
    sanitized: &SanitizedTimestamp,
) -> StationHealth {
    health.timestamp = sanitized.timestamp;
    health.data_count = status.count();
    health.data_status = status.to_string();
    health.drift_minutes = sanitized.drift_minutes;
    health.error_msg = sanitized.drift.map(|d| d.to_string());
    health
}
