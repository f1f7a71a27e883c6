//! Engagement signals and the counter updates they reduce to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PostCounters;
use crate::error::DomainError;

/// Kind of engagement signal reported by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    View,
    Save,
    ViewTime,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::View => "view",
            MetricKind::Save => "save",
            MetricKind::ViewTime => "view_time",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(MetricKind::View),
            "save" => Ok(MetricKind::Save),
            "view_time" => Ok(MetricKind::ViewTime),
            other => Err(DomainError::InvalidMetric(format!(
                "unknown metric type '{other}'"
            ))),
        }
    }
}

/// Counter column touched by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterField {
    Views,
    Saves,
    AvgViewTime,
}

impl CounterField {
    /// Storage column name.
    pub fn column(&self) -> &'static str {
        match self {
            CounterField::Views => "view_count",
            CounterField::Saves => "save_count",
            CounterField::AvgViewTime => "avg_view_time_seconds",
        }
    }
}

/// Atomic update applied by a counter store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CounterUpdate {
    Increment { field: CounterField, by: i64 },
    Set { field: CounterField, value: f64 },
}

impl CounterUpdate {
    pub fn field(&self) -> CounterField {
        match self {
            CounterUpdate::Increment { field, .. } | CounterUpdate::Set { field, .. } => *field,
        }
    }
}

/// A single observed interaction, reduced immediately into post counters.
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementEvent {
    pub post_id: Uuid,
    pub kind: MetricKind,
    pub value: f64,
    /// Used only for view de-duplication, never forwarded to storage.
    pub session_id: String,
}

impl EngagementEvent {
    pub fn new(post_id: Uuid, kind: MetricKind, value: f64, session_id: impl Into<String>) -> Self {
        Self {
            post_id,
            kind,
            value,
            session_id: session_id.into(),
        }
    }

    /// Check the value against its metric kind and derive the counter update.
    ///
    /// Views always count as exactly one; saves mirror the caller's toggle
    /// state and overwrite; view time overwrites the running average.
    pub fn validate(&self) -> Result<CounterUpdate, DomainError> {
        let value = self.value;
        if !value.is_finite() {
            return Err(DomainError::InvalidMetric(format!(
                "{} value must be a finite number",
                self.kind
            )));
        }

        match self.kind {
            MetricKind::View => {
                if value != 1.0 {
                    return Err(DomainError::InvalidMetric(format!(
                        "view value must be 1, got {value}"
                    )));
                }
                Ok(CounterUpdate::Increment {
                    field: CounterField::Views,
                    by: 1,
                })
            }
            MetricKind::Save => {
                if value < 0.0 || value.fract() != 0.0 {
                    return Err(DomainError::InvalidMetric(format!(
                        "save value must be a non-negative whole number, got {value}"
                    )));
                }
                // 2^63 is the first float past i64::MAX.
                if value >= i64::MAX as f64 {
                    return Err(DomainError::InvalidMetric(format!(
                        "save value {value} does not fit a counter"
                    )));
                }
                Ok(CounterUpdate::Set {
                    field: CounterField::Saves,
                    value,
                })
            }
            MetricKind::ViewTime => {
                if value < 0.0 {
                    return Err(DomainError::InvalidMetric(format!(
                        "view_time value must be non-negative, got {value}"
                    )));
                }
                Ok(CounterUpdate::Set {
                    field: CounterField::AvgViewTime,
                    value,
                })
            }
        }
    }
}

/// Result of recording one engagement event.
#[derive(Debug, Clone, PartialEq)]
pub enum EngagementOutcome {
    /// The update was applied; carries the post's counters afterwards.
    Applied(PostCounters),
    /// The view was already counted for this session. Nothing changed.
    AlreadyCounted,
}
