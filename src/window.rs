//! Time-window filtering for full loads and incremental polls.

use chrono::{DateTime, Utc};

use crate::error::{ConnectorError, Result};
use crate::models::SecondsSinceUnixEpoch;

/// Returns whether `t` lies within `[start, end]`; a missing bound is open.
pub fn in_window(
    t: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> bool {
    start.map_or(true, |s| t >= s) && end.map_or(true, |e| t <= e)
}

/// Inclusive `[start, end]` interval used to select records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Window admitting every record, including ones with unknown timestamps.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn bounded(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Builds a bounded window from fractional epoch seconds.
    pub fn from_epoch_seconds(
        start: SecondsSinceUnixEpoch,
        end: SecondsSinceUnixEpoch,
    ) -> Result<Self> {
        Ok(Self::bounded(epoch_to_utc(start)?, epoch_to_utc(end)?))
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Applies the window to a possibly-unknown timestamp.
    ///
    /// Unknown timestamps pass only an open window: a bounded poll cannot
    /// place them, while a full load must not lose them.
    pub fn admits(&self, t: Option<DateTime<Utc>>) -> bool {
        match t {
            Some(t) => in_window(t, self.start, self.end),
            None => self.is_open(),
        }
    }
}

pub(crate) fn epoch_to_utc(secs: SecondsSinceUnixEpoch) -> Result<DateTime<Utc>> {
    if !secs.is_finite() {
        return Err(ConnectorError::InvalidWindow(format!(
            "bound {} is not a finite number",
            secs
        )));
    }
    let whole = secs.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return Err(ConnectorError::InvalidWindow(format!(
            "bound {} is out of range",
            secs
        )));
    }
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos).ok_or_else(|| {
        ConnectorError::InvalidWindow(format!("bound {} is out of range", secs))
    })
}
