//! # Clock Module
//!
//! Time source used when a file's history does not say which year it was last
//! edited in. History resolution takes a [`Clock`] instead of reading the
//! system time so year boundaries can be reproduced in tests.

use chrono::{DateTime, Datelike, Utc};

/// Source of the current instant.
pub trait Clock {
  fn now(&self) -> DateTime<Utc>;

  /// Calendar year of [`now`](Self::now), in UTC.
  fn current_year(&self) -> i32 {
    self.now().year()
  }
}

impl<T: Clock + ?Sized> Clock for &T {
  fn now(&self) -> DateTime<Utc> {
    (**self).now()
  }
}

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
  /// Freezes the clock at a Unix timestamp, in seconds.
  ///
  /// Returns `None` when the timestamp is outside the range chrono supports.
  pub fn from_unix(seconds: i64) -> Option<Self> {
    DateTime::from_timestamp(seconds, 0).map(Self)
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    self.0
  }
}
