//! This module decides when a new check against the remote endpoint is due.

//		Modules

#[cfg(test)]
#[path = "tests/interval.rs"]
mod tests;



//		Packages

use chrono::{DateTime, TimeDelta, Utc};
use core::time::Duration;



//		Constants

/// The number of seconds in an hour.
const SECONDS_PER_HOUR: u64 = 3_600;



//		Structs

//		RefreshInterval															
/// The minimum time between two successful checks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RefreshInterval {
	//		Private properties													
	/// The length of the interval.
	period: Duration,
}

//󰭅		RefreshInterval															
impl RefreshInterval {
	//		Constructors														
	
	//		from_hours															
	/// Creates an interval from a whole number of hours.
	#[must_use]
	pub const fn from_hours(hours: u32) -> Self {
		Self { period: Duration::from_secs((hours as u64).saturating_mul(SECONDS_PER_HOUR)) }
	}
	
	//		from_duration														
	/// Creates an interval of an arbitrary length.
	#[must_use]
	pub const fn from_duration(period: Duration) -> Self {
		Self { period }
	}
	
	//		Public methods														
	
	//		period																
	/// The length of the interval.
	#[must_use]
	pub const fn period(&self) -> Duration {
		self.period
	}
	
	//		is_due																
	/// Whether a refresh is due. See [`should_refresh()`].
	#[must_use]
	pub fn is_due(&self, now: DateTime<Utc>, last_fetch: Option<DateTime<Utc>>) -> bool {
		should_refresh(now, last_fetch, self.period)
	}
}

//󰭅		Default																	
impl Default for RefreshInterval {
	//		default																
	fn default() -> Self {
		Self::from_hours(3)
	}
}



//		Functions

//		should_refresh															
/// Decides whether a new fetch is warranted.
/// 
/// A fetch is always due when none has been recorded. Otherwise it is due once
/// the interval has fully elapsed, including exactly at the boundary. A last
/// fetch time in the future (i.e. negative elapsed time, due to clock skew or
/// an externally-written value) is treated as stale, and so is also due.
/// 
/// # Parameters
/// 
/// * `now`        - The current time.
/// * `last_fetch` - When the last successful fetch happened, if ever.
/// * `interval`   - The minimum time between fetches.
/// 
#[must_use]
pub fn should_refresh(now: DateTime<Utc>, last_fetch: Option<DateTime<Utc>>, interval: Duration) -> bool {
	let Some(last) = last_fetch else {
		return true;
	};
	let elapsed = now.signed_duration_since(last);
	if elapsed < TimeDelta::zero() {
		return true;
	}
	//	An interval too large to represent can never have elapsed
	TimeDelta::from_std(interval).is_ok_and(|period| elapsed >= period)
}
