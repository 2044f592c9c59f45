#![allow(non_snake_case)]

//		Packages

use super::*;
use chrono::TimeZone as _;



//		Common

//		noon																	
/// A fixed reference instant.
fn noon() -> DateTime<Utc> {
	Utc.with_ymd_and_hms(2026, 1, 14, 12, 0, 0).unwrap()
}

//		hours																	
/// A standard duration of the given number of hours.
const fn hours(count: u64) -> Duration {
	Duration::from_secs(count * SECONDS_PER_HOUR)
}



//		Tests

#[cfg(test)]
mod functions {
	use super::*;
	
	//		should_refresh														
	#[test]
	fn should_refresh__never_fetched() {
		assert!(should_refresh(noon(), None, hours(3)), "A missing last fetch should always be due");
	}
	#[test]
	fn should_refresh__never_fetched_with_zero_interval() {
		assert!(should_refresh(noon(), None, Duration::ZERO), "A missing last fetch should always be due");
	}
	#[test]
	fn should_refresh__within_interval() {
		let last = noon() - TimeDelta::hours(1);
		assert!(!should_refresh(noon(), Some(last), hours(3)), "One hour into a three hour interval");
	}
	#[test]
	fn should_refresh__just_before_boundary() {
		let last = noon() - TimeDelta::hours(3) + TimeDelta::seconds(1);
		assert!(!should_refresh(noon(), Some(last), hours(3)), "One second short of the boundary");
	}
	#[test]
	fn should_refresh__exactly_at_boundary() {
		let last = noon() - TimeDelta::hours(3);
		assert!(should_refresh(noon(), Some(last), hours(3)), "The boundary itself should be due");
	}
	#[test]
	fn should_refresh__past_boundary() {
		let last = noon() - TimeDelta::hours(4);
		assert!(should_refresh(noon(), Some(last), hours(3)), "Four hours into a three hour interval");
	}
	#[test]
	fn should_refresh__same_instant() {
		assert!(!should_refresh(noon(), Some(noon()), hours(3)), "Nothing has elapsed");
		assert!( should_refresh(noon(), Some(noon()), Duration::ZERO), "A zero interval is always due");
	}
	#[test]
	fn should_refresh__last_fetch_in_future() {
		let last = noon() + TimeDelta::hours(1);
		assert!(should_refresh(noon(), Some(last), hours(3)), "A future last fetch should be treated as stale");
	}
	#[test]
	fn should_refresh__last_fetch_slightly_in_future() {
		let last = noon() + TimeDelta::milliseconds(1);
		assert!(should_refresh(noon(), Some(last), hours(3)), "Any negative elapsed time should be due");
	}
	#[test]
	fn should_refresh__unrepresentable_interval() {
		let last = noon() - TimeDelta::days(365 * 100);
		assert!(!should_refresh(noon(), Some(last), Duration::MAX), "An interval beyond range never elapses");
	}
}

#[cfg(test)]
mod refresh_interval {
	use super::*;
	
	//		from_hours															
	#[test]
	fn from_hours() {
		assert_eq!(RefreshInterval::from_hours(3).period(), hours(3));
		assert_eq!(RefreshInterval::from_hours(0).period(), Duration::ZERO);
	}
	#[test]
	fn from_hours__max() {
		assert_eq!(RefreshInterval::from_hours(u32::MAX).period(), hours(u64::from(u32::MAX)));
	}
	
	//		from_duration														
	#[test]
	fn from_duration() {
		let interval = RefreshInterval::from_duration(Duration::from_secs(90));
		assert_eq!(interval.period(), Duration::from_secs(90));
	}
	
	//		default																
	#[test]
	fn default() {
		assert_eq!(RefreshInterval::default(), RefreshInterval::from_hours(3));
		assert_eq!(RefreshInterval::default().period(), Duration::from_secs(10_800));
	}
	
	//		is_due																
	#[test]
	fn is_due() {
		let interval = RefreshInterval::from_hours(3);
		assert!( interval.is_due(noon(), None),                                "Never fetched");
		assert!(!interval.is_due(noon(), Some(noon() - TimeDelta::hours(2))), "Within interval");
		assert!( interval.is_due(noon(), Some(noon() - TimeDelta::hours(3))), "At boundary");
		assert!( interval.is_due(noon(), Some(noon() + TimeDelta::hours(2))), "In future");
	}
}
