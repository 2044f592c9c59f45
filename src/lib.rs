//! The Version Gate crate decides whether a running application is still fit to
//! be used, based on version information published by a remote endpoint.
//! 
//! The endpoint publishes a recommended version, a required version, an update
//! URL and an end-of-life flag. The [`VersionGate`](controller::VersionGate)
//! controller fetches this on launch and on return to the foreground, compares
//! it against the running version, and exposes one of four states for the UI
//! to act upon: up to date, update recommended, update required, or
//! end-of-life.
//! 
//! The controller is designed to be called repeatedly and concurrently from an
//! interactive UI. Concurrent refreshes share one fetch, foreground checks are
//! rate-limited by a refresh interval, and every failure fails open, so that a
//! broken endpoint never locks users out.
//! 



//		Modules

pub mod controller;
pub mod fetcher;
pub mod flight;
pub mod interval;
pub mod sources;
pub mod status;

#[cfg(test)]
#[path = "tests/common.rs"]
mod common;

#[cfg(test)]
#[path = "tests/mocks.rs"]
mod mocks;



//		Packages
