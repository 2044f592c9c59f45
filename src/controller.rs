//! This module provides the version gate controller.
//! 
//! The [`VersionGate`] is what an application talks to. It should be asked to
//! [`refresh()`](VersionGate::refresh()) when the application launches, and to
//! [`refresh_if_needed()`](VersionGate::refresh_if_needed()) whenever the
//! application returns to the foreground. It is safe to call these as often
//! and as concurrently as the UI likes:
//! 
//!   - Concurrent refreshes share a single fetch, and all callers observe the
//!     same outcome.
//!   - Foreground checks only fetch once the configured interval has elapsed
//!     since the last successful fetch.
//!   - Failures never reach the caller. Any failure is reported to the
//!     [`ErrorSink`], and the status is set to [`GateStatus::UpToDate`], so
//!     that an unreachable or misbehaving endpoint can never lock users out of
//!     the application.
//! 
//! Note that a failure overrides any previously-known status, including
//! [`GateStatus::RequiredUpdate`] and [`GateStatus::EndOfLife`].
//! 

//		Modules

#[cfg(test)]
#[path = "tests/controller.rs"]
mod tests;



//		Packages

use crate::{
	fetcher::{FetchError, Fetcher, HttpFetcher},
	flight::{Flight, FlightError, SingleFlight},
	interval::RefreshInterval,
	sources::{
		Clock,
		ErrorSink,
		FileLastFetchStore,
		LastFetchStore,
		MemoryLastFetchStore,
		SystemClock,
		TracingErrorSink,
		VersionSource,
	},
	status::{Comparator, GateStatus, OrdinalComparator, VersionDescriptor},
};
use core::{
	fmt::{Debug, self},
	time::Duration,
};
use serde::{Deserialize, Serialize};
use std::{
	path::PathBuf,
	sync::Arc,
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;



//		Enums

//		RefreshError															
/// Failures that a refresh can run into.
/// 
/// These are never returned to the caller. They are passed to the
/// [`ErrorSink`] before the controller fails open.
/// 
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum RefreshError {
	/// Fetching the descriptor failed.
	#[error(transparent)]
	Fetch(#[from] FetchError),
	
	/// The refresh operation itself did not complete.
	#[error(transparent)]
	Flight(#[from] FlightError),
}



//		Structs

//		Config																	
/// The configuration options for the controller.
/// 
/// This can be deserialised, so that it can be loaded alongside the rest of an
/// application's configuration. Everything apart from the endpoint has a
/// default.
/// 
#[expect(clippy::exhaustive_structs, reason = "Provided for configuration")]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Config {
	//		Public properties													
	/// The URL of the version descriptor. This needs to be absolute, including
	/// the scheme, e.g. `https://api.example.com/app/version.json`.
	pub endpoint:                Url,
	
	/// The minimum number of hours between successful fetches, as applied by
	/// [`VersionGate::refresh_if_needed()`]. Defaults to 3.
	#[serde(default = "Config::default_refresh_interval_hours")]
	pub refresh_interval_hours:  u32,
	
	/// Whether to show the loading state when refreshing while a status is
	/// already established. The loading state is always shown before the
	/// first status is known. Defaults to `false`, so that background checks
	/// do not interrupt content that is already showing.
	#[serde(default)]
	pub show_loading_on_refresh: bool,
	
	/// Where to persist the time of the last successful fetch. If not set, the
	/// time is only kept in memory for the lifetime of the process.
	#[serde(default)]
	pub last_fetch_file:         Option<PathBuf>,
	
	/// The number of seconds allowed for fetching the descriptor before giving
	/// up and failing open. Defaults to 60.
	#[serde(default = "Config::default_request_timeout_secs")]
	pub request_timeout_secs:    u64,
}

//󰭅		Config																	
impl Config {
	//		Constants															
	
	/// The default number of hours between successful fetches.
	pub const DEFAULT_REFRESH_INTERVAL_HOURS: u32 = 3;
	
	/// The default number of seconds allowed for fetching the descriptor.
	pub const DEFAULT_REQUEST_TIMEOUT_SECS:   u64 = 60;
	
	//		Constructors														
	
	//		new																	
	/// Creates a new configuration with default options.
	/// 
	/// # Parameters
	/// 
	/// * `endpoint` - The URL of the version descriptor.
	/// 
	#[must_use]
	pub const fn new(endpoint: Url) -> Self {
		Self {
			endpoint,
			refresh_interval_hours:  Self::DEFAULT_REFRESH_INTERVAL_HOURS,
			show_loading_on_refresh: false,
			last_fetch_file:         None,
			request_timeout_secs:    Self::DEFAULT_REQUEST_TIMEOUT_SECS,
		}
	}
	
	//		Public methods														
	
	//		refresh_interval													
	/// The configured refresh interval.
	#[must_use]
	pub const fn refresh_interval(&self) -> RefreshInterval {
		RefreshInterval::from_hours(self.refresh_interval_hours)
	}
	
	//		request_timeout														
	/// The configured time allowed for fetching the descriptor.
	#[must_use]
	pub const fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}
	
	//		Private methods														
	
	//		default_refresh_interval_hours										
	/// The default for [`refresh_interval_hours`](Self::refresh_interval_hours).
	const fn default_refresh_interval_hours() -> u32 {
		Self::DEFAULT_REFRESH_INTERVAL_HOURS
	}
	
	//		default_request_timeout_secs										
	/// The default for [`request_timeout_secs`](Self::request_timeout_secs).
	const fn default_request_timeout_secs() -> u64 {
		Self::DEFAULT_REQUEST_TIMEOUT_SECS
	}
}

//		Collaborators															
/// The collaborators that the controller depends upon.
/// 
/// [`Collaborators::new()`] gives the defaults, and each can be replaced
/// individually.
/// 
#[expect(clippy::exhaustive_structs, reason = "Provided for configuration")]
#[derive(Clone)]
pub struct Collaborators {
	//		Public properties													
	/// Fetches the descriptor. Defaults to [`HttpFetcher`].
	pub fetcher:    Arc<dyn Fetcher>,
	
	/// Derives the status. Defaults to [`OrdinalComparator`].
	pub comparator: Arc<dyn Comparator>,
	
	/// Supplies the version of the running application.
	pub version:    Arc<dyn VersionSource>,
	
	/// Remembers when the last successful fetch happened. Defaults to
	/// [`MemoryLastFetchStore`].
	pub last_fetch: Arc<dyn LastFetchStore>,
	
	/// Supplies the current time. Defaults to [`SystemClock`].
	pub clock:      Arc<dyn Clock>,
	
	/// Receives failures. Defaults to [`TracingErrorSink`].
	pub errors:     Arc<dyn ErrorSink>,
}

//󰭅		Collaborators															
impl Collaborators {
	//		Constructors														
	
	//		new																	
	/// Creates the default set of collaborators.
	/// 
	/// # Parameters
	/// 
	/// * `version` - Supplies the version of the running application.
	/// 
	#[must_use]
	pub fn new<V: VersionSource + 'static>(version: V) -> Self {
		Self {
			fetcher:    Arc::new(HttpFetcher::new()),
			comparator: Arc::new(OrdinalComparator),
			version:    Arc::new(version),
			last_fetch: Arc::new(MemoryLastFetchStore::default()),
			clock:      Arc::new(SystemClock),
			errors:     Arc::new(TracingErrorSink),
		}
	}
	
	//		for_config															
	/// Creates the default set of collaborators for a configuration.
	/// 
	/// This differs from [`new()`](Self::new()) in that the fetcher applies
	/// [`Config::request_timeout_secs`], and the last fetch time is persisted
	/// to [`Config::last_fetch_file`] if that is set.
	/// 
	#[must_use]
	pub fn for_config<V: VersionSource + 'static>(config: &Config, version: V) -> Self {
		let parts = Self::new(version)
			.with_fetcher(Arc::new(HttpFetcher::with_timeout(config.request_timeout())))
		;
		match config.last_fetch_file {
			Some(ref path) => parts.with_last_fetch(Arc::new(FileLastFetchStore::new(path.clone()))),
			None           => parts,
		}
	}
	
	//		Public methods														
	
	//		with_fetcher														
	/// Replaces the fetcher.
	#[must_use]
	pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
		self.fetcher = fetcher;
		self
	}
	
	//		with_comparator														
	/// Replaces the comparator.
	#[must_use]
	pub fn with_comparator(mut self, comparator: Arc<dyn Comparator>) -> Self {
		self.comparator = comparator;
		self
	}
	
	//		with_last_fetch														
	/// Replaces the last fetch store.
	#[must_use]
	pub fn with_last_fetch(mut self, last_fetch: Arc<dyn LastFetchStore>) -> Self {
		self.last_fetch = last_fetch;
		self
	}
	
	//		with_clock															
	/// Replaces the clock.
	#[must_use]
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}
	
	//		with_errors															
	/// Replaces the error sink.
	#[must_use]
	pub fn with_errors(mut self, errors: Arc<dyn ErrorSink>) -> Self {
		self.errors = errors;
		self
	}
}

//󰭅		Debug																	
impl Debug for Collaborators {
	//		fmt																	
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Collaborators").finish_non_exhaustive()
	}
}

//		RefreshState															
/// The observable state of the controller.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct RefreshState {
	//		Public properties													
	/// The last descriptor successfully fetched, if any.
	pub descriptor: Option<VersionDescriptor>,
	
	/// The current status. This is [`None`] until the first refresh has
	/// completed, which is distinct from [`GateStatus::UpToDate`].
	pub status:     Option<GateStatus>,
	
	/// Whether a loading state should be shown.
	pub is_loading: bool,
}

//		VersionGate																
/// Decides whether the running application may be used, based on the version
/// information published by a remote endpoint.
/// 
/// All state changes are made in short synchronous steps, and never across an
/// await point, so the controller can be shared freely between tasks. State
/// changes can be observed using [`subscribe()`](Self::subscribe()).
/// 
pub struct VersionGate {
	//		Private properties													
	/// The configuration for the controller.
	config:   Config,
	
	/// The interval applied by [`refresh_if_needed()`](Self::refresh_if_needed()).
	interval: RefreshInterval,
	
	/// The collaborators that the controller depends upon.
	parts:    Collaborators,
	
	/// The observable state, which also serves as its storage.
	state:    watch::Sender<RefreshState>,
	
	/// The refresh operation currently in flight, if any.
	flight:   SingleFlight<GateStatus>,
}

//󰭅		VersionGate																
impl VersionGate {
	//		Constructors														
	
	//		new																	
	/// Creates a new controller with the default collaborators.
	/// 
	/// No check is made until [`refresh()`](Self::refresh()) or
	/// [`refresh_if_needed()`](Self::refresh_if_needed()) is called.
	/// 
	/// # Parameters
	/// 
	/// * `config`  - The configuration for the controller.
	/// * `version` - Supplies the version of the running application.
	/// 
	#[must_use]
	pub fn new<V: VersionSource + 'static>(config: Config, version: V) -> Arc<Self> {
		let parts = Collaborators::for_config(&config, version);
		Self::with_collaborators(config, parts)
	}
	
	//		with_collaborators													
	/// Creates a new controller with the given collaborators.
	/// 
	/// # Parameters
	/// 
	/// * `config` - The configuration for the controller.
	/// * `parts`  - The collaborators to use.
	/// 
	#[must_use]
	pub fn with_collaborators(config: Config, parts: Collaborators) -> Arc<Self> {
		Arc::new(Self {
			interval: config.refresh_interval(),
			config,
			parts,
			state:    watch::Sender::new(RefreshState::default()),
			flight:   SingleFlight::new(),
		})
	}
	
	//		Public methods														
	
	//		endpoint															
	/// The URL of the version descriptor.
	#[must_use]
	pub const fn endpoint(&self) -> &Url {
		&self.config.endpoint
	}
	
	//		status																
	/// The current status, or [`None`] if no refresh has completed yet.
	#[must_use]
	pub fn status(&self) -> Option<GateStatus> {
		self.state.borrow().status.clone()
	}
	
	//		descriptor															
	/// The last descriptor successfully fetched, if any.
	#[must_use]
	pub fn descriptor(&self) -> Option<VersionDescriptor> {
		self.state.borrow().descriptor.clone()
	}
	
	//		is_loading															
	/// Whether a loading state should be shown.
	#[must_use]
	pub fn is_loading(&self) -> bool {
		self.state.borrow().is_loading
	}
	
	//		is_refreshing														
	/// Whether a refresh is currently in flight.
	/// 
	/// Unlike [`is_loading()`](Self::is_loading()), this is true for background
	/// refreshes as well.
	/// 
	#[must_use]
	pub fn is_refreshing(&self) -> bool {
		self.flight.has_in_flight()
	}
	
	//		state																
	/// A snapshot of all of the observable state at once.
	#[must_use]
	pub fn state(&self) -> RefreshState {
		self.state.borrow().clone()
	}
	
	//		subscribe															
	/// Subscribes to changes of the observable state.
	#[must_use]
	pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
		self.state.subscribe()
	}
	
	//		refresh																
	/// Checks the endpoint and updates the status.
	/// 
	/// This should be called when the application launches. If a refresh is
	/// already in flight, this waits for that one rather than starting another,
	/// so concurrent callers all share a single fetch and observe the same
	/// status, which is returned.
	/// 
	/// Failures are never returned. The status becomes
	/// [`GateStatus::UpToDate`] instead.
	/// 
	pub async fn refresh(self: &Arc<Self>) -> GateStatus {
		match self.start_refresh().await {
			Ok(status) => status,
			Err(err)   => self.fail_open(&RefreshError::Flight(err)),
		}
	}
	
	//		spawn_refresh														
	/// Starts a refresh without waiting for it.
	/// 
	/// This behaves exactly like [`refresh()`](Self::refresh()), including the
	/// sharing of in-flight work, but returns the handle rather than awaiting
	/// it. It is intended for triggering a refresh from synchronous code. The
	/// refresh runs to completion whether or not the handle is awaited.
	/// 
	pub fn spawn_refresh(self: &Arc<Self>) -> Flight<GateStatus> {
		self.start_refresh()
	}
	
	//		refresh_if_needed													
	/// Refreshes only if the refresh interval has elapsed.
	/// 
	/// This should be called whenever the application returns to the
	/// foreground. The interval is measured from the last successful fetch, so
	/// after a failure the next call refreshes again. Returns the resulting
	/// status if a refresh happened, or [`None`] if it was not yet due.
	/// 
	pub async fn refresh_if_needed(self: &Arc<Self>) -> Option<GateStatus> {
		let last_fetch = self.parts.last_fetch.get().await;
		if !self.interval.is_due(self.parts.clock.now(), last_fetch) {
			debug!("Version gate refresh not yet due");
			return None;
		}
		Some(self.refresh().await)
	}
	
	//		dismiss_recommendation												
	/// Dismisses a recommended update for the rest of the session.
	/// 
	/// This changes [`GateStatus::RecommendedUpdate`] to
	/// [`GateStatus::UpToDate`] without contacting the endpoint, and returns
	/// `true`. Any other status is left alone, and `false` is returned, as
	/// required updates and end-of-life cannot be dismissed.
	/// 
	pub fn dismiss_recommendation(&self) -> bool {
		let dismissed = self.state.send_if_modified(|state| {
			if !matches!(state.status, Some(GateStatus::RecommendedUpdate(_))) {
				return false;
			}
			state.status = Some(GateStatus::UpToDate);
			true
		});
		if dismissed {
			info!("Recommended update dismissed");
		}
		dismissed
	}
	
	//		Private methods														
	
	//		start_refresh														
	/// Starts a refresh, or joins the one already in flight.
	/// 
	/// The loading state is only set by the caller that actually starts new
	/// work, and only if no status is established yet or the configuration
	/// asks for loading to be shown on every refresh.
	/// 
	fn start_refresh(self: &Arc<Self>) -> Flight<GateStatus> {
		self.flight.run_or_join(|| {
			let show_loading = self.config.show_loading_on_refresh;
			let loading      = self.state.send_if_modified(|state| {
				if state.is_loading || (state.status.is_some() && !show_loading) {
					return false;
				}
				state.is_loading = true;
				true
			});
			if loading {
				debug!("Showing loading state");
			}
			let guard = LoadingGuard { gate: Arc::clone(self) };
			async move {
				let status = guard.gate.perform_refresh().await;
				drop(guard);
				status
			}
		})
	}
	
	//		perform_refresh														
	/// Fetches the descriptor and derives the status.
	/// 
	/// On success the descriptor and status are stored, and the time of the
	/// fetch is recorded. On failure nothing is stored apart from the status,
	/// which fails open. The loading state is cleared by the [`LoadingGuard`]
	/// that accompanies the refresh.
	/// 
	async fn perform_refresh(&self) -> GateStatus {
		let endpoint = &self.config.endpoint;
		info!("Checking version gate at {endpoint}");
		//		Fetch descriptor												
		let descriptor = match self.parts.fetcher.fetch(endpoint).await {
			Ok(descriptor) => descriptor,
			Err(err)       => return self.fail_open(&RefreshError::Fetch(err)),
		};
		//		Derive status													
		let local_version = self.parts.version.current_version();
		let status        = self.parts.comparator.derive_status(&descriptor, &local_version);
		info!("Version {local_version} is {status}");
		//		Store outcome													
		self.state.send_modify(|state| {
			state.descriptor = Some(descriptor);
			state.status     = Some(status.clone());
		});
		self.parts.last_fetch.set(self.parts.clock.now()).await;
		status
	}
	
	//		fail_open															
	/// Reports a failure and sets the status to [`GateStatus::UpToDate`].
	fn fail_open(&self, error: &RefreshError) -> GateStatus {
		self.parts.errors.report(error);
		warn!("Version gate failing open");
		self.state.send_modify(|state| state.status = Some(GateStatus::UpToDate));
		GateStatus::UpToDate
	}
}

//󰭅		Debug																	
impl Debug for VersionGate {
	//		fmt																	
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state();
		f.debug_struct("VersionGate")
			.field("config", &self.config)
			.field("state",  &state)
			.field("flight", &self.flight)
			.finish_non_exhaustive()
	}
}

//		LoadingGuard															
/// Clears the loading state when dropped, however the refresh finishes.
/// 
/// This is created alongside the refresh task, rather than inside it, so that
/// the loading state is also cleared if the task is dropped before it ever
/// runs, e.g. when the runtime shuts down.
/// 
struct LoadingGuard {
	//		Private properties													
	/// The controller to clear the loading flag in.
	gate: Arc<VersionGate>,
}

//󰭅		Drop																	
impl Drop for LoadingGuard {
	//		drop																
	fn drop(&mut self) {
		let cleared = self.gate.state.send_if_modified(|state| {
			let was_loading  = state.is_loading;
			state.is_loading = false;
			was_loading
		});
		if cleared {
			debug!("Cleared loading state");
		}
	}
}
