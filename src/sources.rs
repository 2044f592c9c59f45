//! This module provides the collaborators that the controller depends upon.
//! 
//! Each collaborator is a narrow trait, with a default implementation that is
//! suitable for most applications:
//! 
//!   - [`VersionSource`] supplies the version of the running application.
//!   - [`Clock`] supplies the current time.
//!   - [`LastFetchStore`] remembers when the last successful fetch happened.
//!   - [`ErrorSink`] receives failures for diagnostic purposes.
//! 

//		Modules

#[cfg(test)]
#[path = "tests/sources.rs"]
mod tests;



//		Packages

use crate::controller::RefreshError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use parking_lot::Mutex;
use rubedo::sugar::s;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::{
	io::ErrorKind as IoErrorKind,
	path::PathBuf,
};
use tokio::fs;
use tracing::{debug, error, warn};



//		Structs

//		BuildInfo																
/// A version source based on build metadata.
/// 
/// The marketing version (e.g. `1.2.3`) is preferred when it is present and
/// not blank. Failing that, the build number (e.g. `123`) is used under the
/// same rule, and failing that, the fallback.
/// 
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildInfo {
	//		Private properties													
	/// The marketing version.
	short:    Option<String>,
	
	/// The build number.
	build:    Option<String>,
	
	/// Used when neither the marketing version nor the build number is
	/// usable.
	fallback: String,
}

//󰭅		BuildInfo																
impl BuildInfo {
	//		Constructors														
	
	//		new																	
	/// Creates a new version source, with a fallback of `0.0.0`.
	/// 
	/// # Parameters
	/// 
	/// * `short` - The marketing version, e.g. `Some(env!("CARGO_PKG_VERSION"))`.
	/// * `build` - The build number.
	/// 
	#[must_use]
	pub fn new(short: Option<&str>, build: Option<&str>) -> Self {
		Self {
			short:    short.map(ToOwned::to_owned),
			build:    build.map(ToOwned::to_owned),
			fallback: s!("0.0.0"),
		}
	}
	
	//		with_fallback														
	/// Replaces the fallback version.
	#[must_use]
	pub fn with_fallback(mut self, fallback: &str) -> Self {
		fallback.clone_into(&mut self.fallback);
		self
	}
}

//󰭅		VersionSource															
impl VersionSource for BuildInfo {
	//		current_version														
	fn current_version(&self) -> String {
		[self.short.as_ref(), self.build.as_ref()]
			.into_iter()
			.flatten()
			.find(|version| !version.trim().is_empty())
			.unwrap_or(&self.fallback)
			.clone()
	}
}

//		SystemClock																
/// A clock that reports the system time.
#[expect(clippy::exhaustive_structs, reason = "Unit struct")]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SystemClock;

//󰭅		Clock																	
impl Clock for SystemClock {
	//		now																	
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

//		MemoryLastFetchStore													
/// Keeps the last fetch time in memory, for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryLastFetchStore {
	//		Private properties													
	/// The stored time, if any.
	value: Mutex<Option<DateTime<Utc>>>,
}

//󰭅		MemoryLastFetchStore													
impl MemoryLastFetchStore {
	//		new																	
	/// Creates a new store, optionally with an initial value.
	#[must_use]
	pub const fn new(initial: Option<DateTime<Utc>>) -> Self {
		Self { value: Mutex::new(initial) }
	}
}

//󰭅		LastFetchStore															
#[async_trait]
impl LastFetchStore for MemoryLastFetchStore {
	//		get																	
	async fn get(&self) -> Option<DateTime<Utc>> {
		*self.value.lock()
	}
	
	//		set																	
	async fn set(&self, at: DateTime<Utc>) {
		*self.value.lock() = Some(at);
	}
}

//		FileLastFetchStore														
/// Persists the last fetch time to a JSON file.
/// 
/// The file holds a JSON object, and the time is stored under a configurable
/// key as an RFC 3339 string. Any other keys in the file are left alone, so
/// the file can be shared with other small pieces of application state.
/// 
/// A missing, unreadable or malformed file reads as "never fetched", which
/// causes the next check to go ahead. Failure to write is logged and otherwise
/// ignored.
/// 
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileLastFetchStore {
	//		Private properties													
	/// The key under which the time is stored.
	key:  String,
	
	/// The path to the JSON file.
	path: PathBuf,
}

//󰭅		FileLastFetchStore														
impl FileLastFetchStore {
	//		Constants															
	
	/// The key used unless another is specified.
	pub const DEFAULT_KEY: &'static str = "VersionGate.lastFetchDate";
	
	//		Constructors														
	
	//		new																	
	/// Creates a new store backed by the given file.
	/// 
	/// The file does not need to exist yet. It is created, along with any
	/// missing parent directories, the first time a value is stored.
	/// 
	#[must_use]
	pub fn new<P: Into<PathBuf>>(path: P) -> Self {
		Self {
			key:  Self::DEFAULT_KEY.to_owned(),
			path: path.into(),
		}
	}
	
	//		with_key															
	/// Replaces the key under which the time is stored.
	#[must_use]
	pub fn with_key(mut self, key: &str) -> Self {
		key.clone_into(&mut self.key);
		self
	}
	
	//		Private methods														
	
	//		read_document														
	/// Reads the JSON object from the file.
	/// 
	/// Returns [`None`] if the file does not exist, cannot be read, or does not
	/// contain a JSON object.
	/// 
	async fn read_document(&self) -> Option<JsonMap<String, JsonValue>> {
		let contents = match fs::read_to_string(&self.path).await {
			Ok(contents)                                     => contents,
			Err(err) if err.kind() == IoErrorKind::NotFound => return None,
			Err(err)                                         => {
				warn!("Unable to read last fetch file {:?}: {err}", self.path);
				return None;
			},
		};
		match serde_json::from_str::<JsonValue>(&contents) {
			Ok(JsonValue::Object(document)) => Some(document),
			Ok(_) | Err(_)                  => {
				warn!("Ignoring malformed last fetch file {:?}", self.path);
				None
			},
		}
	}
}

//󰭅		LastFetchStore															
#[async_trait]
impl LastFetchStore for FileLastFetchStore {
	//		get																	
	async fn get(&self) -> Option<DateTime<Utc>> {
		let value = self.read_document().await?.remove(&self.key)?;
		serde_json::from_value::<DateTime<Utc>>(value).map_err(|err|
			debug!("Ignoring unparseable last fetch time in {:?}: {err}", self.path)
		).ok()
	}
	
	//		set																	
	async fn set(&self, at: DateTime<Utc>) {
		let mut document = self.read_document().await.unwrap_or_default();
		drop(document.insert(self.key.clone(), JsonValue::String(at.to_rfc3339())));
		if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
			if let Err(err) = fs::create_dir_all(parent).await {
				warn!("Unable to create directory for last fetch file {:?}: {err}", self.path);
				return;
			}
		}
		let contents = match serde_json::to_string_pretty(&JsonValue::Object(document)) {
			Ok(contents) => contents,
			Err(err)     => {
				warn!("Unable to encode last fetch file {:?}: {err}", self.path);
				return;
			},
		};
		if let Err(err) = fs::write(&self.path, contents).await {
			warn!("Unable to write last fetch file {:?}: {err}", self.path);
		}
	}
}

//		TracingErrorSink														
/// Reports failures through [`tracing`] at error level.
#[expect(clippy::exhaustive_structs, reason = "Unit struct")]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TracingErrorSink;

//󰭅		ErrorSink																
impl ErrorSink for TracingErrorSink {
	//		report																
	fn report(&self, error: &RefreshError) {
		error!("Version gate refresh failed: {error}");
	}
}



//		Traits

//§		VersionSource															
/// Supplies the version of the running application.
/// 
/// The only requirement on the format is that versions compare correctly as
/// plain strings.
/// 
#[cfg_attr(test, automock)]
pub trait VersionSource: Send + Sync {
	//		current_version														
	/// The version of the running application.
	fn current_version(&self) -> String;
}

//󰭅		VersionSource															
impl VersionSource for String {
	//		current_version														
	fn current_version(&self) -> String {
		self.clone()
	}
}

//󰭅		VersionSource															
impl VersionSource for &'static str {
	//		current_version														
	fn current_version(&self) -> String {
		(*self).to_owned()
	}
}

//󰭅		VersionSource															
impl<V: VersionSource + ?Sized> VersionSource for Box<V> {
	//		current_version														
	fn current_version(&self) -> String {
		(**self).current_version()
	}
}

//§		Clock																	
/// Supplies the current time.
/// 
/// Any `Fn() -> DateTime<Utc>` closure can be used as a clock, which is
/// convenient for tests.
/// 
pub trait Clock: Send + Sync {
	//		now																	
	/// The current time.
	fn now(&self) -> DateTime<Utc>;
}

//󰭅		Clock																	
impl<F> Clock for F
where
	F: Fn() -> DateTime<Utc> + Send + Sync,
{
	//		now																	
	fn now(&self) -> DateTime<Utc> {
		self()
	}
}

//§		LastFetchStore															
/// Remembers when the last successful fetch happened.
/// 
/// Values may have been written externally, and so may be in the future.
/// Implementations that touch storage should do so without blocking the
/// runtime, as both methods are called from within refreshes.
/// 
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LastFetchStore: Send + Sync {
	//		get																	
	/// The time of the last successful fetch, if one has been recorded.
	async fn get(&self) -> Option<DateTime<Utc>>;
	
	//		set																	
	/// Records the time of a successful fetch.
	async fn set(&self, at: DateTime<Utc>);
}

//§		ErrorSink																
/// Receives failures for diagnostic purposes.
/// 
/// Implementations must not panic or block, as they are called on the path
/// that keeps the application usable after a failure.
/// 
#[cfg_attr(test, automock)]
pub trait ErrorSink: Send + Sync {
	//		report																
	/// Reports a failure.
	fn report(&self, error: &RefreshError);
}
