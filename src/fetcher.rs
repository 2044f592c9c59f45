//! This module provides retrieval of the version descriptor from the endpoint.
//! 
//! The [`Fetcher`] trait is the seam that the controller depends upon. The
//! [`HttpFetcher`] implements it over HTTP using [Reqwest](https://crates.io/crates/reqwest),
//! and any other transport can be substituted by implementing the trait.
//! 

//		Modules

#[cfg(test)]
#[path = "tests/fetcher.rs"]
mod tests;



//		Packages

use crate::status::VersionDescriptor;
use async_trait::async_trait;
use core::time::Duration;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;



//		Enums

//		FetchErrorKind															
/// The broad classes of fetch failure.
#[expect(clippy::exhaustive_enums, reason = "The taxonomy is closed")]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FetchErrorKind {
	/// The endpoint could not be reached, or the request timed out.
	Transport,
	
	/// The endpoint responded with a non-success status code.
	BadStatus,
	
	/// The response could not be decoded into a descriptor.
	Decode,
}

//		FetchError																
/// Errors that can occur when fetching the version descriptor.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum FetchError {
	/// An HTTP error occurred, i.e. the status code returned is not a success
	/// code.
	#[error("HTTP status code {1} received when calling {0}")]
	HttpError(Url, StatusCode),
	
	/// The HTTP request to the endpoint failed, e.g. due to the network being
	/// unreachable, or a timeout.
	#[error("HTTP request to {0} failed: {1}")]
	HttpRequestFailed(Url, String),
	
	/// The response body could not be read, e.g. because it was truncated or
	/// is not valid UTF-8.
	#[error("Invalid HTTP body received from {0}")]
	InvalidBody(Url),
	
	/// The response body could not be parsed as a descriptor. This covers
	/// malformed JSON, missing keys, wrong types, and an `update_url` that is
	/// not an absolute URL.
	#[error("Invalid payload received from {0}: {1}")]
	InvalidPayload(Url, String),
}

//󰭅		FetchError																
impl FetchError {
	//		kind																
	/// The class of failure.
	#[must_use]
	pub const fn kind(&self) -> FetchErrorKind {
		match *self {
			Self::HttpRequestFailed(..) => FetchErrorKind::Transport,
			Self::HttpError(..)         => FetchErrorKind::BadStatus,
			Self::InvalidBody(_)        |
			Self::InvalidPayload(..)    => FetchErrorKind::Decode,
		}
	}
	
	//		status_code															
	/// The numeric HTTP status code, for [`FetchError::HttpError`] only.
	#[must_use]
	pub fn status_code(&self) -> Option<u16> {
		match *self {
			Self::HttpError(_, status)  => Some(status.as_u16()),
			Self::HttpRequestFailed(..) |
			Self::InvalidBody(_)        |
			Self::InvalidPayload(..)    => None,
		}
	}
	
	//		url																	
	/// The URL that was being fetched.
	#[must_use]
	pub const fn url(&self) -> &Url {
		match *self {
			Self::HttpError(ref url, _)         |
			Self::HttpRequestFailed(ref url, _) |
			Self::InvalidBody(ref url)          |
			Self::InvalidPayload(ref url, _)    => url,
		}
	}
}



//		Structs

//		HttpFetcher																
/// Fetches the version descriptor over HTTP.
/// 
/// The default client gives up on a request after
/// [`DEFAULT_TIMEOUT`](Self::DEFAULT_TIMEOUT), so that a stalled endpoint ends
/// in a failure rather than an endless wait. Proxies, TLS configuration and
/// the like are the responsibility of the [`Client`], which can be supplied
/// using [`with_client()`](Self::with_client()).
/// 
#[derive(Clone, Debug)]
pub struct HttpFetcher {
	//		Private properties													
	/// The HTTP client used to make requests.
	client: Client,
}

//󰭅		HttpFetcher																
impl HttpFetcher {
	//		Constants															
	
	/// The time allowed for a whole request, unless another is specified.
	pub const DEFAULT_TIMEOUT:         Duration = Duration::from_secs(60);
	
	/// The time allowed for establishing a connection. This is capped by the
	/// overall timeout.
	pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
	
	//		Constructors														
	
	//		new																	
	/// Creates a new fetcher with the default timeout.
	#[must_use]
	pub fn new() -> Self {
		Self::with_timeout(Self::DEFAULT_TIMEOUT)
	}
	
	//		with_timeout														
	/// Creates a new fetcher that gives up on a request after the given time.
	/// 
	/// # Parameters
	/// 
	/// * `timeout` - The time allowed for a whole request, including reading
	///               the response body.
	/// 
	#[must_use]
	pub fn with_timeout(timeout: Duration) -> Self {
		let client = Client::builder()
			.timeout(timeout)
			.connect_timeout(Self::DEFAULT_CONNECT_TIMEOUT.min(timeout))
			.build()
			.unwrap_or_else(|err| {
				warn!("Unable to configure HTTP client, using defaults: {err}");
				Client::new()
			})
		;
		Self { client }
	}
	
	//		with_client															
	/// Creates a new fetcher using the supplied HTTP client.
	#[must_use]
	pub const fn with_client(client: Client) -> Self {
		Self { client }
	}
}

//󰭅		Default																	
impl Default for HttpFetcher {
	//		default																
	fn default() -> Self {
		Self::new()
	}
}

//󰭅		Fetcher																	
#[async_trait]
impl Fetcher for HttpFetcher {
	//		fetch																
	async fn fetch(&self, url: &Url) -> Result<VersionDescriptor, FetchError> {
		//		Perform request													
		debug!("Requesting version descriptor from {url}");
		let response = self.client.get(url.clone()).send().await.map_err(|err|
			FetchError::HttpRequestFailed(url.clone(), err.to_string())
		)?;
		//		Check status													
		let status = response.status();
		if !status.is_success() {
			return Err(FetchError::HttpError(url.clone(), status));
		}
		//		Decode payload													
		let Ok(body) = response.text().await else {
			return Err(FetchError::InvalidBody(url.clone()));
		};
		serde_json::from_str::<VersionDescriptor>(&body).map_err(|err|
			FetchError::InvalidPayload(url.clone(), err.to_string())
		)
	}
}



//		Traits

//§		Fetcher																	
/// Retrieves the version descriptor from an endpoint.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
	//		fetch																
	/// Fetches the descriptor from the given URL.
	/// 
	/// # Parameters
	/// 
	/// * `url` - The endpoint to fetch from.
	/// 
	/// # Errors
	/// 
	/// * [`FetchError::HttpError`]
	/// * [`FetchError::HttpRequestFailed`]
	/// * [`FetchError::InvalidBody`]
	/// * [`FetchError::InvalidPayload`]
	/// 
	async fn fetch(&self, url: &Url) -> Result<VersionDescriptor, FetchError>;
}
