//! Common shared endpoint functionality for tests.

//		Packages

use core::time::Duration;
use serde_json::{Value as JsonValue, json};
use std::sync::Once;
use tracing_subscriber::{
	EnvFilter,
	fmt::{format::FmtSpan, layer},
	layer::SubscriberExt as _,
	registry,
	util::SubscriberInitExt as _,
};
use url::Url;
use wiremock::{
	Mock,
	MockServer,
	ResponseTemplate,
	matchers::{method, path},
};



//		Constants

/// The path at which the version descriptor is published.
pub(crate) const DESCRIPTOR_PATH: &str = "/app/lockout.json";

/// The update URL contained in every published descriptor.
pub(crate) const UPDATE_URL:      &str = "https://example.com/update";



//		Statics

/// Guards the one-off test setup.
pub(crate) static INIT: Once = Once::new();



//		Functions

//		initialize																
/// Sets up logging, once per test binary.
pub(crate) fn initialize() {
	INIT.call_once(|| {
		registry()
			.with(
				EnvFilter::new("version_gate=debug,reqwest=info")
			)
			.with(
				layer()
					.with_test_writer()
					.with_span_events(FmtSpan::NONE)
					.with_target(false)
			)
			.init()
		;
	});
}

//		payload																	
/// Builds a version descriptor as the endpoint would publish it.
pub(crate) fn payload(required: &str, recommended: &str, eol: bool) -> JsonValue {
	json!({
		"recommended_version": recommended,
		"required_version":    required,
		"update_url":          UPDATE_URL,
		"eol":                 eol,
		"message":             "Please update",
	})
}

//		update_url																
/// The update URL contained in every published descriptor.
pub(crate) fn update_url() -> Url {
	UPDATE_URL.parse().unwrap()
}

//		descriptor_url															
/// The URL of the descriptor on the given server.
pub(crate) fn descriptor_url(server: &MockServer) -> Url {
	format!("{}{DESCRIPTOR_PATH}", server.uri()).parse().unwrap()
}

//		create_server															
/// Starts an endpoint that publishes the given response.
/// 
/// The server verifies, when dropped, that it was called exactly the expected
/// number of times.
/// 
pub(crate) async fn create_server(response: ResponseTemplate, expected_calls: u64) -> (MockServer, Url) {
	initialize();
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(DESCRIPTOR_PATH))
		.respond_with(response)
		.expect(expected_calls)
		.mount(&server)
		.await
	;
	let url    = descriptor_url(&server);
	(server, url)
}

//		create_flaky_server														
/// Starts an endpoint that publishes a descriptor once, and then fails.
pub(crate) async fn create_flaky_server(first: JsonValue, failure_status: u16) -> (MockServer, Url) {
	initialize();
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path(DESCRIPTOR_PATH))
		.respond_with(ResponseTemplate::new(200).set_body_json(first))
		.up_to_n_times(1)
		.expect(1)
		.mount(&server)
		.await
	;
	Mock::given(method("GET"))
		.and(path(DESCRIPTOR_PATH))
		.respond_with(ResponseTemplate::new(failure_status))
		.mount(&server)
		.await
	;
	let url    = descriptor_url(&server);
	(server, url)
}

//		slow																	
/// A successful response that takes a while to arrive.
pub(crate) fn slow(body: JsonValue, delay: Duration) -> ResponseTemplate {
	ResponseTemplate::new(200).set_body_json(body).set_delay(delay)
}
