//! Checks the running version against a published version descriptor, the way
//! an application would on launch and on returning to the foreground.

//		Packages

use figment::{
	Figment,
	providers::{Env, Format as _, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::{
	io::stdout,
	path::PathBuf,
};
use tracing::{Level, info, warn};
use tracing_subscriber::{
	EnvFilter,
	fmt::{format::FmtSpan, layer, writer::MakeWriterExt as _},
	layer::SubscriberExt as _,
	registry,
	util::SubscriberInitExt as _,
};
use version_gate::{
	controller::{Config as GateConfig, VersionGate},
	sources::BuildInfo,
	status::GateStatus,
};



//		Structs

//		Config																	
/// The main configuration options for the application.
#[derive(Deserialize, Serialize, SmartDefault)]
pub struct Config {
	//		Public properties													
	/// The name of the application.
	#[default = "example"]
	pub appname:                 String,
	
	/// The marketing version of the running application.
	#[default = "1.0.0"]
	pub version:                 String,
	
	/// The build number of the running application.
	pub build:                   Option<String>,
	
	/// The full location of the version descriptor, including the scheme.
	#[default = "http://127.0.0.1:8000/app/lockout.json"]
	pub endpoint:                String,
	
	/// The minimum number of hours between checks on returning to the
	/// foreground.
	#[default = 3]
	pub refresh_interval_hours:  u32,
	
	/// Whether to show loading on every refresh.
	pub show_loading_on_refresh: bool,
	
	/// Where to remember when the last check happened.
	pub last_fetch_file:         Option<PathBuf>,
	
	/// How many seconds to wait for the endpoint before giving up.
	#[default = 60]
	pub request_timeout_secs:    u64,
}



//		Functions

//		main																	
#[tokio::main]
async fn main() {
	registry()
		.with(
			EnvFilter::new("info,version_gate=debug,reqwest=info")
		)
		.with(
			layer()
				.with_writer(stdout.with_max_level(Level::DEBUG))
				.with_span_events(FmtSpan::NONE)
				.with_target(false)
		)
		.init()
	;
	let config: Config = Figment::from(Serialized::defaults(Config::default()))
		.merge(Toml::file("check-version.toml"))
		.merge(Env::prefixed("CHECK_VERSION_"))
		.extract()
		.expect("Error loading config")
	;
	let gate = VersionGate::new(
		GateConfig {
			endpoint:                config.endpoint.parse().expect("Invalid endpoint URL"),
			refresh_interval_hours:  config.refresh_interval_hours,
			show_loading_on_refresh: config.show_loading_on_refresh,
			last_fetch_file:         config.last_fetch_file.clone(),
			request_timeout_secs:    config.request_timeout_secs,
		},
		BuildInfo::new(Some(&config.version), config.build.as_deref()),
	);
	info!("{} v{} started", config.appname, config.version);
	//	On launch
	let status = gate.refresh().await;
	report(&status);
	if matches!(status, GateStatus::RecommendedUpdate(_)) && gate.dismiss_recommendation() {
		info!("Recommendation dismissed for this session");
	}
	//	On returning to the foreground
	match gate.refresh_if_needed().await {
		Some(status) => report(&status),
		None         => info!("Skipped check, as one was made recently"),
	}
	info!("Application stopped");
}

//		report																	
/// Describes the outcome of a check.
fn report(status: &GateStatus) {
	match *status {
		GateStatus::UpToDate                   => info!("The application is up to date"),
		GateStatus::RecommendedUpdate(ref url) => info!("An update is available from {url}"),
		GateStatus::RequiredUpdate(ref url)    => warn!("An update is required before continuing: {url}"),
		GateStatus::EndOfLife(ref message)     => warn!("The application has reached end-of-life: {}", message.as_deref().unwrap_or("no further details")),
	}
}
