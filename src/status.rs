//! This module provides the version descriptor and the status derived from it.
//! 
//! The remote endpoint describes which versions of the application are still
//! acceptable by way of a [`VersionDescriptor`]. Comparing that against the
//! version of the running application produces a [`GateStatus`], which is what
//! the UI layer acts upon.
//! 
//! Version strings are compared ordinally, exactly as given, with no semantic
//! version parsing. This means that `"10.0.0"` is considered lower than
//! `"9.0.0"`, and so endpoints should publish versions that sort correctly as
//! plain strings, such as zero-padded or date-based versions.
//! 

//		Modules

#[cfg(test)]
#[path = "tests/status.rs"]
mod tests;



//		Packages

use core::fmt::{Display, self};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use url::Url;



//		Enums

//		GateStatus																
/// The update posture of the running application.
/// 
/// There are exactly four states. Which one applies is decided by
/// [`derive_status()`], and the absence of a status (i.e. [`None`] in the
/// controller state) means that no check has completed yet.
/// 
#[expect(clippy::exhaustive_enums, reason = "The set of states is closed")]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GateStatus {
	/// The application does not need updating.
	UpToDate,
	
	/// A newer version is available and recommended. The user may dismiss
	/// this for the current session.
	RecommendedUpdate(Url),
	
	/// The running version is below the minimum accepted version, and the
	/// application must be updated before it can be used.
	RequiredUpdate(Url),
	
	/// The application has reached end-of-life, with an optional message to
	/// show to the user.
	EndOfLife(Option<String>),
}

//󰭅		GateStatus																
impl GateStatus {
	//		update_url															
	/// The URL to send the user to, if the status asks for an update.
	#[must_use]
	pub const fn update_url(&self) -> Option<&Url> {
		match *self {
			Self::RecommendedUpdate(ref url) |
			Self::RequiredUpdate(ref url)    => Some(url),
			Self::UpToDate                   |
			Self::EndOfLife(_)               => None,
		}
	}
	
	//		is_blocking															
	/// Whether the status prevents normal use of the application.
	/// 
	/// Required updates and end-of-life both block usage. A recommended update
	/// does not, as it can be dismissed.
	/// 
	#[must_use]
	pub const fn is_blocking(&self) -> bool {
		matches!(*self, Self::RequiredUpdate(_) | Self::EndOfLife(_))
	}
}

//󰭅		Display																	
impl Display for GateStatus {
	//		fmt																	
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match *self {
			Self::UpToDate                   => write!(f, "up to date"),
			Self::RecommendedUpdate(ref url) => write!(f, "update recommended via {url}"),
			Self::RequiredUpdate(ref url)    => write!(f, "update required via {url}"),
			Self::EndOfLife(Some(ref msg))   => write!(f, "end of life: {msg}"),
			Self::EndOfLife(None)            => write!(f, "end of life"),
		}
	}
}



//		Structs

//		VersionDescriptor														
/// The version information published by the remote endpoint.
/// 
/// On the wire this is a JSON object with snake_case keys:
/// 
/// ```json
/// {
///   "recommended_version": "3.0.0",
///   "required_version":    "2.0.0",
///   "update_url":          "https://example.com/update",
///   "eol":                 false,
///   "message":             null
/// }
/// ```
/// 
/// The `update_url` must be an absolute URL with a scheme, otherwise
/// deserialisation fails. The `message` may be absent or `null`, both of which
/// mean that there is no message. A descriptor cannot be changed once it has
/// been constructed.
/// 
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct VersionDescriptor {
	//		Private properties													
	/// The lowest version that is considered up to date.
	recommended_version: String,
	
	/// The lowest version that is still allowed to run.
	required_version:    String,
	
	/// Where the user can obtain an update.
	update_url:          Url,
	
	/// Whether the application has reached end-of-life.
	#[serde(rename = "eol")]
	end_of_life:         bool,
	
	/// An optional message to show to the user, primarily for end-of-life.
	#[serde(default)]
	message:             Option<String>,
}

//󰭅		VersionDescriptor														
impl VersionDescriptor {
	//		Constructors														
	
	//		new																	
	/// Creates a new version descriptor.
	/// 
	/// # Parameters
	/// 
	/// * `recommended_version` - The lowest version considered up to date.
	/// * `required_version`    - The lowest version still allowed to run.
	/// * `update_url`          - Where the user can obtain an update.
	/// * `end_of_life`         - Whether the application has reached
	///                           end-of-life.
	/// * `message`             - An optional message for the user.
	/// 
	#[must_use]
	pub fn new<S: Into<String>>(
		recommended_version: S,
		required_version:    S,
		update_url:          Url,
		end_of_life:         bool,
		message:             Option<String>,
	) -> Self {
		Self {
			recommended_version: recommended_version.into(),
			required_version:    required_version.into(),
			update_url,
			end_of_life,
			message,
		}
	}
	
	//		Public methods														
	
	//		recommended_version													
	/// The lowest version that is considered up to date.
	#[must_use]
	pub fn recommended_version(&self) -> &str {
		&self.recommended_version
	}
	
	//		required_version													
	/// The lowest version that is still allowed to run.
	#[must_use]
	pub fn required_version(&self) -> &str {
		&self.required_version
	}
	
	//		update_url															
	/// Where the user can obtain an update.
	#[must_use]
	pub const fn update_url(&self) -> &Url {
		&self.update_url
	}
	
	//		end_of_life															
	/// Whether the application has reached end-of-life.
	#[must_use]
	pub const fn end_of_life(&self) -> bool {
		self.end_of_life
	}
	
	//		message																
	/// The message for the user, if any.
	#[must_use]
	pub fn message(&self) -> Option<&str> {
		self.message.as_deref()
	}
}

//		OrdinalComparator														
/// The default [`Comparator`], which uses [`derive_status()`].
#[expect(clippy::exhaustive_structs, reason = "Unit struct")]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OrdinalComparator;

//󰭅		Comparator																
impl Comparator for OrdinalComparator {
	//		derive_status														
	fn derive_status(&self, descriptor: &VersionDescriptor, local_version: &str) -> GateStatus {
		derive_status(descriptor, local_version)
	}
}



//		Traits

//§		Comparator																
/// Maps a descriptor and the local version onto a [`GateStatus`].
#[cfg_attr(test, automock)]
pub trait Comparator: Send + Sync {
	//		derive_status														
	/// Derives the status of the running application.
	/// 
	/// # Parameters
	/// 
	/// * `descriptor`    - The descriptor received from the endpoint.
	/// * `local_version` - The version of the running application.
	/// 
	fn derive_status(&self, descriptor: &VersionDescriptor, local_version: &str) -> GateStatus;
}



//		Functions

//		derive_status															
/// Derives the status of the running application.
/// 
/// The checks are made in order of priority:
/// 
///   1. End-of-life overrides everything, regardless of versions.
///   2. A local version strictly below the required version needs an update.
///   3. A local version strictly below the recommended version should update.
///   4. Anything else is up to date.
/// 
/// Being equal to the required version therefore does not require an update,
/// and being equal to the recommended version is up to date. Comparison is
/// ordinal on the strings as given.
/// 
/// # Parameters
/// 
/// * `descriptor`    - The descriptor received from the endpoint.
/// * `local_version` - The version of the running application.
/// 
#[must_use]
pub fn derive_status(descriptor: &VersionDescriptor, local_version: &str) -> GateStatus {
	if descriptor.end_of_life {
		return GateStatus::EndOfLife(descriptor.message.clone());
	}
	if local_version < descriptor.required_version.as_str() {
		return GateStatus::RequiredUpdate(descriptor.update_url.clone());
	}
	if local_version < descriptor.recommended_version.as_str() {
		return GateStatus::RecommendedUpdate(descriptor.update_url.clone());
	}
	GateStatus::UpToDate
}
