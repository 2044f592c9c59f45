//		Packages

use crate::status::VersionDescriptor;
use url::Url;



//		Functions

//		endpoint																
pub(crate) fn endpoint() -> Url {
	"https://example.com/lockout.json".parse().unwrap()
}

//		update_url																
pub(crate) fn update_url() -> Url {
	"https://example.com/update".parse().unwrap()
}

//		descriptor																
pub(crate) fn descriptor(required: &str, recommended: &str) -> VersionDescriptor {
	VersionDescriptor::new(recommended, required, update_url(), false, Some("ok".to_owned()))
}

//		eol_descriptor															
pub(crate) fn eol_descriptor(required: &str, recommended: &str, message: Option<&str>) -> VersionDescriptor {
	VersionDescriptor::new(recommended, required, update_url(), true, message.map(ToOwned::to_owned))
}
