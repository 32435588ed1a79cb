use crate::{Error, ErrorContext};
use std::fmt;
use std::str::FromStr;

pub const US_PDF_SERVICES_URI: &str = "https://pdf-services-ue1.adobe.io";
pub const EU_PDF_SERVICES_URI: &str = "https://pdf-services-ew1.adobe.io";

/// Deployment region of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    #[default]
    Us,
    Eu,
}

impl Region {
    pub fn base_uri(&self) -> &'static str {
        match self {
            Region::Us => US_PDF_SERVICES_URI,
            Region::Eu => EU_PDF_SERVICES_URI,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Eu => "EU",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Region::Us),
            "EU" => Ok(Region::Eu),
            other => Err(Error::client_with_context(
                format!("unsupported region '{}'", other),
                ErrorContext::new()
                    .with_field_path("region")
                    .with_details("expected US or EU"),
            )),
        }
    }
}
