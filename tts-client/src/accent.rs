//! Voice regions offered by the Google Translate voice.
//!
//! The service picks the regional English voice from the top-level domain the
//! request is sent to, so every accent maps to one TLD.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TtsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accent {
    #[default]
    American,
    British,
    Australian,
    Indian,
    SouthAfrican,
}

impl Accent {
    pub const ALL: [Accent; 5] = [
        Accent::American,
        Accent::British,
        Accent::Australian,
        Accent::Indian,
        Accent::SouthAfrican,
    ];

    /// Top-level domain of the regional endpoint
    pub fn tld(&self) -> &'static str {
        match self {
            Self::American => "com",
            Self::British => "co.uk",
            Self::Australian => "com.au",
            Self::Indian => "co.in",
            Self::SouthAfrican => "co.za",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::American => "American (US)",
            Self::British => "British (UK)",
            Self::Australian => "Australian",
            Self::Indian => "Indian",
            Self::SouthAfrican => "South African",
        }
    }

    /// Identifier used on the command line and in the config file
    pub fn id(&self) -> &'static str {
        match self {
            Self::American => "american",
            Self::British => "british",
            Self::Australian => "australian",
            Self::Indian => "indian",
            Self::SouthAfrican => "south-african",
        }
    }
}

impl FromStr for Accent {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "american" | "us" | "com" => Ok(Self::American),
            "british" | "uk" | "co.uk" => Ok(Self::British),
            "australian" | "au" | "com.au" => Ok(Self::Australian),
            "indian" | "in" | "co.in" => Ok(Self::Indian),
            "south-african" | "south_african" | "southafrican" | "za" | "co.za" => {
                Ok(Self::SouthAfrican)
            }
            _ => Err(TtsError::UnknownAccent(s.to_string())),
        }
    }
}

impl fmt::Display for Accent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
