//! license tier ordering.
//!
//! tiers form a fixed total order that gates catalog visibility:
//! free (0) < free-reviewer (1) < pro (2) < enterprise (3).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// a license tier.
///
/// the derived `Ord` follows the declaration order, which matches the
/// numeric levels returned by [`Tier::level`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// the unpaid tier; also the fallback for unknown tier strings
    #[default]
    Free,
    /// granted to verified reviewers; slightly above free
    FreeReviewer,
    /// paid individual tier
    Pro,
    /// paid organization tier
    Enterprise,
}

impl Tier {
    /// numeric level used for visibility comparisons.
    pub fn level(&self) -> u8 {
        match self {
            Tier::Free => 0,
            Tier::FreeReviewer => 1,
            Tier::Pro => 2,
            Tier::Enterprise => 3,
        }
    }

    /// the wire/storage string for this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::FreeReviewer => "free-reviewer",
            Tier::Pro => "pro",
            Tier::Enterprise => "enterprise",
        }
    }

    /// parse a tier string, mapping unknown values to [`Tier::Free`].
    ///
    /// callers gate visibility on the result, so an unrecognized tier
    /// must grant the least privilege rather than fail the request.
    pub fn parse_lenient(s: &str) -> Tier {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Tier::Free),
            "free-reviewer" => Ok(Tier::FreeReviewer),
            "pro" => Ok(Tier::Pro),
            "enterprise" => Ok(Tier::Enterprise),
            other => Err(Error::UnknownTier(other.to_string())),
        }
    }
}
