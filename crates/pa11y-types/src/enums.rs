//! Enumeration types shared with the webservice.

use serde::{Deserialize, Serialize};

/// The accessibility standard a task is tested against.
///
/// Names the dashboard does not know decode as [`Standard::Unknown`] so one
/// odd task cannot break a whole listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Default, Serialize, Deserialize)]
pub enum Standard {
    /// US Section 508.
    #[serde(rename = "Section508")]
    Section508,
    /// WCAG 2.0 level A.
    #[serde(rename = "WCAG2A")]
    Wcag2A,
    /// WCAG 2.0 level AA.
    #[default]
    #[serde(rename = "WCAG2AA")]
    Wcag2Aa,
    /// WCAG 2.0 level AAA.
    #[serde(rename = "WCAG2AAA")]
    Wcag2Aaa,
    /// Any standard name not listed above.
    #[serde(other)]
    Unknown,
}

impl Standard {
    /// Every standard, in the order shown on the task forms.
    pub const ALL: [Self; 4] = [Self::Section508, Self::Wcag2A, Self::Wcag2Aa, Self::Wcag2Aaa];

    /// Wire name used by the webservice.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Section508 => "Section508",
            Self::Wcag2A => "WCAG2A",
            Self::Wcag2Aa => "WCAG2AA",
            Self::Wcag2Aaa => "WCAG2AAA",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a wire name. Returns `None` for unknown standards.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl core::fmt::Display for Standard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a single accessibility issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    /// A definite failure against the standard.
    Error,
    /// A likely failure that needs human review.
    Warning,
    /// An advisory note.
    Notice,
}

impl IssueType {
    /// Lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
        }
    }
}
