use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{convert::Infallible, fmt, str::FromStr};

/// Task priority as reported by the backend.
///
/// Recognized levels are matched case-insensitively and normalized to their
/// lower-case wire form, so `"HIGH"` is sent back as `"high"` on the next
/// update. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    /// Lowest recognized priority.
    Low,
    /// Default priority for new tasks.
    #[default]
    Medium,
    /// Highest priority.
    High,
    /// Any other wire value.
    Other(String),
}

impl Priority {
    /// Wire representation. Recognized values are lower-case.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Other(raw) => raw,
        }
    }

    /// Ordering weight; higher sorts first. Unrecognized values rank 0.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Other(_) => 0,
        }
    }

    /// Returns true for [`Priority::High`].
    #[must_use]
    pub const fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }
}

impl FromStr for Priority {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Other(s.to_owned()),
        })
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(priority) => priority,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Priority {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        Ok(Self::from(raw.as_str()))
    }
}
