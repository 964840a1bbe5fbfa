//! Storage backends a repository can be bound to.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The store behind a repository.
///
/// Write paths are always bound to [`StorageBackend::Mongo`]. Read paths
/// are bound to whichever backend is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Mongo,
    Elastic,
}

impl StorageBackend {
    /// Lowercase name, as accepted by `READ_BACKEND`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mongo => "mongo",
            Self::Elastic => "elastic",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a backend name is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown storage backend {0:?} (expected \"mongo\" or \"elastic\")")]
pub struct UnknownBackend(pub String);

impl FromStr for StorageBackend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "elastic" | "elasticsearch" => Ok(Self::Elastic),
            other => Err(UnknownBackend(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_aliases() {
        assert_eq!("mongo".parse::<StorageBackend>().unwrap(), StorageBackend::Mongo);
        assert_eq!("MongoDB".parse::<StorageBackend>().unwrap(), StorageBackend::Mongo);
        assert_eq!(
            " elasticsearch ".parse::<StorageBackend>().unwrap(),
            StorageBackend::Elastic
        );
    }

    #[test]
    fn test_parse_unknown_backend() {
        let err = "postgres".parse::<StorageBackend>().unwrap_err();
        assert_eq!(err, UnknownBackend("postgres".to_owned()));
    }
}
