//! Configuration constants, source selection and validation functions.

use std::path::PathBuf;

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{EpsgError, Result};

/// Query endpoint of the online EPSG registry (CSW-ebRIM).
pub const EPSG_REGISTRY_URL: &str = "http://www.epsg-registry.org/indicio/query";

/// Name of the GML dictionary inside the registry's ZIP export.
pub const GML_EXPORT_NAME: &str = "GmlDictionary.xml";

/// HTTP timeout in seconds.
///
/// The full export is a multi-megabyte archive, so this is generous.
pub const HTTP_TIMEOUT_SECS: u64 = 120;

/// Maximum number of attempts for transient HTTP failures.
pub const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Default maximum HTTP response size in bytes (200 MB).
pub const DEFAULT_MAX_RESPONSE_SIZE: u64 = 200 * 1024 * 1024;

/// Maximum number of entities under construction at once while following
/// references. Real EPSG reference chains are a handful of levels deep.
pub const MAX_RESOLVE_DEPTH: usize = 64;

/// Default database file used by the command-line interface.
pub const DEFAULT_DATABASE_PATH: &str = "epsg-registry.sqlite";

/// EPSG URN pattern: `urn:ogc:def:<category>:EPSG:<version>:<code>`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static URN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^urn:ogc:def:[A-Za-z][A-Za-z0-9-]*:EPSG:[0-9.]*:[0-9]+$").expect("valid regex")
});

/// Validate EPSG URN format.
///
/// The loader treats identifiers as opaque strings; this is only used to
/// reject obvious typos in command-line input.
///
/// # Examples
/// ```
/// use epsg_registry::config::validate_urn;
///
/// assert!(validate_urn("urn:ogc:def:crs:EPSG::4326").is_ok());
/// assert!(validate_urn("EPSG:4326").is_err());
/// ```
pub fn validate_urn(urn: &str) -> Result<()> {
    if URN_PATTERN.is_match(urn) {
        Ok(())
    } else {
        Err(EpsgError::InvalidUrn(urn.to_string()))
    }
}

/// Connection settings for the online registry service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// CSW query endpoint.
    pub endpoint: String,
    /// File name of the GML dictionary inside the export archive.
    pub export_name: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Largest response body accepted, in bytes.
    pub max_response_size: u64,
}

impl ServiceConfig {
    /// Create a configuration for a specific endpoint, other settings default.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: EPSG_REGISTRY_URL.to_string(),
            export_name: GML_EXPORT_NAME.to_string(),
            timeout_secs: HTTP_TIMEOUT_SECS,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
        }
    }
}

/// Where the GML dictionary comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A GML file on disk.
    File(PathBuf),
    /// GML text already in memory.
    Gml(String),
    /// The online registry service.
    Remote(ServiceConfig),
}

impl Source {
    /// The online registry with default settings.
    #[must_use]
    pub fn remote() -> Self {
        Self::Remote(ServiceConfig::default())
    }

    /// Short human-readable description for logging.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => format!("file {}", path.display()),
            Self::Gml(text) => format!("in-memory GML ({} bytes)", text.len()),
            Self::Remote(config) => format!("registry service {}", config.endpoint),
        }
    }
}

/// Which SQLite database backs a registry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreConfig {
    /// Private in-memory database, discarded on drop.
    #[default]
    InMemory,
    /// Database file on disk, created if missing.
    File(PathBuf),
}
