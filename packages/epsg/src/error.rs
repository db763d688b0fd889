//! Error types for the EPSG registry.
//!
//! A single `EpsgError` covers the loader taxonomy (unknown identifier,
//! malformed reference, malformed scalar value), persistence failures and the
//! remote-service plumbing. Callers that need to tell a missing key apart from
//! a data integrity problem use [`EpsgError::is_not_found`] and
//! [`EpsgError::is_integrity_error`].

use thiserror::Error;

/// Main error type for the registry library.
#[derive(Debug, Error)]
pub enum EpsgError {
    /// Identifier unknown to the index, or its element has no construction rule.
    #[error("Identifier not found: {identifier}{}", .tag.as_ref().map(|t| format!(" (no construction rule for <{t}>)")).unwrap_or_default())]
    NotFound {
        identifier: String,
        tag: Option<String>,
    },

    /// A mandatory cross-reference is missing or cannot be resolved.
    #[error("Malformed reference <{field}> in {identifier}: {reason}")]
    MalformedReference {
        identifier: String,
        field: String,
        target: Option<String>,
        reason: String,
    },

    /// Resolving an entity needed a longer reference chain than allowed.
    #[error("Reference chain at {identifier} is deeper than {max_depth} entities")]
    ReferenceDepthExceeded { identifier: String, max_depth: usize },

    /// A scalar value violates its declared type.
    #[error("Invalid value for {field} of {identifier}: expected {expected}, found {found}")]
    TypeCoercion {
        identifier: String,
        field: String,
        expected: &'static str,
        found: String,
    },

    /// The entity has no such field to assign.
    #[error("{identifier} has no field {field}")]
    NoSuchField { identifier: String, field: String },

    /// Storage-layer failure. Transactions are rolled back before this surfaces.
    #[error("Persistence failure during {operation}: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// The database was written by an incompatible schema version.
    #[error("Unsupported registry schema version {found} (expected {expected})")]
    SchemaVersion { expected: i64, found: i64 },

    /// Two entities with the same identifier in one bulk insert.
    #[error("Duplicate identifier in bulk insert: {0}")]
    DuplicateIdentifier(String),

    /// Facade `set` called with a key that differs from the entity identifier.
    #[error("Key '{key}' does not match entity identifier '{identifier}'")]
    IdentifierMismatch { key: String, identifier: String },

    /// Entity (de)serialization for storage failed.
    #[error("Entity serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML output failed.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All retry attempts against the registry service failed.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// Response body larger than the configured limit.
    #[error("Response from {url} exceeds maximum size of {max_bytes} bytes")]
    ResponseTooLarge { url: String, max_bytes: u64 },

    /// The registry service answered with something we cannot use.
    #[error("Unexpected registry service response: {0}")]
    ServiceResponse(String),

    /// The export archive could not be read.
    #[error("Export archive is unreadable: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The export archive does not contain the GML dictionary.
    #[error("The required GML file is not present in the export archive: {0}")]
    MissingExportFile(String),

    /// The GML dictionary inside the export archive exceeds the size limit.
    #[error("Export file {name} exceeds maximum size of {max_bytes} bytes when unpacked")]
    ExportTooLarge { name: String, max_bytes: u64 },

    /// Invalid URN format (CLI input validation).
    #[error("Invalid EPSG URN: '{0}'. Expected urn:ogc:def:<category>:EPSG::<code>")]
    InvalidUrn(String),

    /// Unknown entity class name.
    #[error("Unknown entity class: '{0}'")]
    UnknownClass(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EpsgError {
    /// True for the recoverable "unknown identifier" case.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for data integrity problems in the source document.
    #[must_use]
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedReference { .. } | Self::TypeCoercion { .. }
        )
    }

    /// Map a rusqlite error into a persistence failure for `operation`.
    pub(crate) fn persistence(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Persistence { operation, source }
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, EpsgError>;
