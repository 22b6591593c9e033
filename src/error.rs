//! Error types for the transformation engine

use std::fmt;

use thiserror::Error;

/// Boxed error returned by user-supplied converters and convertible types
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for transform operations
pub type Result<T> = std::result::Result<T, TransformError>;

/// Transformation errors
///
/// Field-local failures are wrapped in [`TransformError::Field`], once per
/// level of nesting, so a failure deep inside a constructed field carries the
/// whole chain of `(schema, field)` pairs. Use [`TransformError::kind`] to
/// match on what actually went wrong and [`TransformError::path`] to see where.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Cannot get schema for type '{type_name}'")]
    SchemaNotFound { type_name: String },

    #[error("Property '{name}' is required")]
    RequiredFieldMissing { name: String },

    #[error("Value must be {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("{reason}")]
    Validation { reason: String },

    #[error("JSON doesn't match to '{schema}' schema. Keys not recognized: {}", .keys.join(", "))]
    UnknownKey { schema: String, keys: Vec<String> },

    #[error("Conversion failed: {source}")]
    Conversion {
        #[source]
        source: BoxError,
    },

    #[error("Property '{field}' of '{schema}' schema is wrong. {source}")]
    Field {
        schema: String,
        field: String,
        #[source]
        source: Box<TransformError>,
    },

    #[error("Nesting depth exceeds the limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("Cannot declare property '{field}' of '{schema}' schema: {reason}")]
    InvalidDeclaration {
        schema: String,
        field: String,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The kind of failure, independent of where it happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SchemaNotFound,
    RequiredFieldMissing,
    TypeMismatch,
    Validation,
    UnknownKey,
    Conversion,
    DepthExceeded,
    InvalidDeclaration,
    Json,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SchemaNotFound => "schema not found",
            ErrorKind::RequiredFieldMissing => "required field missing",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::Validation => "validation",
            ErrorKind::UnknownKey => "unknown key",
            ErrorKind::Conversion => "conversion",
            ErrorKind::DepthExceeded => "depth exceeded",
            ErrorKind::InvalidDeclaration => "invalid declaration",
            ErrorKind::Json => "json",
        };
        f.write_str(name)
    }
}

/// One `(schema, field)` hop of an error path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub schema: String,
    pub field: String,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.field)
    }
}

impl TransformError {
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn conversion(source: impl Into<BoxError>) -> Self {
        Self::Conversion {
            source: source.into(),
        }
    }

    /// Wrap an error raised while processing `field` of `schema`
    pub fn field(schema: impl Into<String>, field: impl Into<String>, source: TransformError) -> Self {
        Self::Field {
            schema: schema.into(),
            field: field.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, with all field wrappers peeled off
    pub fn root_cause(&self) -> &TransformError {
        let mut current = self;
        while let TransformError::Field { source, .. } = current {
            current = source.as_ref();
        }
        current
    }

    /// Kind of the innermost error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransformError::Field { source, .. } => source.kind(),
            TransformError::SchemaNotFound { .. } => ErrorKind::SchemaNotFound,
            TransformError::RequiredFieldMissing { .. } => ErrorKind::RequiredFieldMissing,
            TransformError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            TransformError::Validation { .. } => ErrorKind::Validation,
            TransformError::UnknownKey { .. } => ErrorKind::UnknownKey,
            TransformError::Conversion { .. } => ErrorKind::Conversion,
            TransformError::DepthExceeded { .. } => ErrorKind::DepthExceeded,
            TransformError::InvalidDeclaration { .. } => ErrorKind::InvalidDeclaration,
            TransformError::Json(_) => ErrorKind::Json,
        }
    }

    /// Field path from the outermost schema to the innermost one
    pub fn path(&self) -> Vec<PathSegment> {
        let mut path = Vec::new();
        let mut current = self;
        while let TransformError::Field { schema, field, source } = current {
            path.push(PathSegment {
                schema: schema.clone(),
                field: field.clone(),
            });
            current = source.as_ref();
        }
        path
    }

    /// Field path rendered as `Outer.field > Inner.field`
    pub fn path_string(&self) -> String {
        self.path()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" > ")
    }

    /// Keys reported by an unknown-key error, if that is what this is
    pub fn unknown_keys(&self) -> Option<&[String]> {
        match self.root_cause() {
            TransformError::UnknownKey { keys, .. } => Some(keys.as_slice()),
            _ => None,
        }
    }
}
