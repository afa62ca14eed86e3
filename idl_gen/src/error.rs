use idl_types::GraphError;
use thiserror::Error;

/// Result alias used across the generator.
pub type GenResult<T> = Result<T, GenError>;

/// Fatal generation-time errors. Each aborts the run for the file being
/// generated and names the schema entity and file it came from.
#[derive(Debug, Error)]
pub enum GenError {
    /// Two declarations (or a declaration and a generated method) map to the same identifier.
    #[error("{file}: identifier {identifier} of {entity} conflicts with {existing}")]
    IdentifierConflict {
        identifier: String,
        entity: String,
        existing: String,
        file: String,
    },

    /// An identifier override is not an exported identifier.
    #[error("{file}: {entity} has go.name {identifier:?}, which is not an exported identifier")]
    InvalidIdentifier {
        identifier: String,
        entity: String,
        file: String,
    },

    /// An annotation carries a value the generator does not understand.
    #[error("{file}: {entity} has invalid annotation {key} = {value:?}: {reason}")]
    InvalidAnnotation {
        key: String,
        value: String,
        entity: String,
        file: String,
        reason: String,
    },

    /// A constant or default value cannot be expressed as its declared type.
    #[error("{file}: {entity} has an invalid value: {reason}")]
    InvalidConstant {
        entity: String,
        file: String,
        reason: String,
    },

    /// The input graph violates an upstream invariant.
    #[error("invalid program: {0}")]
    InvalidGraph(#[from] GraphError),

    /// The generator reached a state the input graph should never produce.
    #[error("internal generator error: {0}")]
    Internal(String),

    #[error("failed to format generated code")]
    Format(#[from] std::fmt::Error),
}
