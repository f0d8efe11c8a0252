use crate::core::contract::ComponentType;
use thiserror::Error;
use vulkano::format::Format;

/// Errors raised while validating, linking or feeding a vertex contract.
///
/// None of these are recoverable at runtime: they indicate a programmer error, the same class of
/// failure a GL driver reports when a program fails to link.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("{contract}: attribute `{name}` declared at location {found}, expected {expected}")]
    NonContiguousLocation {
        contract: &'static str,
        name: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("{contract}: `{name}` at location {location} exceeds the limit of {limit}")]
    LocationOutOfRange {
        contract: &'static str,
        name: &'static str,
        location: u32,
        limit: u32,
    },

    #[error("{contract}: semantic {semantic} declared more than once")]
    DuplicateSemantic {
        contract: &'static str,
        semantic: String,
    },

    #[error("{contract}: shader name `{name}` declared more than once")]
    DuplicateName {
        contract: &'static str,
        name: &'static str,
    },

    #[error("{contract}: attribute `{name}` has type {ty}, which is not a vertex input type")]
    InvalidAttributeType {
        contract: &'static str,
        name: &'static str,
        ty: ComponentType,
    },

    #[error("{contract}: uniforms `{first}` and `{second}` both bound at location {location}")]
    UniformLocationCollision {
        contract: &'static str,
        first: &'static str,
        second: &'static str,
        location: u32,
    },

    #[error("{contract}: forwarded interface mismatch: {reason}")]
    ForwardedMismatch {
        contract: &'static str,
        reason: String,
    },

    #[error("binding mismatch against {contract}: {mismatch}")]
    BindingMismatch {
        contract: &'static str,
        #[source]
        mismatch: Mismatch,
    },

    #[error("uniform `{0}` not found")]
    UniformNotFound(String),

    #[error("uniform `{name}` expects {expected}, got {found}")]
    UniformTypeMismatch {
        name: &'static str,
        expected: ComponentType,
        found: ComponentType,
    },

    #[error("uniform `{name}` rejected: {reason}")]
    InvalidUniformValue { name: &'static str, reason: String },

    #[error("uniform `{0}` has not been set")]
    UniformNotSet(&'static str),

    #[error("vertex of {found} submitted to {expected}")]
    WrongContract {
        expected: &'static str,
        found: &'static str,
    },

    #[error("line {line}: {reason}")]
    Glsl { line: usize, reason: String },

    #[error("failed to encode vertex: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}

/// The detail of a [`ContractError::BindingMismatch`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Mismatch {
    #[error("missing attribute `{0}`")]
    MissingAttribute(String),
    #[error("unexpected attribute `{0}`")]
    UnexpectedAttribute(String),
    #[error("attribute `{name}` has format {found:?}, expected {expected:?}")]
    Format {
        name: String,
        expected: Format,
        found: Format,
    },
    #[error("attribute `{name}` at byte offset {found}, expected {expected}")]
    Offset {
        name: String,
        expected: u64,
        found: u64,
    },
    #[error("vertex stride is {found} bytes, expected {expected}")]
    Stride { expected: u32, found: u32 },
    #[error("`{name}` declared at location {found:?}, expected {expected:?}")]
    Location {
        name: String,
        expected: Option<u32>,
        found: Option<u32>,
    },
    #[error("`{name}` declared as {found}, expected {expected}")]
    Type {
        name: String,
        expected: ComponentType,
        found: String,
    },
    #[error("attribute `{name}` has type {ty}, which cannot be fed from a vertex buffer")]
    NotVertexInput { name: String, ty: ComponentType },
    #[error("missing output `{0}`")]
    MissingOutput(String),
    #[error("unexpected output `{0}`")]
    UnexpectedOutput(String),
    #[error("missing uniform `{0}`")]
    MissingUniform(String),
    #[error("uniform `{name}` at location {location} collides with `{reserved_by}`")]
    ReservedLocation {
        name: String,
        location: u32,
        reserved_by: &'static str,
    },
}
