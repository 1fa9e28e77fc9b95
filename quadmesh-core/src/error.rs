//! Error types for quadmesh

use thiserror::Error;

/// Main error type for quadmesh operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Index count must be a multiple of 3, got {count}{}", sub_mesh_suffix(.sub_mesh))]
    InvalidIndexCount {
        count: usize,
        sub_mesh: Option<usize>,
    },

    #[error("The vertex {attribute} must be as many as the vertices. Assigned: {assigned}  Require: {required}")]
    AttributeLength {
        attribute: &'static str,
        assigned: usize,
        required: usize,
    },

    #[error("Vertex index {index} is out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },

    #[error("Sub-mesh index {index} is out of range (sub-mesh count: {count})")]
    SubMeshOutOfRange { index: usize, count: usize },

    #[error("UV channel {0} is out of range (must be below {max})", max = crate::uv::UV_CHANNEL_COUNT)]
    UvChannelOutOfRange(usize),

    #[error("Sub-mesh count must be greater than zero, got {0}")]
    InvalidSubMeshCount(usize),

    #[error("Unsupported decimation algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Cannot {operation} while the algorithm is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },
}

impl Error {
    /// Returns true for errors caused by an index or count outside its valid range
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Error::SubMeshOutOfRange { .. }
                | Error::UvChannelOutOfRange(_)
                | Error::InvalidSubMeshCount(_)
        )
    }

    /// Returns true for errors caused by a malformed argument
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::InvalidIndexCount { .. }
                | Error::AttributeLength { .. }
                | Error::IndexOutOfBounds { .. }
                | Error::UnsupportedAlgorithm(_)
        )
    }
}

fn sub_mesh_suffix(sub_mesh: &Option<usize>) -> String {
    match sub_mesh {
        Some(index) => format!(" at sub-mesh index {index}"),
        None => String::new(),
    }
}

/// Result type alias for quadmesh operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_count_display() {
        let err = Error::InvalidIndexCount { count: 4, sub_mesh: None };
        assert_eq!(err.to_string(), "Index count must be a multiple of 3, got 4");

        let err = Error::InvalidIndexCount { count: 5, sub_mesh: Some(2) };
        assert!(err.to_string().ends_with("at sub-mesh index 2"));
    }

    #[test]
    fn test_attribute_length_display() {
        let err = Error::AttributeLength { attribute: "normals", assigned: 3, required: 8 };
        let msg = err.to_string();
        assert!(msg.contains("normals"));
        assert!(msg.contains("Assigned: 3"));
        assert!(msg.contains("Require: 8"));
    }

    #[test]
    fn test_taxonomy() {
        assert!(Error::UvChannelOutOfRange(4).is_out_of_range());
        assert!(Error::InvalidSubMeshCount(0).is_out_of_range());
        assert!(!Error::InvalidSubMeshCount(0).is_invalid_argument());
        assert!(Error::UnsupportedAlgorithm("foo".into()).is_invalid_argument());
        assert!(!Error::UnsupportedAlgorithm("foo".into()).is_out_of_range());
    }
}
