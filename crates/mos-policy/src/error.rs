use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy catalog {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid header pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("policy #{index} has a blank object_type")]
    BlankObjectType { index: usize },

    #[error("duplicate policy for object type '{object_type}'")]
    DuplicateObjectType { object_type: String },

    #[error("reference {object_type}.{attribute} reads from the column header but has no pattern")]
    MissingPattern {
        object_type: String,
        attribute: String,
    },

    #[error("reference {object_type}.{attribute} has a blank target object type")]
    BlankTarget {
        object_type: String,
        attribute: String,
    },

    #[error("invalid settings: {message}")]
    InvalidSettings { message: String },
}

impl PolicyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PolicyError>;
