use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a conversion run
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Failed to read an input file or write the output file
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A recipe node is missing one of the markers every recipe must carry
    #[error("Recipe #{recipe} is missing required marker '{marker}'")]
    MissingMarker { recipe: usize, marker: String },

    /// An element was found but lacks an attribute the conversion needs
    #[error("Element '{marker}' has no '{attribute}' attribute")]
    MissingAttribute { marker: String, attribute: String },

    /// The recipe source link could not be parsed as an absolute URL
    #[error("Invalid source URL '{href}': {source}")]
    InvalidSourceUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },

    /// A marker could not be compiled into a CSS selector
    #[error("Invalid selector: {0}")]
    Selector(String),

    /// Failed to encode the recipes as YAML
    #[error("YAML encoding failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
