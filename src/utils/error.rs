use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QscriptError {
    #[error("cannot access '{}': {source}", path.display())]
    FileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("invalid pattern '{pattern}': {source}")]
    PatternError {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{file}:{line}: malformed entry '{text}'")]
    MalformedLine {
        file: String,
        line: usize,
        text: String,
    },

    #[error("Metadata error: {message}")]
    MetadataError { message: String },

    #[error("{message}")]
    CodingError { message: String },

    #[error("Extraction failed: {message}")]
    ExtractionError { message: String },

    #[error("All subpopulations have run dry. Nothing left to draw from.")]
    PopulationExhausted,

    #[error("'{}' already exists. I will not overwrite it.", path.display())]
    AlreadyExists { path: PathBuf },
}

impl QscriptError {
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileError {
            path: path.into(),
            source,
        }
    }

    pub fn pattern(pattern: &str, source: regex::Error) -> Self {
        Self::PatternError {
            pattern: pattern.to_string(),
            source,
        }
    }

    pub fn coding(message: impl Into<String>) -> Self {
        Self::CodingError {
            message: message.into(),
        }
    }

    pub fn metadata(message: impl Into<String>) -> Self {
        Self::MetadataError {
            message: message.into(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::FileError { .. } | Self::IoError(_) => {
                "Check that the path exists and that you run qscript from the study repo root"
            }
            Self::CsvError(_) | Self::SerializationError(_) => {
                "Check the metadata files for syntax errors"
            }
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => "Fix qscript.toml or the command-line arguments",
            Self::PatternError { .. } => "Fix the regular expression in codebook.md or qscript.toml",
            Self::MalformedLine { .. } | Self::MetadataError { .. } => {
                "Fix the offending line in the metadata file"
            }
            Self::CodingError { .. } => "Compare the coding against codebook.md",
            Self::ExtractionError { .. } => {
                "Check that pdftotext is installed and the layout types cover this volume"
            }
            Self::PopulationExhausted => "Reduce --size or add more volumes",
            Self::AlreadyExists { .. } => "Move the existing file away or use a fresh target directory",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::AlreadyExists { .. } => 2,
            Self::FileError { .. } | Self::IoError(_) => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, QscriptError>;
