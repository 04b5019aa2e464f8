use thiserror::Error;

pub type RatioResult<T> = Result<T, RatioError>;

#[derive(Error, Debug)]
pub enum RatioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Table structure error: expected at least 3 columns (line item, prior period, current period), found {found}"
    )]
    Structure { found: usize },

    #[error("Missing line item: no row labelled '{label}' was found in the table")]
    MissingLineItem { label: String },

    #[error("Import error: {0}")]
    Import(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Narrative generation error: {0}")]
    Narrative(String),
}

impl RatioError {
    /// Structural failures abort the analysis of the current table.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            RatioError::Structure { .. } | RatioError::MissingLineItem { .. }
        )
    }
}
