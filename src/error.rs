use std::path::PathBuf;

use thiserror::Error;

/// Reasons an import is rejected. The message is what the user sees.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("the file must contain at least 2 lines (header + data)")]
    Format,

    #[error("no valid data found in the file")]
    EmptyDataset,

    #[error("please select a CSV file ({name} is not one)")]
    UnsupportedFile { name: String },

    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
