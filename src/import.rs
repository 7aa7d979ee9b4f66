use std::path::Path;

use tracing::debug;

use crate::error::ImportError;

/// A grade sheet handed to the importer, before any parsing.
#[derive(Debug, Clone)]
pub struct ImportSource {
    pub name: String,
    pub mime_type: Option<String>,
    pub text: String,
}

impl ImportSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            text: text.into(),
        }
    }

    pub fn ensure_csv(&self) -> Result<(), ImportError> {
        if is_csv_like(&self.name, self.mime_type.as_deref()) {
            Ok(())
        } else {
            Err(ImportError::UnsupportedFile {
                name: self.name.clone(),
            })
        }
    }
}

pub fn is_csv_like(name: &str, mime_type: Option<&str>) -> bool {
    mime_type == Some("text/csv") || name.to_ascii_lowercase().ends_with(".csv")
}

/// Reads a CSV file from disk. The type check runs before the file is opened.
pub async fn read_csv_file(path: &Path) -> Result<ImportSource, ImportError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if !is_csv_like(&name, None) {
        return Err(ImportError::UnsupportedFile { name });
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(file = %path.display(), bytes = text.len(), "read grade sheet");

    Ok(ImportSource::new(name, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_detection() {
        assert!(is_csv_like("grades.csv", None));
        assert!(is_csv_like("GRADES.CSV", None));
        assert!(is_csv_like("export", Some("text/csv")));
        assert!(is_csv_like("grades.txt", Some("text/csv")));
        assert!(!is_csv_like("grades.txt", None));
        assert!(!is_csv_like("grades.csv.bak", Some("text/plain")));
        assert!(!is_csv_like("csv", None));
        assert!(is_csv_like(".csv", None));
        assert!(!is_csv_like("gradescsv", None));
    }

    #[test]
    fn source_type_check() {
        assert!(ImportSource::new("a.csv", "").ensure_csv().is_ok());
        let source = ImportSource {
            mime_type: Some("application/vnd.ms-excel".to_string()),
            ..ImportSource::new("a.xlsx", "")
        };
        let err = source.ensure_csv().unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFile { ref name } if name == "a.xlsx"));
    }

    #[tokio::test]
    async fn reads_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grades.csv");
        std::fs::write(&path, "Name,Math\nAlice,12\n").unwrap();

        let source = read_csv_file(&path).await.unwrap();
        assert_eq!(source.name, "grades.csv");
        assert_eq!(source.text, "Name,Math\nAlice,12\n");
    }

    #[tokio::test]
    async fn rejects_other_extensions_without_reading() {
        let err = read_csv_file(Path::new("/does/not/exist/notes.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFile { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv_file(&dir.path().join("missing.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Read { .. }));
    }
}
