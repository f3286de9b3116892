use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Returns true when `filename` carries one of `allowed` as its final extension.
pub fn allowed_file(filename: &str, allowed: &[String]) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext))
        }
        None => false,
    }
}

/// Reduces a client-supplied name to a flat, ASCII-only file name.
///
/// The result never contains a path separator and may be empty.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Name under which the crop of `filename` is stored in the result directory.
pub fn crop_file_name(filename: &str) -> String {
    let stem = filename.split('.').next().unwrap_or_default();
    format!("crop_{stem}_0.jpg")
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    allowed_extensions: Vec<String>,
}

impl UploadStore {
    pub async fn new(dir: impl Into<PathBuf>, allowed_extensions: Vec<String>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            allowed_extensions,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn allows(&self, filename: &str) -> bool {
        allowed_file(filename, &self.allowed_extensions)
    }

    /// Writes the upload under its sanitised name and returns both.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<(String, PathBuf)> {
        let name = secure_filename(filename);
        if name.is_empty() {
            return Err(Error::validation(format!(
                "file name '{filename}' has no usable characters"
            )));
        }

        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes).await?;
        debug!("Saved upload {} ({} bytes)", path.display(), bytes.len());

        Ok((name, path))
    }
}
