//! Line-oriented durable store for device tokens.
//!
//! One token per line. On load the file is deduplicated and rewritten, and
//! each new registration appends a single line.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use notice_common::error::AppError;

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all stored tokens, keeping the first occurrence of each, and
    /// rewrite the file with the deduplicated list. A missing file is an
    /// empty store.
    pub async fn load(&self) -> Result<Vec<String>, AppError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut seen = HashSet::new();
        let tokens: Vec<String> = contents
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.trim().is_empty())
            .filter(|line| seen.insert(*line))
            .map(str::to_string)
            .collect();

        let mut rewritten = tokens.join("\n");
        if !rewritten.is_empty() {
            rewritten.push('\n');
        }
        fs::write(&self.path, rewritten).await?;

        tracing::info!(
            path = %self.path.display(),
            tokens = tokens.len(),
            "Loaded device tokens"
        );
        Ok(tokens)
    }

    /// Append one token as a new line.
    pub async fn append(&self, token: &str) -> Result<(), AppError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{token}\n").as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
