//! The render unit of work.
//!
//! A real deployment would run a clustering pass and plot the result; this
//! service stands that in with a fixed-duration wait followed by loading a
//! pre-rendered chart from disk. The delay and fixture path are configured
//! at startup so tests can run with millisecond delays and their own files.

use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Chart fixture not found: {path}")]
    FixtureMissing { path: String },

    #[error("Failed to read chart fixture {path}: {source}")]
    FixtureRead {
        path: String,
        source: std::io::Error,
    },
}

/// Produces chart bytes for a given cluster count.
pub struct ChartRenderer {
    fixture_path: PathBuf,
    render_delay: Duration,
}

impl ChartRenderer {
    pub fn new(fixture_path: impl Into<PathBuf>, render_delay: Duration) -> Self {
        Self {
            fixture_path: fixture_path.into(),
            render_delay,
        }
    }

    pub fn fixture_path(&self) -> &Path {
        &self.fixture_path
    }

    /// Render a chart for `clusters` clusters.
    ///
    /// Sleeps for the configured render delay, then reads the fixture
    /// image. A missing or unreadable fixture is the executor's failure
    /// case and surfaces as a [`RenderError`].
    pub async fn render(&self, clusters: u32) -> Result<Vec<u8>, RenderError> {
        tracing::info!(clusters, "Starting chart render");

        tokio::time::sleep(self.render_delay).await;

        let path = self.fixture_path.display().to_string();
        if !self.fixture_path.exists() {
            tracing::error!(path = %path, "Chart fixture not found");
            return Err(RenderError::FixtureMissing { path });
        }

        let bytes = tokio::fs::read(&self.fixture_path)
            .await
            .map_err(|source| RenderError::FixtureRead { path, source })?;

        tracing::info!(clusters, size_bytes = bytes.len(), "Chart render finished");
        Ok(bytes)
    }
}
