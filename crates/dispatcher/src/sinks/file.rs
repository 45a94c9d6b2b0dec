//! FileSink - writes each byte block to its own file

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use contracts::{ByteBlock, ByteSink, StreamerError};

/// Sink that writes each dispatched block to disk as one file
///
/// Files are named `{prefix}r{rank}_{counter}.{suffix}` so that independent
/// workers writing into a shared directory never collide.
pub struct FileSink {
    name: String,
    write_directory: PathBuf,
    prefix: String,
    suffix: String,
    rank: u64,
    counter: u64,
}

impl FileSink {
    /// Open a new FileSink, creating the output directory if needed
    pub fn open(
        name: impl Into<String>,
        write_directory: &Path,
        prefix: &str,
        suffix: &str,
        rank: u64,
    ) -> Result<Self, StreamerError> {
        std::fs::create_dir_all(write_directory)?;

        let prefix = if !prefix.is_empty() && !prefix.ends_with('_') {
            format!("{prefix}_")
        } else {
            prefix.to_string()
        };

        Ok(Self {
            name: name.into(),
            write_directory: write_directory.to_path_buf(),
            prefix,
            suffix: suffix.to_string(),
            rank,
            counter: 0,
        })
    }

    fn next_path(&self) -> PathBuf {
        self.write_directory.join(format!(
            "{}r{}_{}.{}",
            self.prefix, self.rank, self.counter, self.suffix
        ))
    }
}

impl ByteSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_send",
        skip(self, block),
        fields(sink = %self.name, bytes = block.len())
    )]
    async fn send(&mut self, block: &ByteBlock) -> Result<(), StreamerError> {
        let path = self.next_path();
        tokio::fs::write(&path, block)
            .await
            .map_err(|e| StreamerError::sink_send(&self.name, e.to_string()))?;
        self.counter += 1;
        debug!(sink = %self.name, path = %path.display(), "Block written");
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), StreamerError> {
        debug!(sink = %self.name, blocks = self.counter, "FileSink closed");
        Ok(())
    }
}
