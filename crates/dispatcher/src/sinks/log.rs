//! LogSink - records dispatched blocks via tracing

use tracing::{debug, info, instrument};

use contracts::{ByteBlock, ByteSink, StreamerError};

/// Sink that logs every dispatched block instead of transporting it
///
/// Useful for dry runs and for debugging a pipeline without standing up
/// real outputs.
pub struct LogSink {
    name: String,
    blocks_seen: u64,
    bytes_seen: u64,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks_seen: 0,
            bytes_seen: 0,
        }
    }
}

impl ByteSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_send", skip(self, block), fields(sink = %self.name))]
    async fn send(&mut self, block: &ByteBlock) -> Result<(), StreamerError> {
        self.blocks_seen += 1;
        self.bytes_seen += block.len() as u64;
        debug!(
            sink = %self.name,
            block = self.blocks_seen,
            bytes = block.len(),
            "Block received"
        );
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), StreamerError> {
        info!(
            sink = %self.name,
            blocks = self.blocks_seen,
            bytes = self.bytes_seen,
            "LogSink closed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_log_sink_accepts_everything() {
        let mut sink = LogSink::new("log");
        for _ in 0..5 {
            sink.send(&Bytes::from_static(b"abc")).await.unwrap();
        }
        assert_eq!(sink.blocks_seen, 5);
        assert_eq!(sink.bytes_seen, 15);
        sink.close().await.unwrap();
    }
}
