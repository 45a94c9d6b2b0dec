//! NetworkSink - TCP push transport with length-prefixed framing

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, instrument};

use contracts::{ByteBlock, ByteSink, SocketRole, StreamerError};

/// Sink that pushes blocks over TCP
///
/// Each block is framed as a little-endian u32 length followed by the
/// payload. A client dials every configured address and distributes blocks
/// across the resulting connections round-robin; a server binds each address
/// and accepts exactly one peer per address before the pipeline starts.
pub struct NetworkSink {
    name: String,
    streams: Vec<TcpStream>,
    cursor: usize,
}

impl NetworkSink {
    /// Open a NetworkSink, establishing all connections up front
    pub async fn open(
        name: impl Into<String>,
        urls: &[String],
        role: SocketRole,
    ) -> Result<Self, StreamerError> {
        let name = name.into();
        if urls.is_empty() {
            return Err(StreamerError::sink_open(
                &name,
                "no socket addresses configured",
            ));
        }
        let mut streams = Vec::with_capacity(urls.len());

        for url in urls {
            let stream = match role {
                SocketRole::Client => TcpStream::connect(url).await.map_err(|e| {
                    StreamerError::sink_open(&name, format!("connect to {url}: {e}"))
                })?,
                SocketRole::Server => {
                    let listener = TcpListener::bind(url).await.map_err(|e| {
                        StreamerError::sink_open(&name, format!("bind {url}: {e}"))
                    })?;
                    let (stream, peer) = listener.accept().await.map_err(|e| {
                        StreamerError::sink_open(&name, format!("accept on {url}: {e}"))
                    })?;
                    info!(sink = %name, %url, %peer, "Peer connected");
                    stream
                }
            };
            streams.push(stream);
        }

        info!(sink = %name, connections = streams.len(), ?role, "NetworkSink open");

        Ok(Self {
            name,
            streams,
            cursor: 0,
        })
    }

    /// Number of established connections
    pub fn connections(&self) -> usize {
        self.streams.len()
    }
}

/// Frame lengths are u32; a block that cannot fit is a send error, not a
/// silently truncated length prefix
fn frame_len(sink: &str, len: usize) -> Result<u32, StreamerError> {
    u32::try_from(len).map_err(|_| {
        StreamerError::sink_send(sink, format!("block of {len} bytes exceeds the u32 frame limit"))
    })
}

impl ByteSink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_send",
        skip(self, block),
        fields(sink = %self.name, bytes = block.len())
    )]
    async fn send(&mut self, block: &ByteBlock) -> Result<(), StreamerError> {
        let len = frame_len(&self.name, block.len())?;
        let index = self.cursor % self.streams.len();
        self.cursor = self.cursor.wrapping_add(1);

        let stream = &mut self.streams[index];
        let frame = async {
            stream.write_u32_le(len).await?;
            stream.write_all(block).await?;
            stream.flush().await
        };
        frame
            .await
            .map_err(|e| StreamerError::sink_send(&self.name, e.to_string()))?;

        debug!(sink = %self.name, connection = index, "Block pushed");
        Ok(())
    }

    #[instrument(name = "network_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), StreamerError> {
        for stream in &mut self.streams {
            stream
                .shutdown()
                .await
                .map_err(|e| StreamerError::sink_send(&self.name, e.to_string()))?;
        }
        debug!(sink = %self.name, "NetworkSink closed");
        Ok(())
    }
}
