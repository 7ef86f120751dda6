use std::net::SocketAddr;

use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::transport::Transport;

/// Longest line accepted from a peer (a full 15×10 board fits comfortably).
const MAX_LINE_LENGTH: u64 = 64 * 1024;

/// Newline-delimited text over TCP.
///
/// A background task reads lines and queues them in arrival order, so a line
/// that arrives while nobody is waiting for it is never lost.
pub struct TcpTransport {
    writer: Option<OwnedWriteHalf>,
    lines: UnboundedReceiver<anyhow::Result<String>>,
    reader: JoinHandle<()>,
    peer: Option<SocketAddr>,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        let (read, write) = stream.into_split();
        let (tx, rx) = unbounded_channel();
        let reader = tokio::spawn(read_lines(read, tx));
        Self {
            writer: Some(write),
            lines: rx,
            reader,
            peer,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}

async fn read_lines(read: OwnedReadHalf, tx: UnboundedSender<anyhow::Result<String>>) {
    let mut reader = BufReader::new(read);
    loop {
        let mut line = String::new();
        let result = (&mut reader)
            .take(MAX_LINE_LENGTH + 1)
            .read_line(&mut line)
            .await;
        match result {
            Ok(0) => break,
            Ok(n) if n as u64 > MAX_LINE_LENGTH => {
                let _ = tx.send(Err(anyhow::anyhow!(
                    "Line too long (max: {} bytes)",
                    MAX_LINE_LENGTH
                )));
                break;
            }
            Ok(_) => {
                let line = line.trim_end_matches(['\r', '\n']).to_string();
                if tx.send(Ok(line)).is_err() {
                    break;
                }
            }
            Err(e) => {
                let err = match e.kind() {
                    std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::UnexpectedEof => {
                        debug!("Connection closed by peer: {}", e);
                        break;
                    }
                    _ => anyhow::anyhow!("Read error: {}", e),
                };
                let _ = tx.send(Err(err));
                break;
            }
        }
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Transport is closed"))?;
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        writer.write_all(&data).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::BrokenPipe
                || e.kind() == std::io::ErrorKind::ConnectionReset
            {
                anyhow::anyhow!("Connection closed by peer")
            } else {
                anyhow::anyhow!("Write error: {}", e)
            }
        })
    }

    async fn recv_line(&mut self) -> anyhow::Result<Option<String>> {
        match self.lines.recv().await {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.shutdown().await;
        }
        self.reader.abort();
        Ok(())
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
