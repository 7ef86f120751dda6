/// Line-oriented duplex connection to a peer.
///
/// `recv_line` yields `Ok(None)` once the peer has closed the connection.
#[async_trait::async_trait]
pub trait Transport: Send {
    async fn send_line(&mut self, line: &str) -> anyhow::Result<()>;
    async fn recv_line(&mut self) -> anyhow::Result<Option<String>>;
    async fn close(&mut self) -> anyhow::Result<()>;
}

pub mod in_memory;
pub mod tcp;
