//! A transport paired with the protocol codec: sends and receives `Message`s.

use log::debug;

use crate::protocol::{Message, ProtocolCodec, ProtocolError};
use crate::transport::Transport;

/// What arrived on a link.
#[derive(Debug)]
pub enum Inbound {
    Message(Message),
    /// A line arrived but could not be decoded.
    Malformed(ProtocolError),
    /// The peer closed the connection (or it failed).
    Closed,
}

pub struct Link {
    transport: Box<dyn Transport>,
    codec: ProtocolCodec,
    label: String,
}

impl Link {
    pub fn new(transport: Box<dyn Transport>, codec: ProtocolCodec) -> Self {
        Self {
            transport,
            codec,
            label: String::from("peer"),
        }
    }

    /// Name used when logging traffic on this link.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn codec(&self) -> ProtocolCodec {
        self.codec
    }

    pub async fn send(&mut self, msg: &Message) -> anyhow::Result<()> {
        let line = self.codec.encode(msg).map_err(|e| anyhow::anyhow!(e))?;
        debug!("-> {}: {}", self.label, line);
        self.transport.send_line(&line).await
    }

    pub async fn recv(&mut self) -> Inbound {
        match self.transport.recv_line().await {
            Ok(Some(line)) => {
                debug!("<- {}: {}", self.label, line);
                match self.codec.decode(&line) {
                    Ok(msg) => Inbound::Message(msg),
                    Err(e) => Inbound::Malformed(e),
                }
            }
            Ok(None) => Inbound::Closed,
            Err(e) => {
                debug!("{} read failed: {}", self.label, e);
                Inbound::Closed
            }
        }
    }

    pub async fn close(&mut self) -> anyhow::Result<()> {
        self.transport.close().await
    }
}
