//! UDP pose sender (tracker side)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;

use mimic_core::{MimicError, MimicResult, PoseFrame};
use mimic_wire::encode_frame;

use crate::DEFAULT_POSE_PORT;

/// Default destination for pose datagrams
pub fn default_target() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_POSE_PORT)
}

/// Sends encoded pose frames to a single receiver
pub struct PoseSender {
    socket: UdpSocket,
    target: SocketAddr,
}

impl PoseSender {
    /// Bind an ephemeral local socket for sending to `target`
    pub async fn new(target: SocketAddr) -> MimicResult<Self> {
        let local: SocketAddr = if target.is_ipv4() {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
        } else {
            SocketAddr::new(IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED), 0)
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| MimicError::TransportError(e.to_string()))?;
        Ok(PoseSender { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Encode and send one frame
    pub async fn send(&self, frame: &PoseFrame) -> MimicResult<()> {
        let text = encode_frame(frame)?;
        self.send_text(&text).await
    }

    /// Send a raw text message
    pub async fn send_text(&self, text: &str) -> MimicResult<()> {
        self.socket
            .send_to(text.as_bytes(), self.target)
            .await
            .map_err(|e| MimicError::TransportError(e.to_string()))?;
        Ok(())
    }
}
