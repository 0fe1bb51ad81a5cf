/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listener failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// The WebSocket upgrade handshake failed.
    #[error("websocket handshake failed: {0}")]
    Handshake(String),

    /// Sending a message failed; the peer is assumed gone.
    #[error("send failed: {0}")]
    Send(String),

    /// Receiving a message failed; the peer is assumed gone.
    #[error("receive failed: {0}")]
    Receive(String),
}
