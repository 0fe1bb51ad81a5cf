//! Unified error type for the server binary.

use dicedown_protocol::ProtocolError;
use dicedown_transport::TransportError;

/// Top-level error that wraps the sub-crate errors the gateway can hit.
///
/// Rule rejections (`dicedown_core::Reject`) are not represented here:
/// they are answers to the client, reported as `ActionRejected` events,
/// never errors of the server itself.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
