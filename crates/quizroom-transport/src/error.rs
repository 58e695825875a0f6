/// Errors raised while accepting or talking to a participant connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No frame arrived from the peer within the idle timeout.
    #[error("connection idle for {0:?}")]
    Idle(std::time::Duration),

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener or upgrading an accepted socket failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}
