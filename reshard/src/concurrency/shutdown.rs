use tokio::sync::watch;

/// Notification side of the shutdown channel.
///
/// Cheap to clone; every component that may need to stop the monitor holds
/// one. Signalling is a broadcast, all subscribed receivers wake up.
#[derive(Debug, Clone)]
pub struct ShutdownTx(watch::Sender<()>);

impl ShutdownTx {
    /// Signals shutdown to every subscribed receiver.
    pub fn shutdown(&self) -> Result<(), watch::error::SendError<()>> {
        self.0.send(())
    }

    /// Creates a new receiver subscribed to this sender.
    pub fn subscribe(&self) -> ShutdownRx {
        self.0.subscribe()
    }
}

/// Receiving side of the shutdown channel; `changed().await` resolves once
/// shutdown has been signalled.
pub type ShutdownRx = watch::Receiver<()>;

/// Creates a new pair of [`ShutdownTx`] and [`ShutdownRx`].
pub fn create_shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = watch::channel(());

    (ShutdownTx(tx), rx)
}
