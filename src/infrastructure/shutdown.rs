use tokio::sync::watch;

#[derive(Clone)]
pub struct Shutdown {
    sender: watch::Sender<bool>,
}

#[derive(Clone)]
pub struct ShutdownListener {
    receiver: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> (Self, ShutdownListener) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, ShutdownListener { receiver })
    }

    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            receiver: self.sender.subscribe(),
        }
    }

    /// Stores the flag even when nobody is subscribed yet.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }
}

impl ShutdownListener {
    pub async fn notified(&mut self) {
        if *self.receiver.borrow() {
            return;
        }
        let _ = self.receiver.changed().await;
    }

    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }
}

pub fn install_signal_handlers(shutdown: Shutdown) {
    let ctrlc = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(target: "monitor", "interrupt received (Ctrl-C)");
            ctrlc.trigger();
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let term = shutdown.clone();
        tokio::spawn(async move {
            if let Ok(mut sig) = signal(SignalKind::terminate()) {
                sig.recv().await;
                tracing::info!(target: "monitor", "interrupt received (SIGTERM)");
                term.trigger();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn listeners_observe_trigger() {
        let (shutdown, mut listener) = Shutdown::new();
        let late = shutdown.subscribe();
        assert!(!listener.is_triggered());

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), listener.notified())
            .await
            .unwrap();
        assert!(listener.is_triggered());
        assert!(late.is_triggered());
    }

    #[tokio::test]
    async fn notified_returns_immediately_after_trigger() {
        let (shutdown, _) = Shutdown::new();
        shutdown.trigger();
        let mut listener = shutdown.subscribe();
        tokio::time::timeout(Duration::from_millis(50), listener.notified())
            .await
            .unwrap();
    }
}
