// Scheduler stop signal

use tokio::sync::watch;

/// Receiving side of the stop signal
#[derive(Clone)]
pub struct StopToken {
    rx: watch::Receiver<bool>,
}

impl StopToken {
    /// Check if a stop was requested
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until a stop is requested
    ///
    /// Also returns if the handle is dropped.
    pub async fn wait(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Sending side of the stop signal
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a stop channel
pub fn stop_channel() -> (StopHandle, StopToken) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_returns_after_stop() {
        let (handle, mut token) = stop_channel();
        assert!(!token.is_stopped());
        handle.stop();
        token.wait().await;
        assert!(token.is_stopped());
    }

    #[tokio::test]
    async fn test_wait_returns_when_handle_dropped() {
        let (handle, mut token) = stop_channel();
        drop(handle);
        token.wait().await;
    }

    #[tokio::test]
    async fn test_clones_observe_same_signal() {
        let (handle, token) = stop_channel();
        let mut other = token.clone();
        handle.stop();
        other.wait().await;
        assert!(token.is_stopped());
    }
}
