use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::config::ClientConfig;

/// Coalesces bursts of values and forwards only the latest one once the
/// input has been quiet for the configured window.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the debouncing task on the current tokio runtime. Returns the
    /// debouncer and the receiver of settled values.
    pub fn spawn(quiet: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input, input_rx) = mpsc::unbounded_channel();
        let (output, output_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(input_rx, output, quiet));
        (Self { input }, output_rx)
    }

    /// Spawn with the quiet window from `[client] debounce_ms`.
    pub fn from_config(config: &ClientConfig) -> (Self, mpsc::UnboundedReceiver<T>) {
        Self::spawn(config.debounce())
    }

    /// Queue a value. Returns `false` once the debouncer has shut down.
    pub fn push(&self, value: T) -> bool {
        self.input.send(value).is_ok()
    }
}

async fn run<T>(mut input: mpsc::UnboundedReceiver<T>, output: mpsc::UnboundedSender<T>, quiet: Duration) {
    while let Some(mut latest) = input.recv().await {
        loop {
            match timeout(quiet, input.recv()).await {
                Ok(Some(value)) => latest = value,
                // Sender dropped: flush what we have and stop
                Ok(None) => {
                    let _ = output.send(latest);
                    return;
                }
                Err(_) => break,
            }
        }
        if output.send(latest).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_yields_only_latest() {
        let (debouncer, mut settled) = Debouncer::spawn(Duration::from_millis(50));
        for value in 1..=5 {
            assert!(debouncer.push(value));
        }

        let value = timeout(Duration::from_secs(2), settled.recv()).await.unwrap();
        assert_eq!(value, Some(5));

        // Nothing else was queued behind the settled value
        let extra = timeout(Duration::from_millis(200), settled.recv()).await;
        assert!(extra.is_err());
    }

    #[tokio::test]
    async fn test_separate_bursts_each_settle() {
        let (debouncer, mut settled) = Debouncer::spawn(Duration::from_millis(20));
        debouncer.push("first");
        assert_eq!(timeout(Duration::from_secs(2), settled.recv()).await.unwrap(), Some("first"));

        debouncer.push("second");
        debouncer.push("third");
        assert_eq!(timeout(Duration::from_secs(2), settled.recv()).await.unwrap(), Some("third"));
    }

    #[tokio::test]
    async fn test_quiet_window_comes_from_config() {
        let config = ClientConfig { debounce_ms: 150 };
        let (debouncer, mut settled) = Debouncer::from_config(&config);
        let started = std::time::Instant::now();
        debouncer.push(1);

        // Still inside the configured window
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(settled.try_recv().is_err());

        assert_eq!(timeout(Duration::from_secs(2), settled.recv()).await.unwrap(), Some(1));
        assert!(started.elapsed() >= config.debounce());
    }

    #[tokio::test]
    async fn test_drop_flushes_pending_value() {
        let (debouncer, mut settled) = Debouncer::spawn(Duration::from_secs(30));
        debouncer.push(7);
        drop(debouncer);
        assert_eq!(timeout(Duration::from_secs(2), settled.recv()).await.unwrap(), Some(7));
        assert_eq!(settled.recv().await, None);
    }
}
