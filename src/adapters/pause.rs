//! # Cooperative pausing.
//!
//! [`PauseTokenSource`] is the controlling half, [`PauseToken`] the observing
//! half handed to the computation. Pausing is cooperative: the computation
//! decides where it checks the token.
//!
//! ```text
//! PauseTokenSource ── pause()/resume() ──┬──► watch<bool> ──► PauseToken::wait_while_paused()
//!   (any clone)                          └──► listeners (sync, on every transition)
//! ```
//!
//! ## Rules
//! - Listeners run on the thread that paused or resumed, after the state flipped.
//! - Repeated `pause()` (or `resume()`) is a no-op and notifies nobody.

use std::sync::Arc;

use tokio::sync::watch;

use crate::events::{Notifier, Subscription};

/// Controlling half: requests pause and resume.
///
/// Cloning yields a handle to the same pause state.
#[derive(Clone, Debug)]
pub struct PauseTokenSource {
    tx: Arc<watch::Sender<bool>>,
    listeners: Arc<Notifier<bool>>,
}

impl PauseTokenSource {
    /// Creates a source in the running (not paused) state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            listeners: Arc::new(Notifier::new()),
        }
    }

    /// Requests a pause. Returns `false` if already paused.
    pub fn pause(&self) -> bool {
        self.set(true)
    }

    /// Lifts a pause. Returns `false` if not paused.
    pub fn resume(&self) -> bool {
        self.set(false)
    }

    fn set(&self, paused: bool) -> bool {
        let flipped = self
            .tx
            .send_if_modified(|current| std::mem::replace(current, paused) != paused);
        if flipped {
            self.listeners.emit(&paused);
        }
        flipped
    }

    /// Calls `f` with the new state on every pause/resume transition, whichever
    /// clone of this source caused it.
    pub(crate) fn on_transition<F>(&self, f: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.listeners.subscribe_fn(f)
    }

    /// True while a pause is requested.
    pub fn is_paused(&self) -> bool {
        *self.tx.borrow()
    }

    /// Creates an observing token.
    pub fn token(&self) -> PauseToken {
        PauseToken {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for PauseTokenSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Observing half: checked by the computation at its pause points.
#[derive(Clone, Debug)]
pub struct PauseToken {
    rx: watch::Receiver<bool>,
}

impl PauseToken {
    /// True while a pause is requested.
    pub fn is_paused(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits until no pause is requested. Returns immediately when running.
    ///
    /// If the source is dropped while paused, the pause can never be lifted
    /// and this returns.
    pub async fn wait_while_paused(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|paused| !*paused).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_pause_resume_transitions() {
        let source = PauseTokenSource::new();
        let token = source.token();
        assert!(!token.is_paused());

        assert!(source.pause());
        assert!(!source.pause());
        assert!(token.is_paused());

        assert!(source.resume());
        assert!(!source.resume());
        assert!(!source.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_while_paused_blocks_until_resume() {
        let source = PauseTokenSource::new();
        let token = source.token();
        source.pause();

        let waiter = tokio::spawn(async move { token.wait_while_paused().await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        source.resume();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_transitions_reach_listeners_from_any_clone() {
        let source = PauseTokenSource::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let _sub = {
            let seen = Arc::clone(&seen);
            source.on_transition(move |paused| seen.lock().push(*paused))
        };

        let remote = source.clone();
        remote.pause();
        remote.pause();
        source.resume();
        assert_eq!(*seen.lock(), vec![true, false]);
    }
}
