//! Global admission control shared by every priority level.

use crossbeam_channel::{bounded, select, Receiver, Sender};

/// Bounded counting signal: one token per payload resident in any queue.
///
/// Capacity is the global pending-task budget, independent of how many
/// priority levels exist. `emit` blocks while the budget is exhausted and
/// `acquire` blocks while no token is outstanding.
#[derive(Debug)]
pub struct WorkTokens {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl WorkTokens {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Emit one token, blocking on a full budget.
    ///
    /// Both ends live in `self`, so the send cannot fail.
    pub fn emit(&self) {
        let _ = self.tx.send(());
    }

    /// Consume one token, blocking while none is outstanding.
    ///
    /// Returns `false` without consuming once `stop` disconnects and no token
    /// is ready.
    pub fn acquire(&self, stop: &Receiver<()>) -> bool {
        if self.try_acquire() {
            return true;
        }
        select! {
            recv(self.rx) -> res => res.is_ok(),
            recv(stop) -> _ => false,
        }
    }

    pub fn try_acquire(&self) -> bool {
        self.rx.try_recv().is_ok()
    }

    /// Tokens emitted and not yet consumed.
    pub fn outstanding(&self) -> usize {
        self.rx.len()
    }

    #[cfg(test)]
    fn try_emit(&self) -> bool {
        self.tx.try_send(()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn stop_pair() -> (Sender<()>, Receiver<()>) {
        bounded(0)
    }

    #[test]
    fn test_budget_is_exact() {
        let tokens = WorkTokens::new(3);
        let (_keep, stop) = stop_pair();

        for _ in 0..3 {
            tokens.emit();
        }
        assert_eq!(tokens.outstanding(), 3);
        assert!(!tokens.try_emit());

        assert!(tokens.acquire(&stop));
        assert_eq!(tokens.outstanding(), 2);
        assert!(tokens.try_emit());
        assert_eq!(tokens.outstanding(), 3);
    }

    #[test]
    fn test_zero_capacity_coerced() {
        let tokens = WorkTokens::new(0);
        assert!(tokens.try_emit());
        assert!(!tokens.try_emit());
    }

    #[test]
    fn test_try_acquire_empty() {
        let tokens = WorkTokens::new(2);
        assert!(!tokens.try_acquire());
        tokens.emit();
        assert!(tokens.try_acquire());
        assert!(!tokens.try_acquire());
    }

    #[test]
    fn test_stop_unblocks_idle_acquire() {
        let tokens = WorkTokens::new(1);
        let (stop_tx, stop) = stop_pair();

        let handle = thread::spawn(move || tokens.acquire(&stop));
        thread::sleep(Duration::from_millis(50));
        drop(stop_tx);

        assert!(!handle.join().unwrap());
    }

    #[test]
    fn test_ready_token_wins_over_stop() {
        let tokens = WorkTokens::new(1);
        let (stop_tx, stop) = stop_pair();
        drop(stop_tx);

        tokens.emit();
        assert!(tokens.acquire(&stop));
        assert!(!tokens.acquire(&stop));
    }

    #[test]
    fn test_blocked_emit_resumes_after_acquire() {
        let tokens = Arc::new(WorkTokens::new(1));
        let (_keep, stop) = stop_pair();
        tokens.emit();

        let producer = {
            let tokens = tokens.clone();
            thread::spawn(move || tokens.emit())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished());

        assert!(tokens.acquire(&stop));
        producer.join().unwrap();
        assert_eq!(tokens.outstanding(), 1);
    }
}
