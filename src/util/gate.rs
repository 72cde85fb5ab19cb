//! Admission gate that lets shutdown wait out in-flight submissions.

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

#[derive(Debug)]
struct GateState {
    closed: bool,
    in_flight: usize,
    // dropped once closed with nothing in flight
    drained_tx: Option<Sender<()>>,
}

/// Tracks submissions between "admitted" and "fully enqueued and signalled".
///
/// Once [`close`](AdmissionGate::close) is called no new submission is
/// admitted. The [`drained`](AdmissionGate::drained) receiver disconnects when
/// the gate is closed and the last admitted submission has finished, so every
/// token that will ever be emitted exists by then.
#[derive(Debug)]
pub struct AdmissionGate {
    state: Mutex<GateState>,
    drained_rx: Receiver<()>,
}

/// Held for the duration of one admitted submission.
#[derive(Debug)]
pub struct Admission<'a> {
    gate: &'a AdmissionGate,
}

impl AdmissionGate {
    pub fn new() -> Self {
        // never sends; disconnect is the signal
        let (drained_tx, drained_rx) = bounded(0);
        Self {
            state: Mutex::new(GateState {
                closed: false,
                in_flight: 0,
                drained_tx: Some(drained_tx),
            }),
            drained_rx,
        }
    }

    /// Admit one submission, or `None` once the gate is closed.
    pub fn enter(&self) -> Option<Admission<'_>> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        state.in_flight += 1;
        Some(Admission { gate: self })
    }

    /// Stop admitting. Returns `true` on the first call.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        let first = !state.closed;
        state.closed = true;
        if state.in_flight == 0 {
            state.drained_tx.take();
        }
        first
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    /// Disconnects once closed with no admitted submission outstanding.
    pub fn drained(&self) -> &Receiver<()> {
        &self.drained_rx
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.state.lock();
        state.in_flight -= 1;
        if state.closed && state.in_flight == 0 {
            state.drained_tx.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::TryRecvError;

    fn is_drained(gate: &AdmissionGate) -> bool {
        gate.drained().try_recv() == Err(TryRecvError::Disconnected)
    }

    #[test]
    fn test_close_idle_gate_drains_immediately() {
        let gate = AdmissionGate::new();
        assert!(!is_drained(&gate));

        assert!(gate.close());
        assert!(!gate.close());
        assert!(gate.is_closed());
        assert!(is_drained(&gate));
        assert!(gate.enter().is_none());
    }

    #[test]
    fn test_drain_waits_for_admitted() {
        let gate = AdmissionGate::new();

        let first = gate.enter().unwrap();
        let second = gate.enter().unwrap();
        assert_eq!(gate.in_flight(), 2);

        gate.close();
        assert!(gate.enter().is_none());
        assert!(!is_drained(&gate));

        drop(first);
        assert!(!is_drained(&gate));

        drop(second);
        assert_eq!(gate.in_flight(), 0);
        assert!(is_drained(&gate));
    }

    #[test]
    fn test_open_gate_never_drains() {
        let gate = AdmissionGate::new();
        for _ in 0..3 {
            drop(gate.enter().unwrap());
        }
        assert_eq!(gate.in_flight(), 0);
        assert!(!is_drained(&gate));
    }
}
