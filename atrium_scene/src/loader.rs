//! Epoch-stamped load admission. Texture decodes finish on their own
//! schedule; a gallery that was disposed while a decode was in flight
//! must ignore the result instead of attaching it to a torn-down scene.

use log::debug;

/// Monotonic generation counter for one gallery slot. Bumped on every
/// dispose; tickets from earlier generations are stale.
#[derive(Debug, Default)]
pub struct LoadGate {
    epoch: u64,
}

/// Proof that a load was started under a particular generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    epoch: u64,
}

impl LoadGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Stamp an in-flight load with the current generation.
    pub fn issue(&self) -> LoadTicket {
        LoadTicket { epoch: self.epoch }
    }

    /// Invalidate every outstanding ticket. Called on dispose.
    pub fn advance(&mut self) {
        self.epoch += 1;
        debug!("load gate advanced to epoch {}", self.epoch);
    }

    /// True when the ticket's generation is still live.
    pub fn admits(&self, ticket: LoadTicket) -> bool {
        ticket.epoch == self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_is_admitted_until_the_gate_advances() {
        let mut gate = LoadGate::new();
        let ticket = gate.issue();
        assert!(gate.admits(ticket));
        gate.advance();
        assert!(!gate.admits(ticket));
    }

    #[test]
    fn tickets_issued_after_advance_are_live() {
        let mut gate = LoadGate::new();
        let stale = gate.issue();
        gate.advance();
        let fresh = gate.issue();
        assert!(!gate.admits(stale));
        assert!(gate.admits(fresh));
    }

    #[test]
    fn repeated_disposal_keeps_invalidating() {
        let mut gate = LoadGate::new();
        for _ in 0..3 {
            let ticket = gate.issue();
            gate.advance();
            assert!(!gate.admits(ticket));
        }
        assert_eq!(gate.epoch(), 3);
    }
}
