#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Health,
    Chat,
    Forward,
    Inverse,
}

impl Operation {
    fn index(self) -> usize {
        match self {
            Operation::Health => 0,
            Operation::Chat => 1,
            Operation::Forward => 2,
            Operation::Inverse => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    pub op: Operation,
    seq: u64,
}

/// Per-operation request tokens.
///
/// Every request carries the token it was issued with. Issuing a new token for
/// the same operation, or cancelling, makes older tokens stale so their late
/// responses can be dropped instead of overwriting newer results.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: [u64; 4],
    in_flight: [bool; 4],
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, op: Operation) -> RequestToken {
        let i = op.index();
        self.latest[i] += 1;
        self.in_flight[i] = true;
        RequestToken { op, seq: self.latest[i] }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.in_flight[token.op.index()] && self.latest[token.op.index()] == token.seq
    }

    pub fn is_busy(&self, op: Operation) -> bool {
        self.in_flight[op.index()]
    }

    /// Accept a completion. Returns false when the token is stale.
    pub fn finish(&mut self, token: RequestToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.in_flight[token.op.index()] = false;
        true
    }

    /// Invalidate whatever is in flight for `op`. Returns true if something was.
    pub fn cancel(&mut self, op: Operation) -> bool {
        let i = op.index();
        let was_busy = self.in_flight[i];
        self.latest[i] += 1;
        self.in_flight[i] = false;
        was_busy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_request_wins() {
        let mut tracker = RequestTracker::new();
        let first = tracker.issue(Operation::Forward);
        let second = tracker.issue(Operation::Forward);

        assert!(!tracker.finish(first));
        assert!(tracker.is_busy(Operation::Forward));
        assert!(tracker.finish(second));
        assert!(!tracker.is_busy(Operation::Forward));
    }

    #[test]
    fn operations_are_independent() {
        let mut tracker = RequestTracker::new();
        let chat = tracker.issue(Operation::Chat);
        let inverse = tracker.issue(Operation::Inverse);

        assert!(tracker.finish(inverse));
        assert!(tracker.is_busy(Operation::Chat));
        assert!(tracker.finish(chat));
    }

    #[test]
    fn cancelled_token_is_stale() {
        let mut tracker = RequestTracker::new();
        let token = tracker.issue(Operation::Chat);
        assert!(tracker.cancel(Operation::Chat));
        assert!(!tracker.finish(token));
        assert!(!tracker.cancel(Operation::Chat));
    }

    #[test]
    fn token_is_accepted_once() {
        let mut tracker = RequestTracker::new();
        let token = tracker.issue(Operation::Health);
        assert!(tracker.finish(token));
        assert!(!tracker.finish(token));
    }
}
