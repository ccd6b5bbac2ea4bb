//! Single-slot stability memo owned by one resolver.
//!
//! Remembers the last destination and, when it could be determined, the
//! outcome for it. An unchanged destination replays that outcome instead of
//! asking the provider again, so a verdict never flips on upstream jitter.

use super::types::ResolutionResult;
use crate::distance::Location;

#[derive(Debug, Clone, Default)]
pub struct ResolutionMemo {
    last_address: Option<Location>,
    last_outcome: Option<ResolutionResult>,
}

impl ResolutionMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded outcome for `destination`, if it is the last address and
    /// its outcome is known.
    pub fn lookup(&self, destination: &Location) -> Option<&ResolutionResult> {
        match &self.last_address {
            Some(last) if last == destination => self.last_outcome.as_ref(),
            _ => None,
        }
    }

    /// Record a determined outcome (deliverable or out of range).
    pub fn record(&mut self, destination: &Location, outcome: ResolutionResult) {
        self.last_address = Some(destination.clone());
        self.last_outcome = Some(outcome);
    }

    /// Record the address without asserting any outcome: the distance could
    /// not be determined, so "out of range" would be a lie.
    pub fn record_unknown(&mut self, destination: &Location) {
        self.last_address = Some(destination.clone());
        self.last_outcome = None;
    }

    pub fn last_address(&self) -> Option<&Location> {
        self.last_address.as_ref()
    }

    /// `Some(true)` when the last address was classified out of range,
    /// `None` when no outcome is known.
    pub fn last_was_out_of_range(&self) -> Option<bool> {
        self.last_outcome.as_ref().map(ResolutionResult::is_out_of_range)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::DeliveryZone;

    #[test]
    fn test_memo_hit_same_address() {
        let mut memo = ResolutionMemo::new();
        let dest = Location::address("Av. Paulista, 1000");
        memo.record(&dest, ResolutionResult::out_of_range(25.0));

        let hit = memo.lookup(&dest).unwrap();
        assert_eq!(hit.distance_km, Some(25.0));
        assert_eq!(memo.last_was_out_of_range(), Some(true));
    }

    #[test]
    fn test_memo_miss_other_address() {
        let mut memo = ResolutionMemo::new();
        memo.record(&Location::address("A"), ResolutionResult::out_of_range(25.0));
        assert!(memo.lookup(&Location::address("B")).is_none());
    }

    #[test]
    fn test_memo_single_slot() {
        let mut memo = ResolutionMemo::new();
        let zone = DeliveryZone::new("z", 0.0, 5.0, 3.0);
        memo.record(&Location::address("A"), ResolutionResult::deliverable(&zone, 1.0));
        memo.record(&Location::address("B"), ResolutionResult::out_of_range(9.0));

        assert!(memo.lookup(&Location::address("A")).is_none());
        assert_eq!(memo.last_address(), Some(&Location::address("B")));
    }

    #[test]
    fn test_memo_unknown_outcome_never_replays() {
        let mut memo = ResolutionMemo::new();
        let dest = Location::address("A");
        memo.record(&dest, ResolutionResult::out_of_range(25.0));
        memo.record_unknown(&dest);

        assert!(memo.lookup(&dest).is_none());
        assert_eq!(memo.last_was_out_of_range(), None);
        assert_eq!(memo.last_address(), Some(&dest));
    }

    #[test]
    fn test_memo_clear() {
        let mut memo = ResolutionMemo::new();
        memo.record(&Location::address("A"), ResolutionResult::out_of_range(25.0));
        memo.clear();
        assert!(memo.last_address().is_none());
    }
}
