use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The shared tally record. This is the only value that ever crosses the
/// counter/display boundary, serialized with the field names both sides read:
/// `{ "votes": [...], "invalidVotes": n, "isFinalized": bool }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyRecord {
    pub votes: Vec<u64>,
    pub invalid_votes: u64,
    pub is_finalized: bool,
}

impl TallyRecord {
    pub fn new(candidate_count: usize) -> Self {
        Self {
            votes: vec![0; candidate_count],
            invalid_votes: 0,
            is_finalized: false,
        }
    }

    /// Total ballots cast, invalid ones included.
    pub fn total_votes(&self) -> u64 {
        self.votes.iter().sum::<u64>() + self.invalid_votes
    }
}

/// Bounded history of pre-mutation snapshots, most recent first.
///
/// Pushing past the bound evicts the oldest snapshot. The stack lives only
/// in the counter process and is never persisted.
pub struct UndoStack {
    snapshots: VecDeque<TallyRecord>,
    limit: usize,
}

impl UndoStack {
    pub fn new(limit: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            limit,
        }
    }

    pub fn push(&mut self, snapshot: TallyRecord) {
        self.snapshots.push_front(snapshot);
        self.snapshots.truncate(self.limit);
    }

    pub fn pop(&mut self) -> Option<TallyRecord> {
        self.snapshots.pop_front()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_shared_field_names() {
        let record = TallyRecord::new(2);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"votes":[0,0],"invalidVotes":0,"isFinalized":false}"#
        );
    }

    #[test]
    fn total_counts_invalid_ballots() {
        let record = TallyRecord {
            votes: vec![3, 1, 0],
            invalid_votes: 2,
            is_finalized: false,
        };
        assert_eq!(record.total_votes(), 6);
    }

    #[test]
    fn pop_returns_most_recent_snapshot() {
        let mut stack = UndoStack::new(10);
        let mut record = TallyRecord::new(1);
        stack.push(record.clone());
        record.votes[0] = 1;
        stack.push(record.clone());

        assert_eq!(stack.pop().unwrap().votes, vec![1]);
        assert_eq!(stack.pop().unwrap().votes, vec![0]);
        assert!(stack.pop().is_none());
    }

    #[test]
    fn eviction_drops_the_oldest_snapshot() {
        let mut stack = UndoStack::new(3);
        for i in 0..5u64 {
            let mut record = TallyRecord::new(1);
            record.votes[0] = i;
            stack.push(record);
        }

        assert_eq!(stack.len(), 3);
        // Snapshots 0 and 1 were evicted; 4, 3, 2 remain, newest first.
        assert_eq!(stack.pop().unwrap().votes, vec![4]);
        assert_eq!(stack.pop().unwrap().votes, vec![3]);
        assert_eq!(stack.pop().unwrap().votes, vec![2]);
        assert!(stack.is_empty());
    }
}
