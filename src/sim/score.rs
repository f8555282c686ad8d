//! Session score fed by pool returns

use serde::{Deserialize, Serialize};

use super::pool::{ReturnReason, Returned};

/// Running score for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub score: u64,
}

impl ScoreBoard {
    /// Count obstacles that fell off screen. Drained instances score nothing.
    /// Returns the number of points added.
    pub fn on_returned(&mut self, returned: &[Returned]) -> u64 {
        let points = returned
            .iter()
            .filter(|r| r.reason == ReturnReason::OffScreen)
            .count() as u64;
        self.score += points;
        points
    }

    pub fn reset(&mut self) {
        self.score = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pool::InstanceId;

    fn returned(reason: ReturnReason) -> Returned {
        Returned {
            key: "Obstacle".to_string(),
            id: InstanceId(0),
            reason,
        }
    }

    #[test]
    fn test_off_screen_scores_drain_does_not() {
        let mut board = ScoreBoard::default();
        let batch = [
            returned(ReturnReason::OffScreen),
            returned(ReturnReason::Drained),
            returned(ReturnReason::OffScreen),
        ];
        assert_eq!(board.on_returned(&batch), 2);
        assert_eq!(board.score, 2);
        board.reset();
        assert_eq!(board.score, 0);
    }
}
