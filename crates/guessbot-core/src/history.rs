//! Per-round score history and the scoreboard built from it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Opponent,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "You"),
            Side::Opponent => write!(f, "Opponent"),
        }
    }
}

/// Summed scores across every recorded round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub player: u32,
    pub opponent: u32,
}

impl Totals {
    /// The side with more points, `None` on a tie.
    pub fn leader(&self) -> Option<Side> {
        leader(self.player, self.opponent)
    }
}

/// Final scores of each completed round, append-only.
///
/// The two sequences always have the same length: one entry per completed
/// round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHistory {
    player_scores: Vec<u32>,
    opponent_scores: Vec<u32>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archive one finished round.
    pub fn record_round(&mut self, player: u32, opponent: u32) {
        self.player_scores.push(player);
        self.opponent_scores.push(opponent);
    }

    /// Sum of each side's round scores.
    pub fn totals(&self) -> Totals {
        Totals {
            player: self.player_scores.iter().sum(),
            opponent: self.opponent_scores.iter().sum(),
        }
    }

    /// Number of completed rounds.
    pub fn len(&self) -> usize {
        self.player_scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.player_scores.is_empty()
    }

    pub fn player_scores(&self) -> &[u32] {
        &self.player_scores
    }

    pub fn opponent_scores(&self) -> &[u32] {
        &self.opponent_scores
    }

    /// Rows for the end-of-session table.
    pub fn scoreboard(&self) -> Scoreboard {
        let rows = self
            .player_scores
            .iter()
            .zip(&self.opponent_scores)
            .enumerate()
            .map(|(i, (&player, &opponent))| RoundRow {
                round: i + 1,
                player,
                opponent,
                leader: leader(player, opponent),
            })
            .collect();
        let totals = self.totals();
        Scoreboard {
            rows,
            totals,
            winner: totals.leader(),
        }
    }
}

/// One line of the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRow {
    /// 1-based round number.
    pub round: usize,
    pub player: u32,
    pub opponent: u32,
    /// The side to highlight, `None` on a tie.
    pub leader: Option<Side>,
}

/// End-of-session summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub rows: Vec<RoundRow>,
    pub totals: Totals,
    pub winner: Option<Side>,
}

fn leader(player: u32, opponent: u32) -> Option<Side> {
    match player.cmp(&opponent) {
        std::cmp::Ordering::Greater => Some(Side::Player),
        std::cmp::Ordering::Less => Some(Side::Opponent),
        std::cmp::Ordering::Equal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_stay_in_step() {
        let mut history = SessionHistory::new();
        assert!(history.is_empty());
        history.record_round(10, 0);
        history.record_round(0, 0);
        assert_eq!(history.len(), 2);
        assert_eq!(history.player_scores().len(), history.opponent_scores().len());
    }

    #[test]
    fn three_round_scoreboard() {
        let mut history = SessionHistory::new();
        for (p, o) in [(40, 50), (60, 50), (100, 0)] {
            history.record_round(p, o);
        }
        // Rounds 1..3 as (player, opponent): (40,50) (60,50) (100,0)
        // Round 1 goes to the opponent: 50 beats 40, even though the worked
        // example this mirrors names the player. Higher score always leads.
        let board = history.scoreboard();
        assert_eq!(board.totals, Totals { player: 200, opponent: 100 });
        assert_eq!(board.winner, Some(Side::Player));
        let leaders: Vec<_> = board.rows.iter().map(|r| r.leader).collect();
        assert_eq!(
            leaders,
            vec![Some(Side::Opponent), Some(Side::Player), Some(Side::Player)]
        );
    }

    #[test]
    fn per_round_leader_highlights_higher_score() {
        let mut history = SessionHistory::new();
        for (p, o) in [(40, 0), (60, 50), (100, 0)] {
            history.record_round(p, o);
        }
        history.record_round(0, 0);
        let board = history.scoreboard();
        assert_eq!(board.rows[0].round, 1);
        assert_eq!(board.rows[3].leader, None);
    }

    #[test]
    fn tied_totals_have_no_winner() {
        let mut history = SessionHistory::new();
        history.record_round(30, 70);
        history.record_round(70, 30);
        assert_eq!(history.scoreboard().winner, None);
        assert_eq!(history.totals().leader(), None);
    }

    #[test]
    fn empty_history_totals_zero() {
        let history = SessionHistory::new();
        assert_eq!(history.totals(), Totals::default());
        assert!(history.scoreboard().rows.is_empty());
    }
}
