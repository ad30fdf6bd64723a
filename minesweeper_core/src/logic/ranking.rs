use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    Dnf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub player_id: String,
    pub name: String,
    /// Seconds from first reveal to completion; `None` for a DNF.
    pub time: Option<f64>,
    pub outcome: Outcome,
}

impl RankingEntry {
    fn sort_key(&self) -> (bool, f64) {
        (
            self.outcome == Outcome::Dnf,
            self.time.unwrap_or(f64::INFINITY),
        )
    }

    fn rank_cmp(&self, other: &Self) -> Ordering {
        let (a_dnf, a_time) = self.sort_key();
        let (b_dnf, b_time) = other.sort_key();
        a_dnf.cmp(&b_dnf).then_with(|| a_time.total_cmp(&b_time))
    }
}

/// Race standings: completions by ascending time, then DNFs in the order they
/// happened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rankings(Vec<RankingEntry>);

impl Rankings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[RankingEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `player_id` already finished this game, either way.
    pub fn contains(&self, player_id: &str) -> bool {
        self.0.iter().any(|entry| entry.player_id == player_id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn record_completed(&mut self, player_id: &str, name: &str, elapsed: Duration) {
        self.push(RankingEntry {
            player_id: player_id.to_string(),
            name: name.to_string(),
            time: Some(elapsed.as_secs_f64()),
            outcome: Outcome::Completed,
        });
    }

    pub fn record_dnf(&mut self, player_id: &str, name: &str) {
        self.push(RankingEntry {
            player_id: player_id.to_string(),
            name: name.to_string(),
            time: None,
            outcome: Outcome::Dnf,
        });
    }

    fn push(&mut self, entry: RankingEntry) {
        self.0.push(entry);
        // Stable sort keeps DNFs in append order.
        self.0.sort_by(RankingEntry::rank_cmp);
    }
}
