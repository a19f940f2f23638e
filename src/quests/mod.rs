//! Quest log
//!
//! Counter quests fed by gameplay events: discovering places, defeating
//! enemies and praying at shrines. Progress is clamped to the goal and a
//! quest completes exactly once; the caller pays out the reward.

use serde::{Deserialize, Serialize};

pub const EXPLORE_WORLD: &str = "explore_world";
pub const MASTER_COMBAT: &str = "master_combat";
pub const SHRINE_VISITOR: &str = "shrine_visitor";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub progress: u32,
    pub max_progress: u32,
    pub reward_xp: u32,
    pub completed: bool,
}

impl Quest {
    fn new(id: &str, title: &str, description: &str, max_progress: u32, reward_xp: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            progress: 0,
            max_progress,
            reward_xp,
            completed: false,
        }
    }

    pub fn progress_percent(&self) -> f32 {
        if self.max_progress == 0 {
            return 1.0;
        }
        (self.progress as f32 / self.max_progress as f32).min(1.0)
    }
}

/// Progress change reported back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestUpdate {
    pub id: String,
    pub title: String,
    pub progress: u32,
    pub max_progress: u32,
    /// Set only on the update that completed the quest
    pub reward_xp: Option<u32>,
}

impl QuestUpdate {
    pub fn completed(&self) -> bool {
        self.reward_xp.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestLog {
    pub quests: Vec<Quest>,
}

impl Default for QuestLog {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestLog {
    /// The starting quests of a new session
    pub fn new() -> Self {
        Self {
            quests: vec![
                Quest::new(
                    EXPLORE_WORLD,
                    "Explorer of Tsushima",
                    "Explore the island and discover 5 different locations.",
                    5,
                    100,
                ),
                Quest::new(
                    MASTER_COMBAT,
                    "Way of the Samurai",
                    "Defeat 10 enemies.",
                    10,
                    200,
                ),
                Quest::new(
                    SHRINE_VISITOR,
                    "Sacred Places",
                    "Visit and pray at 3 different shrines.",
                    3,
                    300,
                ),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn progress(&self, id: &str) -> u32 {
        self.get(id).map_or(0, |q| q.progress)
    }

    /// Add progress to a quest. None for unknown or already completed quests.
    pub fn advance(&mut self, id: &str, amount: u32) -> Option<QuestUpdate> {
        let quest = self.quests.iter_mut().find(|q| q.id == id)?;
        if quest.completed {
            return None;
        }
        quest.progress = quest.progress.saturating_add(amount).min(quest.max_progress);

        let mut reward_xp = None;
        if quest.progress >= quest.max_progress {
            quest.completed = true;
            reward_xp = Some(quest.reward_xp);
            tracing::info!(quest = %quest.id, xp = quest.reward_xp, "quest complete");
        }
        Some(QuestUpdate {
            id: quest.id.clone(),
            title: quest.title.clone(),
            progress: quest.progress,
            max_progress: quest.max_progress,
            reward_xp,
        })
    }

    pub fn completed_count(&self) -> usize {
        self.quests.iter().filter(|q| q.completed).count()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
