use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioType {
    BothTeamsToScore,
    TotalGoalsOverUnder,
    MatchOutcome,
    FirstHalfActivity,
}

impl ScenarioType {
    pub fn from_key(key: &str) -> Self {
        let normalized: String = key
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "btts" | "bothteamstoscore" => ScenarioType::BothTeamsToScore,
            "overunder" | "overundergoals" | "totalgoals" | "totalgoalsoverunder" | "ou" => {
                ScenarioType::TotalGoalsOverUnder
            }
            "matchresult" | "matchoutcome" | "1x2" | "result" => ScenarioType::MatchOutcome,
            "firsthalf" | "firsthalfactivity" | "firsthalfgoals" => {
                ScenarioType::FirstHalfActivity
            }
            _ => {
                warn!(key, "unknown market key, falling back to btts");
                ScenarioType::BothTeamsToScore
            }
        }
    }

    pub fn config_key(self) -> &'static str {
        match self {
            ScenarioType::BothTeamsToScore => "btts",
            ScenarioType::TotalGoalsOverUnder => "overUnderGoals",
            ScenarioType::MatchOutcome => "matchResult",
            ScenarioType::FirstHalfActivity => "firstHalf",
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScenarioType::BothTeamsToScore => "Both Teams To Score",
            ScenarioType::TotalGoalsOverUnder => "Total Goals Over/Under",
            ScenarioType::MatchOutcome => "Match Outcome",
            ScenarioType::FirstHalfActivity => "First Half Activity",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::ScenarioType;

    #[test]
    fn market_keys_resolve() {
        assert_eq!(ScenarioType::from_key("BTTS"), ScenarioType::BothTeamsToScore);
        assert_eq!(
            ScenarioType::from_key("over_under_goals"),
            ScenarioType::TotalGoalsOverUnder
        );
        assert_eq!(ScenarioType::from_key("match-result"), ScenarioType::MatchOutcome);
        assert_eq!(ScenarioType::from_key("firstHalf"), ScenarioType::FirstHalfActivity);
    }

    #[test]
    fn unknown_key_falls_back_to_btts() {
        assert_eq!(ScenarioType::from_key("corners"), ScenarioType::BothTeamsToScore);
        assert_eq!(ScenarioType::from_key(""), ScenarioType::BothTeamsToScore);
    }
}
