/// Scenario files.
///
/// A scenario is a roster, a starting lineup, a team context and the
/// operations a scorekeeper entered, in order. Running one replays the
/// operations through a fresh engine and composes the announcement.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compose::Announcement;
use crate::config::EngineConfig;
use crate::domain::{Lineup, Outcome, Roster, TeamContext};
use crate::engine::LineupEngine;
use crate::error::{LineupError, Result};
use crate::hashing::canonical_hash;
use crate::operations::Operation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub roster: Roster,
    pub starting: Lineup,
    #[serde(default)]
    pub config: EngineConfig,
    pub context: TeamContext,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub outcomes: Vec<Outcome>,
    pub announcement: Announcement,
    pub state_hash: String,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| LineupError::Malformed(format!("{}: {}", path.display(), e)))?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn run(&self) -> Result<ScenarioReport> {
        let mut engine = LineupEngine::new(
            self.roster.clone(),
            self.starting.clone(),
            self.config.clone(),
        )?;
        let outcomes = engine.apply_all(&self.operations)?;
        let announcement = engine.compose(&self.context);
        let state_hash = canonical_hash(engine.state())?;
        Ok(ScenarioReport {
            outcomes,
            announcement,
            state_hash,
        })
    }
}
