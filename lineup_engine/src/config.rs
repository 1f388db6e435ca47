/// Engine configuration.
///
/// Injected once when the engine is built and never changed afterwards.
/// Every field has a default so a missing or partial `settings` record
/// still loads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of undo snapshots kept. 0 keeps everything.
    pub history_depth: usize,
    pub reentry_enabled: bool,
    pub honorific_male: String,
    pub honorific_female: String,
    /// Closing line read after a multi-change announcement.
    pub summary_line: String,
    /// Sentence returned when nothing changed since the last announcement.
    pub no_change_line: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_depth: 50,
            reentry_enabled: true,
            honorific_male: "くん".to_string(),
            honorific_female: "さん".to_string(),
            summary_line: "以上に代わります。".to_string(),
            no_change_line: "交代はありません。".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn honorific(&self, female: bool) -> &str {
        if female {
            &self.honorific_female
        } else {
            &self.honorific_male
        }
    }
}
