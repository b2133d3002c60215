use crate::error::{RemapError, Result};
use crate::io;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Business context
// ---------------------------------------------------------------------------

/// Site-level facts the engine folds into scoring: the core entity feeds
/// monetization ranking, and source_context records where the crawl came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessContext {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_context: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for BusinessContext {
    fn default() -> Self {
        Self {
            language: default_language(),
            industry: None,
            core_entity: None,
            source_context: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Matcher tunables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum blended score for a page/topic pair to count as a match.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    /// Weight on title/URL token overlap when query signals are present.
    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f64,
    /// Weight on search-query coverage when query signals are present.
    #[serde(default = "default_query_weight")]
    pub query_weight: f64,
}

fn default_match_threshold() -> f64 {
    0.25
}

fn default_lexical_weight() -> f64 {
    0.7
}

fn default_query_weight() -> f64 {
    0.3
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            match_threshold: default_match_threshold(),
            lexical_weight: default_lexical_weight(),
            query_weight: default_query_weight(),
        }
    }
}

// ---------------------------------------------------------------------------
// Planner tunables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Confidence at or above which a match is trusted as-is.
    #[serde(default = "default_high_confidence")]
    pub high_confidence: f64,
    /// Confidence below which a matched page needs a rewrite.
    #[serde(default = "default_low_confidence")]
    pub low_confidence: f64,
    /// Monthly clicks at or above which a page counts as a strong performer.
    #[serde(default = "default_strong_clicks")]
    pub strong_clicks: u64,
    /// Orphans at or below this click count are pruned.
    #[serde(default = "default_prune_click_floor")]
    pub prune_click_floor: u64,
    /// A cannibalization loser earning at least this fraction of the winner's
    /// clicks is merged rather than redirected.
    #[serde(default = "default_merge_click_ratio")]
    pub merge_click_ratio: f64,
}

fn default_high_confidence() -> f64 {
    0.75
}

fn default_low_confidence() -> f64 {
    0.40
}

fn default_strong_clicks() -> u64 {
    500
}

fn default_prune_click_floor() -> u64 {
    0
}

fn default_merge_click_ratio() -> f64 {
    0.25
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            high_confidence: default_high_confidence(),
            low_confidence: default_low_confidence(),
            strong_clicks: default_strong_clicks(),
            prune_click_floor: default_prune_click_floor(),
            merge_click_ratio: default_merge_click_ratio(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler tunables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_core_topic_weight")]
    pub core_topic_weight: f64,
    #[serde(default = "default_entity_affinity_weight")]
    pub entity_affinity_weight: f64,
    #[serde(default = "default_commercial_intent_weight")]
    pub commercial_intent_weight: f64,
    #[serde(default = "default_click_weight")]
    pub click_weight: f64,
    #[serde(default = "default_depth_penalty")]
    pub depth_penalty: f64,
}

fn default_core_topic_weight() -> f64 {
    0.35
}

fn default_entity_affinity_weight() -> f64 {
    0.25
}

fn default_commercial_intent_weight() -> f64 {
    0.25
}

fn default_click_weight() -> f64 {
    0.15
}

fn default_depth_penalty() -> f64 {
    0.05
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            core_topic_weight: default_core_topic_weight(),
            entity_affinity_weight: default_entity_affinity_weight(),
            commercial_intent_weight: default_commercial_intent_weight(),
            click_weight: default_click_weight(),
            depth_penalty: default_depth_penalty(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub context: BusinessContext,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

fn default_config_version() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

impl Config {
    pub fn new(name: &str) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: name.to_string(),
                description: None,
            },
            context: BusinessContext::default(),
            matcher: MatcherConfig::default(),
            planner: PlannerConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }

    /// Load the project config. A missing file means the directory was never
    /// initialized, which every other command treats as fatal.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(RemapError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let weight_sum = self.matcher.lexical_weight + self.matcher.query_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "matcher weights sum to {weight_sum} (lexical + query should be 1.0)"
                ),
            });
        }
        if self.matcher.match_threshold <= 0.0 || self.matcher.match_threshold >= 1.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "match_threshold {} must be between 0 and 1 exclusive",
                    self.matcher.match_threshold
                ),
            });
        }

        if self.planner.low_confidence >= self.planner.high_confidence {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "low_confidence {} must be below high_confidence {}",
                    self.planner.low_confidence, self.planner.high_confidence
                ),
            });
        }
        if self.planner.merge_click_ratio < 0.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "merge_click_ratio {} must not be negative",
                    self.planner.merge_click_ratio
                ),
            });
        }

        let scheduler_weights = [
            ("core_topic_weight", self.scheduler.core_topic_weight),
            ("entity_affinity_weight", self.scheduler.entity_affinity_weight),
            (
                "commercial_intent_weight",
                self.scheduler.commercial_intent_weight,
            ),
            ("click_weight", self.scheduler.click_weight),
            ("depth_penalty", self.scheduler.depth_penalty),
        ];
        for (name, value) in scheduler_weights {
            if value < 0.0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("scheduler {name} {value} must not be negative"),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new("demo-site");
        config.context.core_entity = Some("mountain bikes".to_string());
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.project.name, "demo-site");
        assert_eq!(loaded.context.core_entity.as_deref(), Some("mountain bikes"));
        assert_eq!(loaded.matcher.match_threshold, 0.25);
    }

    #[test]
    fn missing_config_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(err, RemapError::NotInitialized));
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let yaml = "project:\n  name: demo\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.context.language, "en");
        assert_eq!(config.matcher.lexical_weight, 0.7);
        assert_eq!(config.planner.strong_clicks, 500);
        assert_eq!(config.scheduler.depth_penalty, 0.05);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::new("demo").validate().is_empty());
    }

    #[test]
    fn validate_flags_weight_sum() {
        let mut config = Config::new("demo");
        config.matcher.lexical_weight = 0.8;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
        assert!(warnings[0].message.contains("sum to"));
    }

    #[test]
    fn validate_flags_threshold_bounds() {
        let mut config = Config::new("demo");
        config.matcher.match_threshold = 1.5;
        let warnings = config.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("match_threshold")));
    }

    #[test]
    fn validate_flags_inverted_confidence_bands() {
        let mut config = Config::new("demo");
        config.planner.low_confidence = 0.9;
        let warnings = config.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("low_confidence")));
    }

    #[test]
    fn validate_flags_negative_scheduler_weight() {
        let mut config = Config::new("demo");
        config.scheduler.click_weight = -0.1;
        let warnings = config.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("click_weight")));
    }
}
