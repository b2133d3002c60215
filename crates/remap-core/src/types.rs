use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// MigrationAction
// ---------------------------------------------------------------------------

/// The closed set of dispositions a migration plan can assign. Every page and
/// every uncovered topic gets exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationAction {
    Keep,
    Optimize,
    Rewrite,
    Merge,
    #[serde(rename = "redirect_301")]
    Redirect301,
    #[serde(rename = "prune_410")]
    Prune410,
    Canonicalize,
    CreateNew,
}

impl MigrationAction {
    pub fn all() -> &'static [MigrationAction] {
        &[
            MigrationAction::Keep,
            MigrationAction::Optimize,
            MigrationAction::Rewrite,
            MigrationAction::Merge,
            MigrationAction::Redirect301,
            MigrationAction::Prune410,
            MigrationAction::Canonicalize,
            MigrationAction::CreateNew,
        ]
    }

    /// Returns true if the given string is a valid MigrationAction name.
    pub fn is_valid(s: &str) -> bool {
        Self::all().iter().any(|a| a.as_str() == s)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MigrationAction::Keep => "keep",
            MigrationAction::Optimize => "optimize",
            MigrationAction::Rewrite => "rewrite",
            MigrationAction::Merge => "merge",
            MigrationAction::Redirect301 => "redirect_301",
            MigrationAction::Prune410 => "prune_410",
            MigrationAction::Canonicalize => "canonicalize",
            MigrationAction::CreateNew => "create_new",
        }
    }

    /// Execution effort implied by the action itself. Redirects and removals
    /// are server-config work; rewrites and new content are authoring work.
    pub fn effort(self) -> EffortTier {
        match self {
            MigrationAction::Keep => EffortTier::None,
            MigrationAction::Redirect301
            | MigrationAction::Prune410
            | MigrationAction::Canonicalize => EffortTier::Low,
            MigrationAction::Merge | MigrationAction::Optimize => EffortTier::Medium,
            MigrationAction::Rewrite | MigrationAction::CreateNew => EffortTier::High,
        }
    }
}

impl fmt::Display for MigrationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MigrationAction {
    type Err = crate::error::RemapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(MigrationAction::Keep),
            "optimize" => Ok(MigrationAction::Optimize),
            "rewrite" => Ok(MigrationAction::Rewrite),
            "merge" => Ok(MigrationAction::Merge),
            "redirect_301" => Ok(MigrationAction::Redirect301),
            "prune_410" => Ok(MigrationAction::Prune410),
            "canonicalize" => Ok(MigrationAction::Canonicalize),
            "create_new" => Ok(MigrationAction::CreateNew),
            _ => Err(crate::error::RemapError::InvalidAction(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// MatchCategory / MatchSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCategory {
    /// Best qualifying page for its topic.
    Matched,
    /// No topic scored at or above the match threshold.
    Orphan,
    /// Qualified for a topic another page already won.
    Cannibalization,
}

impl MatchCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchCategory::Matched => "matched",
            MatchCategory::Orphan => "orphan",
            MatchCategory::Cannibalization => "cannibalization",
        }
    }
}

impl fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who established an item's current topic mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Matcher,
    Manual,
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchSource::Matcher => "matcher",
            MatchSource::Manual => "manual",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// TopicKind / TopicFreshness / GapImportance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKind {
    /// Pillar node of the topic map.
    Core,
    #[default]
    Outer,
}

impl fmt::Display for TopicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TopicKind::Core => "core",
            TopicKind::Outer => "outer",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicFreshness {
    #[default]
    Evergreen,
    Seasonal,
    /// Needs frequent refresh; uncovered volatile topics are urgent.
    Volatile,
}

impl fmt::Display for TopicFreshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TopicFreshness::Evergreen => "evergreen",
            TopicFreshness::Seasonal => "seasonal",
            TopicFreshness::Volatile => "volatile",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapImportance {
    Pillar,
    Supporting,
}

impl fmt::Display for GapImportance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GapImportance::Pillar => "pillar",
            GapImportance::Supporting => "supporting",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// PriorityTier / EffortTier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    High,
    Medium,
    Low,
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PriorityTier::High => "high",
            PriorityTier::Medium => "medium",
            PriorityTier::Low => "low",
        };
        f.write_str(s)
    }
}

/// Effort tiers order from cheapest to most expensive so that
/// quick-wins scheduling can sort on them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortTier {
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for EffortTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EffortTier::None => "none",
            EffortTier::Low => "low",
            EffortTier::Medium => "medium",
            EffortTier::High => "high",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// WaveStrategy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveStrategy {
    /// Highest expected commercial value first.
    MonetizationFirst,
    /// Highest current traffic first.
    TrafficFirst,
    /// Cheapest effort first, value as tie-break.
    QuickWins,
}

impl WaveStrategy {
    pub fn all() -> &'static [WaveStrategy] {
        &[
            WaveStrategy::MonetizationFirst,
            WaveStrategy::TrafficFirst,
            WaveStrategy::QuickWins,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WaveStrategy::MonetizationFirst => "monetization_first",
            WaveStrategy::TrafficFirst => "traffic_first",
            WaveStrategy::QuickWins => "quick_wins",
        }
    }
}

impl fmt::Display for WaveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WaveStrategy {
    type Err = crate::error::RemapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monetization_first" => Ok(WaveStrategy::MonetizationFirst),
            "traffic_first" => Ok(WaveStrategy::TrafficFirst),
            "quick_wins" => Ok(WaveStrategy::QuickWins),
            _ => Err(crate::error::RemapError::InvalidStrategy(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// WaveNumber
// ---------------------------------------------------------------------------

/// One of the four execution waves. Serialized as its number so manifests
/// read `wave: 1` rather than a spelled-out variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum WaveNumber {
    One,
    Two,
    Three,
    Four,
}

impl WaveNumber {
    pub fn all() -> &'static [WaveNumber] {
        &[
            WaveNumber::One,
            WaveNumber::Two,
            WaveNumber::Three,
            WaveNumber::Four,
        ]
    }

    pub fn number(self) -> u8 {
        match self {
            WaveNumber::One => 1,
            WaveNumber::Two => 2,
            WaveNumber::Three => 3,
            WaveNumber::Four => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<WaveNumber> {
        match n {
            1 => Some(WaveNumber::One),
            2 => Some(WaveNumber::Two),
            3 => Some(WaveNumber::Three),
            4 => Some(WaveNumber::Four),
            _ => None,
        }
    }
}

impl From<WaveNumber> for u8 {
    fn from(w: WaveNumber) -> u8 {
        w.number()
    }
}

impl TryFrom<u8> for WaveNumber {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        WaveNumber::from_number(n).ok_or_else(|| format!("wave number out of range: {n}"))
    }
}

impl fmt::Display for WaveNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

// ---------------------------------------------------------------------------
// PlanStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Draft,
    Generating,
    Ready,
    Approved,
}

impl PlanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanStatus::Draft => "draft",
            PlanStatus::Generating => "generating",
            PlanStatus::Ready => "ready",
            PlanStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn action_all_complete() {
        assert_eq!(MigrationAction::all().len(), 8);
    }

    #[test]
    fn action_roundtrip() {
        for action in MigrationAction::all() {
            let s = action.as_str();
            let parsed = MigrationAction::from_str(s).unwrap();
            assert_eq!(*action, parsed);
        }
    }

    #[test]
    fn action_serde_names_keep_status_codes() {
        let yaml = serde_yaml::to_string(&MigrationAction::Redirect301).unwrap();
        assert_eq!(yaml.trim(), "redirect_301");
        let yaml = serde_yaml::to_string(&MigrationAction::Prune410).unwrap();
        assert_eq!(yaml.trim(), "prune_410");

        let parsed: MigrationAction = serde_yaml::from_str("redirect_301").unwrap();
        assert_eq!(parsed, MigrationAction::Redirect301);
    }

    #[test]
    fn action_is_valid() {
        assert!(MigrationAction::is_valid("keep"));
        assert!(MigrationAction::is_valid("prune_410"));
        assert!(MigrationAction::is_valid("create_new"));
        assert!(!MigrationAction::is_valid("delete"));
        assert!(!MigrationAction::is_valid(""));
    }

    #[test]
    fn action_effort_mapping() {
        assert_eq!(MigrationAction::Keep.effort(), EffortTier::None);
        assert_eq!(MigrationAction::Redirect301.effort(), EffortTier::Low);
        assert_eq!(MigrationAction::Prune410.effort(), EffortTier::Low);
        assert_eq!(MigrationAction::Canonicalize.effort(), EffortTier::Low);
        assert_eq!(MigrationAction::Merge.effort(), EffortTier::Medium);
        assert_eq!(MigrationAction::Optimize.effort(), EffortTier::Medium);
        assert_eq!(MigrationAction::Rewrite.effort(), EffortTier::High);
        assert_eq!(MigrationAction::CreateNew.effort(), EffortTier::High);
    }

    #[test]
    fn effort_ordering() {
        assert!(EffortTier::None < EffortTier::Low);
        assert!(EffortTier::Low < EffortTier::Medium);
        assert!(EffortTier::Medium < EffortTier::High);
    }

    #[test]
    fn strategy_roundtrip() {
        for strategy in WaveStrategy::all() {
            let parsed = WaveStrategy::from_str(strategy.as_str()).unwrap();
            assert_eq!(*strategy, parsed);
        }
        assert!(WaveStrategy::from_str("fastest").is_err());
    }

    #[test]
    fn wave_number_serializes_as_number() {
        let yaml = serde_yaml::to_string(&WaveNumber::Three).unwrap();
        assert_eq!(yaml.trim(), "3");
        let parsed: WaveNumber = serde_yaml::from_str("3").unwrap();
        assert_eq!(parsed, WaveNumber::Three);
        assert!(serde_yaml::from_str::<WaveNumber>("5").is_err());
    }

    #[test]
    fn wave_number_bounds() {
        assert_eq!(WaveNumber::from_number(1), Some(WaveNumber::One));
        assert_eq!(WaveNumber::from_number(4), Some(WaveNumber::Four));
        assert_eq!(WaveNumber::from_number(0), None);
        assert_eq!(WaveNumber::from_number(5), None);
    }

    #[test]
    fn topic_defaults() {
        assert_eq!(TopicKind::default(), TopicKind::Outer);
        assert_eq!(TopicFreshness::default(), TopicFreshness::Evergreen);
    }
}
