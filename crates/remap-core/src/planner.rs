use crate::config::{BusinessContext, PlannerConfig};
use crate::inventory::{Inventory, InventoryItem};
use crate::matcher::{GapTopic, MatchReport, MatchResult};
use crate::rules::default_rules;
use crate::topics::{Topic, TopicSet};
use crate::types::{EffortTier, MigrationAction, PriorityTier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// PlanContext
// ---------------------------------------------------------------------------

/// Everything a rule may consult for one decision. Exactly one of
/// `item`/`gap` is set; `topic` is the matched topic for matches and
/// cannibalization, the nearest topic for orphans, the gap topic for gaps.
pub struct PlanContext<'a> {
    pub item: Option<&'a InventoryItem>,
    pub result: Option<&'a MatchResult>,
    pub gap: Option<&'a GapTopic>,
    pub topic: Option<&'a Topic>,
    pub winner_clicks: Option<u64>,
    pub context: &'a BusinessContext,
    pub config: &'a PlannerConfig,
}

// ---------------------------------------------------------------------------
// PlannedAction (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    pub action: MigrationAction,
    pub reasoning: String,
    pub priority: PriorityTier,
    pub effort: EffortTier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_points: Vec<String>,
}

// ---------------------------------------------------------------------------
// PlanRule
// ---------------------------------------------------------------------------

/// A fn-pointer rule: no heap, no dynamic dispatch.
pub struct PlanRule {
    pub id: &'static str,
    pub matches: fn(&PlanContext) -> bool,
    pub action: MigrationAction,
    pub target: fn(&PlanContext) -> Option<String>,
    pub priority: fn(&PlanContext) -> PriorityTier,
    pub reasoning: fn(&PlanContext) -> String,
    pub data_points: fn(&PlanContext) -> Vec<String>,
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

pub struct Planner {
    rules: Vec<PlanRule>,
}

impl Planner {
    pub fn new(rules: Vec<PlanRule>) -> Self {
        Self { rules }
    }

    /// First matching rule wins. The fallback (an item with no usable match
    /// result) keeps the page untouched rather than inventing work.
    pub fn decide(&self, ctx: &PlanContext) -> PlannedAction {
        for rule in &self.rules {
            if (rule.matches)(ctx) {
                return PlannedAction {
                    item_id: ctx.item.map(|i| i.id.clone()),
                    topic_id: (rule.target)(ctx),
                    action: rule.action,
                    reasoning: (rule.reasoning)(ctx),
                    priority: (rule.priority)(ctx),
                    effort: rule.action.effort(),
                    data_points: (rule.data_points)(ctx),
                };
            }
        }

        // Fallback: keep
        PlannedAction {
            item_id: ctx.item.map(|i| i.id.clone()),
            topic_id: None,
            action: MigrationAction::Keep,
            reasoning: "No rule matched; leaving the page untouched".to_string(),
            priority: PriorityTier::Low,
            effort: MigrationAction::Keep.effort(),
            data_points: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// generate_plan
// ---------------------------------------------------------------------------

/// One PlannedAction per inventory item (input order) followed by one per
/// gap topic (report order). Pure: reads the match report, never re-runs
/// the matcher.
pub fn generate_plan(
    inventory: &Inventory,
    topics: &TopicSet,
    report: &MatchReport,
    context: &BusinessContext,
    config: &PlannerConfig,
) -> Vec<PlannedAction> {
    let planner = Planner::new(default_rules());
    let results_by_item: BTreeMap<&str, &MatchResult> = report
        .results
        .iter()
        .map(|r| (r.item_id.as_str(), r))
        .collect();

    let mut actions = Vec::with_capacity(inventory.items.len() + report.gaps.len());

    for item in &inventory.items {
        let result = results_by_item.get(item.id.as_str()).copied();
        let topic = result
            .and_then(|r| r.topic_id.as_deref().or(r.nearest_topic_id.as_deref()))
            .and_then(|id| topics.find(id));
        let winner_clicks = result
            .and_then(|r| r.winner_item_id.as_deref())
            .and_then(|id| inventory.find(id))
            .map(|winner| winner.monthly_clicks);

        let ctx = PlanContext {
            item: Some(item),
            result,
            gap: None,
            topic,
            winner_clicks,
            context,
            config,
        };
        actions.push(planner.decide(&ctx));
    }

    for gap in &report.gaps {
        let ctx = PlanContext {
            item: None,
            result: None,
            gap: Some(gap),
            topic: topics.find(&gap.topic_id),
            winner_clicks: None,
            context,
            config,
        };
        actions.push(planner.decide(&ctx));
    }

    actions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
