use crate::planner::{PlanContext, PlanRule};
use crate::types::{GapImportance, MatchCategory, MigrationAction, PriorityTier, TopicFreshness, TopicKind};

// ---------------------------------------------------------------------------
// Condition helpers
// ---------------------------------------------------------------------------

fn category(ctx: &PlanContext) -> Option<MatchCategory> {
    ctx.result.map(|r| r.category)
}

fn is_matched(ctx: &PlanContext) -> bool {
    category(ctx) == Some(MatchCategory::Matched)
}

fn is_cannibalization(ctx: &PlanContext) -> bool {
    category(ctx) == Some(MatchCategory::Cannibalization)
}

fn is_orphan(ctx: &PlanContext) -> bool {
    category(ctx) == Some(MatchCategory::Orphan)
}

fn confidence(ctx: &PlanContext) -> f64 {
    ctx.result.map(|r| r.confidence).unwrap_or(0.0)
}

fn clicks(ctx: &PlanContext) -> u64 {
    ctx.item.map(|i| i.monthly_clicks).unwrap_or(0)
}

fn topic_is_core(ctx: &PlanContext) -> bool {
    ctx.topic.map(|t| t.kind == TopicKind::Core).unwrap_or(false)
}

fn topic_title(ctx: &PlanContext) -> String {
    ctx.topic
        .map(|t| t.title.clone())
        .unwrap_or_else(|| "the topic".to_string())
}

fn has_nearest(ctx: &PlanContext) -> bool {
    ctx.result
        .map(|r| r.nearest_topic_id.is_some())
        .unwrap_or(false)
}

/// A cannibalization loser keeps independent value when it still earns
/// clicks of its own and holds a meaningful share of the winner's volume.
fn loser_keeps_value(ctx: &PlanContext) -> bool {
    let loser = clicks(ctx);
    let winner = ctx.winner_clicks.unwrap_or(0);
    loser > 0 && loser as f64 >= ctx.config.merge_click_ratio * winner as f64
}

// ---------------------------------------------------------------------------
// Priority / target / data-point helpers
// ---------------------------------------------------------------------------

fn impact_priority(ctx: &PlanContext) -> PriorityTier {
    if topic_is_core(ctx) || clicks(ctx) >= ctx.config.strong_clicks {
        PriorityTier::High
    } else {
        PriorityTier::Medium
    }
}

fn gap_priority(ctx: &PlanContext) -> PriorityTier {
    let pillar = ctx
        .gap
        .map(|g| g.importance == GapImportance::Pillar)
        .unwrap_or(false);
    let volatile = ctx
        .topic
        .map(|t| t.freshness == TopicFreshness::Volatile)
        .unwrap_or(false);
    if pillar || volatile {
        PriorityTier::High
    } else {
        PriorityTier::Medium
    }
}

fn matched_topic(ctx: &PlanContext) -> Option<String> {
    ctx.result.and_then(|r| r.topic_id.clone())
}

fn nearest_topic(ctx: &PlanContext) -> Option<String> {
    ctx.result.and_then(|r| r.nearest_topic_id.clone())
}

fn no_target(_ctx: &PlanContext) -> Option<String> {
    None
}

fn gap_target(ctx: &PlanContext) -> Option<String> {
    ctx.gap.map(|g| g.topic_id.clone())
}

fn match_data_points(ctx: &PlanContext) -> Vec<String> {
    let mut points = vec![
        format!("confidence: {:.2}", confidence(ctx)),
        format!("monthly_clicks: {}", clicks(ctx)),
    ];
    if let Some(overlap) = ctx.result.and_then(|r| r.signals.query_overlap) {
        points.push(format!("query_overlap: {overlap:.2}"));
    }
    points
}

fn conflict_data_points(ctx: &PlanContext) -> Vec<String> {
    let mut points = vec![format!("monthly_clicks: {}", clicks(ctx))];
    if let Some(winner) = ctx.result.and_then(|r| r.winner_item_id.as_deref()) {
        points.push(format!("winner: {winner}"));
    }
    if let Some(winner_clicks) = ctx.winner_clicks {
        points.push(format!("winner_clicks: {winner_clicks}"));
    }
    points
}

fn orphan_data_points(ctx: &PlanContext) -> Vec<String> {
    let mut points = vec![format!("monthly_clicks: {}", clicks(ctx))];
    if let Some(r) = ctx.result {
        if let (Some(nearest), Some(score)) = (r.nearest_topic_id.as_deref(), r.nearest_confidence)
        {
            points.push(format!("nearest_topic: {nearest}"));
            points.push(format!("nearest_confidence: {score:.2}"));
        }
    }
    points
}

fn gap_data_points(ctx: &PlanContext) -> Vec<String> {
    let mut points = Vec::new();
    if let Some(gap) = ctx.gap {
        points.push(format!("importance: {}", gap.importance));
    }
    if let Some(topic) = ctx.topic {
        if topic.freshness != TopicFreshness::Evergreen {
            points.push(format!("freshness: {}", topic.freshness));
        }
    }
    points
}

fn winner_label(ctx: &PlanContext) -> String {
    ctx.result
        .and_then(|r| r.winner_item_id.clone())
        .unwrap_or_else(|| "the winning page".to_string())
}

// ---------------------------------------------------------------------------
// Default rules (priority-ordered, first match wins)
// ---------------------------------------------------------------------------

pub fn default_rules() -> Vec<PlanRule> {
    vec![
        // 1. Matched, but only loosely: best available page still needs a rewrite
        PlanRule {
            id: "rewrite_weak_match",
            matches: |ctx| is_matched(ctx) && confidence(ctx) < ctx.config.low_confidence,
            action: MigrationAction::Rewrite,
            target: matched_topic,
            priority: impact_priority,
            reasoning: |ctx| {
                format!(
                    "Best available page for '{}' but confidence {:.2} is below {:.2}; rewrite the content to serve the topic",
                    topic_title(ctx),
                    confidence(ctx),
                    ctx.config.low_confidence
                )
            },
            data_points: match_data_points,
        },
        // 2. Matched, confident, and earning: leave it alone
        PlanRule {
            id: "keep_strong_performer",
            matches: |ctx| {
                is_matched(ctx)
                    && confidence(ctx) >= ctx.config.high_confidence
                    && clicks(ctx) >= ctx.config.strong_clicks
            },
            action: MigrationAction::Keep,
            target: matched_topic,
            priority: |_| PriorityTier::Low,
            reasoning: |ctx| {
                format!(
                    "Covers '{}' with confidence {:.2} and {} monthly clicks; keep as-is",
                    topic_title(ctx),
                    confidence(ctx),
                    clicks(ctx)
                )
            },
            data_points: match_data_points,
        },
        // 3. Matched, middling confidence or traffic: tune it up
        PlanRule {
            id: "optimize_match",
            matches: is_matched,
            action: MigrationAction::Optimize,
            target: matched_topic,
            priority: impact_priority,
            reasoning: |ctx| {
                format!(
                    "Covers '{}' at confidence {:.2} with {} monthly clicks; optimize toward the topic",
                    topic_title(ctx),
                    confidence(ctx),
                    clicks(ctx)
                )
            },
            data_points: match_data_points,
        },
        // 4. Cannibalization loser that still earns: fold it into the winner
        PlanRule {
            id: "merge_valuable_loser",
            matches: |ctx| is_cannibalization(ctx) && loser_keeps_value(ctx),
            action: MigrationAction::Merge,
            target: matched_topic,
            priority: impact_priority,
            reasoning: |ctx| {
                format!(
                    "Competes with '{}' for '{}' but still earns {} monthly clicks; merge the content into the winner",
                    winner_label(ctx),
                    topic_title(ctx),
                    clicks(ctx)
                )
            },
            data_points: conflict_data_points,
        },
        // 5. Cannibalization loser with nothing to save: redirect
        PlanRule {
            id: "redirect_duplicate",
            matches: is_cannibalization,
            action: MigrationAction::Redirect301,
            target: matched_topic,
            priority: |_| PriorityTier::Low,
            reasoning: |ctx| {
                format!(
                    "Duplicates coverage of '{}' already won by '{}' ({} monthly clicks here); redirect to the winner",
                    topic_title(ctx),
                    winner_label(ctx),
                    clicks(ctx)
                )
            },
            data_points: conflict_data_points,
        },
        // 6. Orphan earning nothing: retire it
        PlanRule {
            id: "prune_dead_orphan",
            matches: |ctx| is_orphan(ctx) && clicks(ctx) <= ctx.config.prune_click_floor,
            action: MigrationAction::Prune410,
            target: no_target,
            priority: |_| PriorityTier::Low,
            reasoning: |ctx| {
                format!(
                    "No qualifying topic and {} monthly clicks; retire with a 410",
                    clicks(ctx)
                )
            },
            data_points: orphan_data_points,
        },
        // 7. Orphan with traffic but zero overlap anywhere: nothing to point at
        PlanRule {
            id: "keep_stranded_orphan",
            matches: |ctx| is_orphan(ctx) && !has_nearest(ctx),
            action: MigrationAction::Keep,
            target: no_target,
            priority: |_| PriorityTier::Low,
            reasoning: |ctx| {
                format!(
                    "No topic overlaps this page at all, yet it earns {} monthly clicks; keep it until the topic map covers it",
                    clicks(ctx)
                )
            },
            data_points: orphan_data_points,
        },
        // 8. Orphan with traffic: canonicalize toward the nearest topic
        PlanRule {
            id: "canonicalize_orphan",
            matches: is_orphan,
            action: MigrationAction::Canonicalize,
            target: nearest_topic,
            priority: impact_priority,
            reasoning: |ctx| {
                let nearest = ctx
                    .result
                    .and_then(|r| r.nearest_confidence)
                    .unwrap_or(0.0);
                format!(
                    "Below the match threshold everywhere ({} monthly clicks); canonicalize toward '{}' (nearest at {:.2})",
                    clicks(ctx),
                    topic_title(ctx),
                    nearest
                )
            },
            data_points: orphan_data_points,
        },
        // 9. Uncovered topic: write it
        PlanRule {
            id: "create_gap_topic",
            matches: |ctx| ctx.gap.is_some(),
            action: MigrationAction::CreateNew,
            target: gap_target,
            priority: gap_priority,
            reasoning: |ctx| {
                let (title, importance) = ctx
                    .gap
                    .map(|g| (g.title.clone(), g.importance))
                    .unwrap_or((String::new(), GapImportance::Supporting));
                format!("No existing page covers '{title}'; create new {importance} content")
            },
            data_points: gap_data_points,
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BusinessContext, PlannerConfig};
    use crate::inventory::InventoryItem;
    use crate::matcher::{GapTopic, MatchResult, MatchSignals};
    use crate::planner::{PlanContext, Planner};
    use crate::topics::Topic;
    use crate::types::{EffortTier, TopicKind};

    fn item(id: &str, clicks: u64) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            url: format!("https://example.com/{id}"),
            title: id.to_string(),
            description: None,
            monthly_clicks: clicks,
            mapped_topic_id: None,
            match_category: None,
            match_confidence: None,
            match_source: None,
        }
    }

    fn topic(id: &str, kind: TopicKind, freshness: TopicFreshness) -> Topic {
        Topic {
            id: id.to_string(),
            title: format!("Topic {id}"),
            kind,
            parent_id: None,
            freshness,
        }
    }

    fn result(category: MatchCategory, confidence: f64) -> MatchResult {
        MatchResult {
            item_id: "page-1".to_string(),
            topic_id: match category {
                MatchCategory::Orphan => None,
                _ => Some("t-1".to_string()),
            },
            confidence,
            category,
            signals: MatchSignals {
                lexical: confidence,
                query_overlap: None,
            },
            winner_item_id: match category {
                MatchCategory::Cannibalization => Some("page-winner".to_string()),
                _ => None,
            },
            nearest_topic_id: None,
            nearest_confidence: None,
        }
    }

    struct Fixture {
        item: Option<InventoryItem>,
        result: Option<MatchResult>,
        gap: Option<GapTopic>,
        topic: Option<Topic>,
        winner_clicks: Option<u64>,
        context: BusinessContext,
        config: PlannerConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                item: None,
                result: None,
                gap: None,
                topic: None,
                winner_clicks: None,
                context: BusinessContext::default(),
                config: PlannerConfig::default(),
            }
        }

        fn decide(&self) -> crate::planner::PlannedAction {
            let ctx = PlanContext {
                item: self.item.as_ref(),
                result: self.result.as_ref(),
                gap: self.gap.as_ref(),
                topic: self.topic.as_ref(),
                winner_clicks: self.winner_clicks,
                context: &self.context,
                config: &self.config,
            };
            Planner::new(default_rules()).decide(&ctx)
        }
    }

    #[test]
    fn strong_confident_match_is_kept() {
        let mut f = Fixture::new();
        f.item = Some(item("page-1", 1200));
        f.result = Some(result(MatchCategory::Matched, 0.82));
        f.topic = Some(topic("t-1", TopicKind::Core, TopicFreshness::Evergreen));

        let action = f.decide();
        assert_eq!(action.action, MigrationAction::Keep);
        assert_eq!(action.priority, PriorityTier::Low);
        assert_eq!(action.effort, EffortTier::None);
        assert!(action.reasoning.contains("0.82"));
        assert!(action.data_points.contains(&"monthly_clicks: 1200".to_string()));
    }

    #[test]
    fn confident_match_with_weak_traffic_is_optimized() {
        let mut f = Fixture::new();
        f.item = Some(item("page-1", 40));
        f.result = Some(result(MatchCategory::Matched, 0.82));
        f.topic = Some(topic("t-1", TopicKind::Outer, TopicFreshness::Evergreen));

        let action = f.decide();
        assert_eq!(action.action, MigrationAction::Optimize);
        assert_eq!(action.priority, PriorityTier::Medium);
    }

    #[test]
    fn weak_match_is_rewritten() {
        let mut f = Fixture::new();
        f.item = Some(item("page-1", 1200));
        f.result = Some(result(MatchCategory::Matched, 0.3));
        f.topic = Some(topic("t-1", TopicKind::Outer, TopicFreshness::Evergreen));

        let action = f.decide();
        assert_eq!(action.action, MigrationAction::Rewrite);
        // 1200 clicks push the rewrite to high priority
        assert_eq!(action.priority, PriorityTier::High);
        assert_eq!(action.effort, EffortTier::High);
    }

    #[test]
    fn core_topic_match_gets_high_priority() {
        let mut f = Fixture::new();
        f.item = Some(item("page-1", 40));
        f.result = Some(result(MatchCategory::Matched, 0.6));
        f.topic = Some(topic("t-1", TopicKind::Core, TopicFreshness::Evergreen));

        let action = f.decide();
        assert_eq!(action.action, MigrationAction::Optimize);
        assert_eq!(action.priority, PriorityTier::High);
    }

    #[test]
    fn valuable_loser_is_merged() {
        let mut f = Fixture::new();
        f.item = Some(item("page-1", 300));
        f.result = Some(result(MatchCategory::Cannibalization, 0.9));
        f.winner_clicks = Some(900);

        // 300 >= 0.25 * 900
        let action = f.decide();
        assert_eq!(action.action, MigrationAction::Merge);
        assert!(action.reasoning.contains("page-winner"));
        assert!(action.data_points.contains(&"winner: page-winner".to_string()));
    }

    #[test]
    fn weak_loser_is_redirected() {
        let mut f = Fixture::new();
        f.item = Some(item("page-1", 100));
        f.result = Some(result(MatchCategory::Cannibalization, 0.9));
        f.winner_clicks = Some(900);

        // 100 < 0.25 * 900
        let action = f.decide();
        assert_eq!(action.action, MigrationAction::Redirect301);
        assert_eq!(action.priority, PriorityTier::Low);
        assert_eq!(action.topic_id.as_deref(), Some("t-1"));
    }

    #[test]
    fn clickless_loser_is_redirected_even_against_clickless_winner() {
        let mut f = Fixture::new();
        f.item = Some(item("page-1", 0));
        f.result = Some(result(MatchCategory::Cannibalization, 0.9));
        f.winner_clicks = Some(0);

        let action = f.decide();
        assert_eq!(action.action, MigrationAction::Redirect301);
    }

    #[test]
    fn dead_orphan_is_pruned() {
        let mut f = Fixture::new();
        f.item = Some(item("page-1", 0));
        f.result = Some(result(MatchCategory::Orphan, 0.0));

        let action = f.decide();
        assert_eq!(action.action, MigrationAction::Prune410);
        assert_eq!(action.priority, PriorityTier::Low);
        assert_eq!(action.effort, EffortTier::Low);
        assert!(action.topic_id.is_none());
    }

    #[test]
    fn earning_orphan_is_canonicalized_to_nearest() {
        let mut f = Fixture::new();
        f.item = Some(item("page-1", 500));
        let mut r = result(MatchCategory::Orphan, 0.2);
        r.nearest_topic_id = Some("t-near".to_string());
        r.nearest_confidence = Some(0.2);
        f.result = Some(r);
        f.topic = Some(topic("t-near", TopicKind::Outer, TopicFreshness::Evergreen));

        let action = f.decide();
        assert_eq!(action.action, MigrationAction::Canonicalize);
        assert_eq!(action.topic_id.as_deref(), Some("t-near"));
        // 500 clicks meet the strong-performer bar
        assert_eq!(action.priority, PriorityTier::High);
        assert!(action.data_points.contains(&"nearest_topic: t-near".to_string()));
    }

    #[test]
    fn stranded_earning_orphan_is_kept() {
        let mut f = Fixture::new();
        f.item = Some(item("page-1", 800));
        f.result = Some(result(MatchCategory::Orphan, 0.0));

        let action = f.decide();
        assert_eq!(action.action, MigrationAction::Keep);
        assert!(action.topic_id.is_none());
    }

    #[test]
    fn pillar_gap_is_created_with_high_priority() {
        let mut f = Fixture::new();
        f.gap = Some(GapTopic {
            topic_id: "t-gap".to_string(),
            title: "Gravel Riding".to_string(),
            importance: GapImportance::Pillar,
        });
        f.topic = Some(topic("t-gap", TopicKind::Core, TopicFreshness::Evergreen));

        let action = f.decide();
        assert_eq!(action.action, MigrationAction::CreateNew);
        assert_eq!(action.priority, PriorityTier::High);
        assert_eq!(action.effort, EffortTier::High);
        assert_eq!(action.topic_id.as_deref(), Some("t-gap"));
        assert!(action.item_id.is_none());
    }

    #[test]
    fn supporting_gap_is_medium_unless_volatile() {
        let mut f = Fixture::new();
        f.gap = Some(GapTopic {
            topic_id: "t-gap".to_string(),
            title: "Handlebar Bells".to_string(),
            importance: GapImportance::Supporting,
        });
        f.topic = Some(topic("t-gap", TopicKind::Outer, TopicFreshness::Evergreen));
        assert_eq!(f.decide().priority, PriorityTier::Medium);

        f.topic = Some(topic("t-gap", TopicKind::Outer, TopicFreshness::Volatile));
        assert_eq!(f.decide().priority, PriorityTier::High);
    }
}
