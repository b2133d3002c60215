use crate::config::MatcherConfig;
use crate::fingerprint::{self, TokenSet};
use crate::inventory::{Inventory, InventoryItem, QuerySignalTable};
use crate::topics::{Topic, TopicSet};
use crate::types::{GapImportance, MatchCategory, MatchSource, TopicKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// Match output
// ---------------------------------------------------------------------------

/// Score breakdown behind a result's confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSignals {
    pub lexical: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_overlap: Option<f64>,
}

/// The verdict for one inventory item: where it landed, how strongly, and
/// against whom. Which optional fields are set depends on the category:
/// `winner_item_id` on cannibalization losers, the `nearest_*` pair on
/// orphans that scored against at least one topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    pub confidence: f64,
    pub category: MatchCategory,
    pub signals: MatchSignals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_confidence: Option<f64>,
}

/// A topic no inventory item qualified for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapTopic {
    pub topic_id: String,
    pub title: String,
    pub importance: GapImportance,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MatchStats {
    pub items: usize,
    pub matched: usize,
    pub orphans: usize,
    pub cannibalized: usize,
    pub gaps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub results: Vec<MatchResult>,
    pub gaps: Vec<GapTopic>,
    pub stats: MatchStats,
}

// ---------------------------------------------------------------------------
// TopicIndex
// ---------------------------------------------------------------------------

/// Inverted index token -> topic positions. Scoring only visits topics that
/// share at least one token with the probe set; everything outside the
/// bucket scores 0 against the item, so classification is identical with or
/// without the index.
pub struct TopicIndex {
    by_token: HashMap<String, Vec<usize>>,
    fingerprints: Vec<TokenSet>,
}

impl TopicIndex {
    pub fn build(topics: &[Topic]) -> Self {
        let fingerprints: Vec<TokenSet> = topics
            .iter()
            .map(|t| fingerprint::tokenize(&t.title))
            .collect();
        let mut by_token: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, tokens) in fingerprints.iter().enumerate() {
            for token in tokens {
                by_token.entry(token.clone()).or_default().push(pos);
            }
        }
        Self {
            by_token,
            fingerprints,
        }
    }

    pub fn fingerprint(&self, pos: usize) -> &TokenSet {
        &self.fingerprints[pos]
    }

    /// Positions of all topics sharing at least one token with `probe`.
    pub fn candidates(&self, probe: &TokenSet) -> BTreeSet<usize> {
        let mut out = BTreeSet::new();
        for token in probe {
            if let Some(positions) = self.by_token.get(token) {
                out.extend(positions.iter().copied());
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn item_fingerprint(item: &InventoryItem) -> TokenSet {
    let mut tokens = fingerprint::tokenize(&item.title);
    tokens.extend(fingerprint::url_path_tokens(&item.url));
    if let Some(desc) = &item.description {
        tokens.extend(fingerprint::tokenize(desc));
    }
    tokens
}

fn query_tokens(signals: &QuerySignalTable, url: &str) -> Option<TokenSet> {
    let queries = signals.queries_for(url)?;
    let mut tokens = TokenSet::new();
    for signal in queries {
        tokens.extend(fingerprint::tokenize(&signal.query));
    }
    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}

struct Scored {
    topic_pos: usize,
    score: f64,
    lexical: f64,
    query_overlap: Option<f64>,
}

/// Best-scoring topic for one item, or None when nothing scored above zero.
/// Score ties go to the lexicographically smaller topic id regardless of
/// candidate iteration order.
fn best_candidate(
    index: &TopicIndex,
    topics: &[Topic],
    item_tokens: &TokenSet,
    query: Option<&TokenSet>,
    config: &MatcherConfig,
) -> Option<Scored> {
    let mut probe = item_tokens.clone();
    if let Some(q) = query {
        probe.extend(q.iter().cloned());
    }

    let mut best: Option<Scored> = None;
    for pos in index.candidates(&probe) {
        let topic_tokens = index.fingerprint(pos);
        let lexical = fingerprint::jaccard(item_tokens, topic_tokens);
        let (score, query_overlap) = match query {
            Some(q) => {
                let overlap = fingerprint::coverage(q, topic_tokens);
                let blended = config.lexical_weight * lexical + config.query_weight * overlap;
                (blended, Some(overlap))
            }
            None => (lexical, None),
        };
        if score <= 0.0 {
            continue;
        }
        let replace = match &best {
            None => true,
            Some(current) => match score.total_cmp(&current.score) {
                Ordering::Greater => true,
                Ordering::Equal => topics[pos].id < topics[current.topic_pos].id,
                Ordering::Less => false,
            },
        };
        if replace {
            best = Some(Scored {
                topic_pos: pos,
                score,
                lexical,
                query_overlap,
            });
        }
    }
    best
}

// ---------------------------------------------------------------------------
// match_inventory
// ---------------------------------------------------------------------------

/// Map every inventory item onto its best topic and flag duplicate coverage.
///
/// Pure and deterministic: results come back in item input order, gaps in
/// topic input order, and every tie-break is by id. An empty signal table
/// just means lexical-only scoring.
pub fn match_inventory(
    inventory: &Inventory,
    topics: &TopicSet,
    signals: &QuerySignalTable,
    config: &MatcherConfig,
) -> MatchReport {
    let index = TopicIndex::build(&topics.topics);

    let mut results: Vec<MatchResult> = Vec::with_capacity(inventory.items.len());
    let mut candidates_by_topic: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    for item in &inventory.items {
        let item_tokens = item_fingerprint(item);
        let query = query_tokens(signals, &item.url);
        let best = best_candidate(&index, &topics.topics, &item_tokens, query.as_ref(), config);

        let result = match best {
            Some(b) if b.score >= config.match_threshold => {
                candidates_by_topic
                    .entry(b.topic_pos)
                    .or_default()
                    .push(results.len());
                MatchResult {
                    item_id: item.id.clone(),
                    topic_id: Some(topics.topics[b.topic_pos].id.clone()),
                    confidence: b.score,
                    category: MatchCategory::Matched,
                    signals: MatchSignals {
                        lexical: b.lexical,
                        query_overlap: b.query_overlap,
                    },
                    winner_item_id: None,
                    nearest_topic_id: None,
                    nearest_confidence: None,
                }
            }
            Some(b) => MatchResult {
                item_id: item.id.clone(),
                topic_id: None,
                confidence: b.score,
                category: MatchCategory::Orphan,
                signals: MatchSignals {
                    lexical: b.lexical,
                    query_overlap: b.query_overlap,
                },
                winner_item_id: None,
                nearest_topic_id: Some(topics.topics[b.topic_pos].id.clone()),
                nearest_confidence: Some(b.score),
            },
            None => MatchResult {
                item_id: item.id.clone(),
                topic_id: None,
                confidence: 0.0,
                category: MatchCategory::Orphan,
                signals: MatchSignals {
                    lexical: 0.0,
                    query_overlap: None,
                },
                winner_item_id: None,
                nearest_topic_id: None,
                nearest_confidence: None,
            },
        };
        results.push(result);
    }

    // Conflict resolution: a topic with several candidates keeps the
    // highest-scoring item (ties: smaller item id); the rest become
    // cannibalization losers pointing at the winner.
    for indices in candidates_by_topic.values() {
        if indices.len() < 2 {
            continue;
        }
        let mut winner = indices[0];
        for &idx in &indices[1..] {
            let replace = match results[idx].confidence.total_cmp(&results[winner].confidence) {
                Ordering::Greater => true,
                Ordering::Equal => results[idx].item_id < results[winner].item_id,
                Ordering::Less => false,
            };
            if replace {
                winner = idx;
            }
        }
        let winner_id = results[winner].item_id.clone();
        for &idx in indices {
            if idx != winner {
                results[idx].category = MatchCategory::Cannibalization;
                results[idx].winner_item_id = Some(winner_id.clone());
            }
        }
    }

    let mut gaps = Vec::new();
    for (pos, topic) in topics.topics.iter().enumerate() {
        if !candidates_by_topic.contains_key(&pos) {
            gaps.push(GapTopic {
                topic_id: topic.id.clone(),
                title: topic.title.clone(),
                importance: if topic.kind == TopicKind::Core {
                    GapImportance::Pillar
                } else {
                    GapImportance::Supporting
                },
            });
        }
    }

    let stats = MatchStats {
        items: results.len(),
        matched: results
            .iter()
            .filter(|r| r.category == MatchCategory::Matched)
            .count(),
        orphans: results
            .iter()
            .filter(|r| r.category == MatchCategory::Orphan)
            .count(),
        cannibalized: results
            .iter()
            .filter(|r| r.category == MatchCategory::Cannibalization)
            .count(),
        gaps: gaps.len(),
    };

    MatchReport {
        results,
        gaps,
        stats,
    }
}

// ---------------------------------------------------------------------------
// Batch confirm
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConfirmOutcome {
    pub confirmed: usize,
    pub skipped: usize,
}

/// Write matcher verdicts into the inventory's disposition fields. Only
/// `matched` results at or above `min_confidence` are taken; everything
/// else counts as skipped.
pub fn apply_confirmations(
    inventory: &mut Inventory,
    results: &[MatchResult],
    min_confidence: f64,
) -> ConfirmOutcome {
    let mut outcome = ConfirmOutcome::default();
    for result in results {
        if result.category != MatchCategory::Matched || result.confidence < min_confidence {
            outcome.skipped += 1;
            continue;
        }
        let (Some(topic_id), Some(item)) = (
            result.topic_id.as_deref(),
            inventory.find_mut(&result.item_id),
        ) else {
            outcome.skipped += 1;
            continue;
        };
        item.mapped_topic_id = Some(topic_id.to_string());
        item.match_category = Some(MatchCategory::Matched);
        item.match_confidence = Some(result.confidence);
        item.match_source = Some(MatchSource::Matcher);
        outcome.confirmed += 1;
    }
    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::QuerySignal;
    use crate::types::TopicFreshness;

    fn item(id: &str, url: &str, title: &str, clicks: u64) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            url: url.to_string(),
            title: title.to_string(),
            description: None,
            monthly_clicks: clicks,
            mapped_topic_id: None,
            match_category: None,
            match_confidence: None,
            match_source: None,
        }
    }

    fn topic(id: &str, title: &str, kind: TopicKind) -> Topic {
        Topic {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            parent_id: None,
            freshness: TopicFreshness::Evergreen,
        }
    }

    fn inventory(items: Vec<InventoryItem>) -> Inventory {
        Inventory { version: 1, items }
    }

    fn topic_set(topics: Vec<Topic>) -> TopicSet {
        TopicSet { version: 1, topics }
    }

    fn run(inv: &Inventory, set: &TopicSet) -> MatchReport {
        match_inventory(inv, set, &QuerySignalTable::default(), &MatcherConfig::default())
    }

    #[test]
    fn exact_title_match() {
        let inv = inventory(vec![item(
            "page-1",
            "https://example.com/mountain-bikes",
            "Mountain Bikes",
            100,
        )]);
        let set = topic_set(vec![topic("t-mountain", "Mountain Bikes", TopicKind::Core)]);

        let report = run(&inv, &set);
        let r = &report.results[0];
        assert_eq!(r.category, MatchCategory::Matched);
        assert_eq!(r.topic_id.as_deref(), Some("t-mountain"));
        assert!((r.confidence - 1.0).abs() < 1e-9);
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn lexical_score_unscaled_without_signals() {
        let inv = inventory(vec![item(
            "page-1",
            "https://example.com/road-bikes-guide",
            "Road Bikes Guide",
            0,
        )]);
        let set = topic_set(vec![topic("t-road", "Road Bikes", TopicKind::Core)]);

        let report = run(&inv, &set);
        let r = &report.results[0];
        // jaccard {road,bikes,guide} vs {road,bikes} = 2/3, not 0.7 * 2/3
        assert!((r.confidence - 2.0 / 3.0).abs() < 1e-9);
        assert!(r.signals.query_overlap.is_none());
    }

    #[test]
    fn contested_topic_single_winner() {
        let inv = inventory(vec![
            item("page-b", "https://example.com/b", "Mountain Bikes", 50),
            item("page-a", "https://example.com/a", "Mountain Bikes", 900),
            item("page-c", "https://example.com/c", "Mountain Bikes Guide", 10),
        ]);
        let set = topic_set(vec![topic("t-mountain", "Mountain Bikes", TopicKind::Core)]);

        let report = run(&inv, &set);
        let matched: Vec<_> = report
            .results
            .iter()
            .filter(|r| r.category == MatchCategory::Matched)
            .collect();
        let losers: Vec<_> = report
            .results
            .iter()
            .filter(|r| r.category == MatchCategory::Cannibalization)
            .collect();

        // Both 1.0 scorers tie; the smaller item id wins, clicks are not consulted
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].item_id, "page-a");
        assert_eq!(losers.len(), 2);
        for loser in &losers {
            assert_eq!(loser.winner_item_id.as_deref(), Some("page-a"));
            assert_eq!(loser.topic_id.as_deref(), Some("t-mountain"));
        }
        assert_eq!(report.stats.matched, 1);
        assert_eq!(report.stats.cannibalized, 2);
    }

    #[test]
    fn equal_topics_prefer_smaller_topic_id() {
        let inv = inventory(vec![item(
            "page-1",
            "https://example.com/p1",
            "Mountain Bikes",
            0,
        )]);
        let set = topic_set(vec![
            topic("t-b", "Mountain Bikes", TopicKind::Core),
            topic("t-a", "Mountain Bikes", TopicKind::Core),
        ]);

        let report = run(&inv, &set);
        assert_eq!(report.results[0].topic_id.as_deref(), Some("t-a"));
    }

    #[test]
    fn sub_threshold_orphan_keeps_nearest() {
        let inv = inventory(vec![item(
            "page-1",
            "https://example.com/frame-sizing-chart",
            "Frame Sizing Chart",
            800,
        )]);
        let set = topic_set(vec![topic(
            "t-frames",
            "Frame Materials Guide",
            TopicKind::Outer,
        )]);

        let report = run(&inv, &set);
        let r = &report.results[0];
        // jaccard = 1/5 = 0.2, below the 0.25 threshold
        assert_eq!(r.category, MatchCategory::Orphan);
        assert!(r.topic_id.is_none());
        assert_eq!(r.nearest_topic_id.as_deref(), Some("t-frames"));
        assert!((r.nearest_confidence.unwrap() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn zero_overlap_orphan_has_no_nearest() {
        let inv = inventory(vec![item(
            "page-1",
            "https://example.com/contact",
            "Contact Us",
            0,
        )]);
        let set = topic_set(vec![topic("t-road", "Road Bikes", TopicKind::Core)]);

        let report = run(&inv, &set);
        let r = &report.results[0];
        assert_eq!(r.category, MatchCategory::Orphan);
        assert!(r.nearest_topic_id.is_none());
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn empty_token_item_scores_zero_not_nan() {
        // Title is all stop words; URL path is empty
        let inv = inventory(vec![item("page-1", "https://example.com/", "Of The", 0)]);
        let set = topic_set(vec![topic("t-road", "Road Bikes", TopicKind::Core)]);

        let report = run(&inv, &set);
        let r = &report.results[0];
        assert_eq!(r.category, MatchCategory::Orphan);
        assert!(r.confidence.is_finite());
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.signals.lexical, 0.0);
    }

    #[test]
    fn query_signals_blend_into_score() {
        let mut signals = QuerySignalTable::default();
        signals.urls.insert(
            "https://example.com/headgear".to_string(),
            vec![QuerySignal {
                query: "bike helmets".to_string(),
                monthly_clicks: 320,
            }],
        );
        let inv = inventory(vec![item(
            "page-1",
            "https://example.com/headgear",
            "Protective Headgear",
            320,
        )]);
        let set = topic_set(vec![topic("t-helmets", "Bike Helmets", TopicKind::Outer)]);

        let report = match_inventory(&inv, &set, &signals, &MatcherConfig::default());
        let r = &report.results[0];
        // lexical 0, query coverage 1.0 -> 0.7*0 + 0.3*1 = 0.3 >= 0.25
        assert_eq!(r.category, MatchCategory::Matched);
        assert_eq!(r.topic_id.as_deref(), Some("t-helmets"));
        assert!((r.confidence - 0.3).abs() < 1e-9);
        assert_eq!(r.signals.lexical, 0.0);
        assert!((r.signals.query_overlap.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn uncovered_topics_become_gaps() {
        let inv = inventory(vec![item(
            "page-1",
            "https://example.com/p1",
            "Mountain Bikes",
            100,
        )]);
        let set = topic_set(vec![
            topic("t-mountain", "Mountain Bikes", TopicKind::Core),
            topic("t-gravel", "Gravel Riding", TopicKind::Core),
            topic("t-bells", "Handlebar Bells", TopicKind::Outer),
        ]);

        let report = run(&inv, &set);
        assert_eq!(report.gaps.len(), 2);
        assert_eq!(report.gaps[0].topic_id, "t-gravel");
        assert_eq!(report.gaps[0].importance, GapImportance::Pillar);
        assert_eq!(report.gaps[1].topic_id, "t-bells");
        assert_eq!(report.gaps[1].importance, GapImportance::Supporting);
        assert_eq!(report.stats.gaps, 2);
    }

    #[test]
    fn every_item_gets_exactly_one_result() {
        let inv = inventory(vec![
            item("page-1", "https://example.com/a", "Mountain Bikes", 10),
            item("page-2", "https://example.com/b", "Road Bikes", 20),
            item("page-3", "https://example.com/c", "Contact Us", 0),
        ]);
        let set = topic_set(vec![topic("t-mountain", "Mountain Bikes", TopicKind::Core)]);

        let report = run(&inv, &set);
        let ids: Vec<_> = report.results.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["page-1", "page-2", "page-3"]);
        assert_eq!(report.stats.items, 3);
    }

    #[test]
    fn degenerate_inputs_yield_empty_collections() {
        let empty_inv = inventory(vec![]);
        let set = topic_set(vec![topic("t-road", "Road Bikes", TopicKind::Core)]);
        let report = run(&empty_inv, &set);
        assert!(report.results.is_empty());
        assert_eq!(report.gaps.len(), 1);

        let inv = inventory(vec![item("page-1", "https://example.com/a", "Road Bikes", 0)]);
        let report = run(&inv, &topic_set(vec![]));
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].category, MatchCategory::Orphan);
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn identical_inputs_identical_output() {
        let inv = inventory(vec![
            item("page-1", "https://example.com/a", "Mountain Bikes", 10),
            item("page-2", "https://example.com/b", "Mountain Bikes Guide", 20),
            item("page-3", "https://example.com/c", "Frame Sizing Chart", 800),
        ]);
        let set = topic_set(vec![
            topic("t-mountain", "Mountain Bikes", TopicKind::Core),
            topic("t-frames", "Frame Materials Guide", TopicKind::Outer),
        ]);

        let first = serde_json::to_string(&run(&inv, &set)).unwrap();
        let second = serde_json::to_string(&run(&inv, &set)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn index_candidates_share_tokens() {
        let topics = vec![
            topic("t-mountain", "Mountain Bikes", TopicKind::Core),
            topic("t-helmets", "Bike Helmets", TopicKind::Outer),
        ];
        let index = TopicIndex::build(&topics);

        let probe: TokenSet = ["mountain".to_string()].into_iter().collect();
        assert_eq!(index.candidates(&probe), [0].into_iter().collect());

        let probe: TokenSet = ["bikes".to_string()].into_iter().collect();
        assert_eq!(index.candidates(&probe), [0].into_iter().collect());

        let probe: TokenSet = ["skis".to_string()].into_iter().collect();
        assert!(index.candidates(&probe).is_empty());
    }

    fn confirm_fixture(item_id: &str, confidence: f64, category: MatchCategory) -> MatchResult {
        MatchResult {
            item_id: item_id.to_string(),
            topic_id: Some("t-1".to_string()),
            confidence,
            category,
            signals: MatchSignals {
                lexical: confidence,
                query_overlap: None,
            },
            winner_item_id: None,
            nearest_topic_id: None,
            nearest_confidence: None,
        }
    }

    #[test]
    fn confirm_takes_matched_above_floor_only() {
        let mut inv = inventory(
            (1..=10)
                .map(|n| {
                    item(
                        &format!("page-{n:02}"),
                        &format!("https://example.com/{n}"),
                        "Page",
                        0,
                    )
                })
                .collect(),
        );
        let mut results = Vec::new();
        for n in 1..=6 {
            results.push(confirm_fixture(
                &format!("page-{n:02}"),
                0.8 + n as f64 / 100.0,
                MatchCategory::Matched,
            ));
        }
        results.push(confirm_fixture("page-07", 0.79, MatchCategory::Matched));
        results.push(confirm_fixture("page-08", 0.5, MatchCategory::Matched));
        results.push(confirm_fixture("page-09", 0.9, MatchCategory::Cannibalization));
        results.push(confirm_fixture("page-10", 0.9, MatchCategory::Orphan));

        let outcome = apply_confirmations(&mut inv, &results, 0.8);
        assert_eq!(outcome.confirmed, 6);
        assert_eq!(outcome.skipped, 4);

        let confirmed = inv.find("page-01").unwrap();
        assert_eq!(confirmed.mapped_topic_id.as_deref(), Some("t-1"));
        assert_eq!(confirmed.match_source, Some(MatchSource::Matcher));
        assert!(inv.find("page-07").unwrap().mapped_topic_id.is_none());
    }
}
