use crate::config::{BusinessContext, SchedulerConfig};
use crate::fingerprint;
use crate::types::{EffortTier, TopicKind, WaveNumber, WaveStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Inputs / outputs
// ---------------------------------------------------------------------------

/// One schedulable unit: a plan entry's identity plus the facts ranking
/// consults. `kind`/`depth` come from the linked topic when there is one.
#[derive(Debug, Clone)]
pub struct WaveCandidate {
    pub id: String,
    pub title: String,
    pub kind: Option<TopicKind>,
    pub depth: usize,
    pub monthly_clicks: u64,
    pub effort: EffortTier,
}

/// A candidate plus its current scheduling state, for rebalancing.
#[derive(Debug, Clone)]
pub struct RebalanceInput {
    pub candidate: WaveCandidate,
    pub pinned: bool,
    pub wave: Option<WaveNumber>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveAssignment {
    pub wave: WaveNumber,
    pub item_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Value ranking
// ---------------------------------------------------------------------------

/// Title tokens that signal purchase-stage intent. Sorted for binary search.
const COMMERCIAL_INTENT_TERMS: &[&str] = &[
    "alternatives",
    "best",
    "buy",
    "cheap",
    "compare",
    "comparison",
    "cost",
    "coupon",
    "deal",
    "deals",
    "discount",
    "price",
    "pricing",
    "review",
    "reviews",
    "sale",
    "top",
    "vs",
];

fn has_commercial_intent(title: &str) -> bool {
    fingerprint::tokenize(title)
        .iter()
        .any(|token| COMMERCIAL_INTENT_TERMS.binary_search(&token.as_str()).is_ok())
}

/// Business-value proxy behind `monetization_first` and the value half of
/// `quick_wins`: core topics, affinity to the site's core entity, commercial
/// intent in the title, and (log-damped) click volume all add; tree depth
/// subtracts.
fn monetization_value(
    candidate: &WaveCandidate,
    context: &BusinessContext,
    config: &SchedulerConfig,
) -> f64 {
    let mut value = 0.0;
    if candidate.kind == Some(TopicKind::Core) {
        value += config.core_topic_weight;
    }
    if let Some(core_entity) = &context.core_entity {
        let affinity = fingerprint::jaccard(
            &fingerprint::tokenize(&candidate.title),
            &fingerprint::tokenize(core_entity),
        );
        value += config.entity_affinity_weight * affinity;
    }
    if has_commercial_intent(&candidate.title) {
        value += config.commercial_intent_weight;
    }
    let click_factor = ((1.0 + candidate.monthly_clicks as f64).log10() / 4.0).min(1.0);
    value += config.click_weight * click_factor;
    value - config.depth_penalty * candidate.depth as f64
}

fn strategy_value(
    candidate: &WaveCandidate,
    strategy: WaveStrategy,
    context: &BusinessContext,
    config: &SchedulerConfig,
) -> f64 {
    match strategy {
        WaveStrategy::MonetizationFirst | WaveStrategy::QuickWins => {
            monetization_value(candidate, context, config)
        }
        WaveStrategy::TrafficFirst => candidate.monthly_clicks as f64,
    }
}

/// Rank candidates for wave assignment. `quick_wins` sorts by ascending
/// effort before value; every strategy breaks remaining ties by id so the
/// order never depends on input arrangement.
fn ranked<'a>(
    candidates: impl Iterator<Item = &'a WaveCandidate>,
    strategy: WaveStrategy,
    context: &BusinessContext,
    config: &SchedulerConfig,
) -> Vec<&'a WaveCandidate> {
    let mut scored: Vec<(&WaveCandidate, f64)> = candidates
        .map(|c| (c, strategy_value(c, strategy, context, config)))
        .collect();
    scored.sort_by(|(a, value_a), (b, value_b)| {
        let by_value = value_b.total_cmp(value_a).then_with(|| a.id.cmp(&b.id));
        if strategy == WaveStrategy::QuickWins {
            a.effort.cmp(&b.effort).then(by_value)
        } else {
            by_value
        }
    });
    scored.into_iter().map(|(c, _)| c).collect()
}

// ---------------------------------------------------------------------------
// Wave assignment
// ---------------------------------------------------------------------------

/// Balanced wave sizes with the remainder front-loaded: 10 -> 3,3,2,2.
fn wave_sizes(total: usize) -> [usize; 4] {
    let mut sizes = [total / 4; 4];
    for size in sizes.iter_mut().take(total % 4) {
        *size += 1;
    }
    sizes
}

/// Partition candidates into four waves: rank by strategy value, then cut
/// the ranked order into balanced contiguous chunks. Every input id lands in
/// exactly one wave.
pub fn assign_waves(
    candidates: &[WaveCandidate],
    strategy: WaveStrategy,
    context: &BusinessContext,
    config: &SchedulerConfig,
) -> Vec<WaveAssignment> {
    let order = ranked(candidates.iter(), strategy, context, config);
    let sizes = wave_sizes(order.len());

    let mut assignments = Vec::with_capacity(4);
    let mut cursor = 0;
    for (wave, size) in WaveNumber::all().iter().zip(sizes) {
        let item_ids = order[cursor..cursor + size]
            .iter()
            .map(|c| c.id.clone())
            .collect();
        cursor += size;
        assignments.push(WaveAssignment {
            wave: *wave,
            item_ids,
        });
    }
    assignments
}

/// Recompute waves over the active entry set without touching pins.
///
/// Balanced targets are computed over the whole input; each pinned entry
/// consumes a slot of the wave it holds, and the remaining entries are
/// ranked exactly as in initial assignment and poured into waves 1 to 4 by
/// leftover capacity. Returns new waves for the movable subset only.
pub fn rebalance_waves(
    inputs: &[RebalanceInput],
    strategy: WaveStrategy,
    context: &BusinessContext,
    config: &SchedulerConfig,
) -> BTreeMap<String, WaveNumber> {
    let mut capacity = wave_sizes(inputs.len());
    for input in inputs {
        if input.pinned {
            if let Some(wave) = input.wave {
                let slot = (wave.number() - 1) as usize;
                capacity[slot] = capacity[slot].saturating_sub(1);
            }
        }
    }

    let movable = ranked(
        inputs
            .iter()
            .filter(|i| !(i.pinned && i.wave.is_some()))
            .map(|i| &i.candidate),
        strategy,
        context,
        config,
    );

    let mut result = BTreeMap::new();
    let mut slot = 0usize;
    for candidate in movable {
        while slot < 4 && capacity[slot] == 0 {
            slot += 1;
        }
        let wave = match WaveNumber::all().get(slot) {
            Some(wave) => {
                capacity[slot] -= 1;
                *wave
            }
            None => WaveNumber::Four,
        };
        result.insert(candidate.id.clone(), wave);
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
