use crate::config::Config;
use crate::error::{RemapError, Result};
use crate::inventory::{Inventory, QuerySignalTable};
use crate::io;
use crate::matcher::{match_inventory, MatchReport};
use crate::paths;
use crate::planner::{generate_plan, PlannedAction};
use crate::scheduler::{
    assign_waves, rebalance_waves, RebalanceInput, WaveAssignment, WaveCandidate,
};
use crate::topics::TopicSet;
use crate::types::{MigrationAction, PlanStatus, WaveNumber, WaveStrategy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// PlanEntry
// ---------------------------------------------------------------------------

/// One line of the migration plan: a planner verdict plus the scheduling and
/// user-override state folded around it. The id is the item id, or the topic
/// id for gap entries, and stays stable across regenerations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    pub id: String,
    pub action: PlannedAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave: Option<WaveNumber>,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub pinned: bool,
}

impl PlanEntry {
    fn holds_wave(&self) -> bool {
        self.pinned && self.wave.is_some()
    }
}

// ---------------------------------------------------------------------------
// MigrationPlan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub slug: String,
    pub title: String,
    pub plan_id: String,
    pub status: PlanStatus,
    pub strategy: WaveStrategy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub entries: Vec<PlanEntry>,
}

fn transition_allowed(from: PlanStatus, to: PlanStatus) -> bool {
    matches!(
        (from, to),
        (PlanStatus::Draft, PlanStatus::Generating)
            | (PlanStatus::Generating, PlanStatus::Ready)
            | (PlanStatus::Ready, PlanStatus::Generating)
            | (PlanStatus::Ready, PlanStatus::Approved)
    )
}

impl MigrationPlan {
    pub fn new(slug: &str, title: &str, strategy: WaveStrategy) -> Self {
        let now = Utc::now();
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            plan_id: Uuid::new_v4().to_string(),
            status: PlanStatus::Draft,
            strategy,
            created_at: now,
            updated_at: now,
            approved_at: None,
            entries: Vec::new(),
        }
    }

    pub fn create(root: &Path, slug: &str, title: &str, strategy: WaveStrategy) -> Result<Self> {
        paths::validate_slug(slug)?;
        let dir = paths::plan_dir(root, slug);
        if dir.exists() {
            return Err(RemapError::PlanExists(slug.to_string()));
        }
        io::ensure_dir(&dir)?;
        let plan = Self::new(slug, title, strategy);
        plan.save(root)?;
        Ok(plan)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        let path = paths::plan_manifest(root, slug);
        if !path.exists() {
            return Err(RemapError::PlanNotFound(slug.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let plan: MigrationPlan = serde_yaml::from_str(&data)?;
        Ok(plan)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::plan_manifest(root, &self.slug);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }

    /// All plans under `.remap/plans/`, oldest first.
    pub fn list(root: &Path) -> Result<Vec<MigrationPlan>> {
        let dir = root.join(paths::PLANS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut plans: Vec<MigrationPlan> = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let manifest = entry.path().join(paths::MANIFEST_FILE);
            if !manifest.exists() {
                continue;
            }
            let data = std::fs::read_to_string(&manifest)?;
            plans.push(serde_yaml::from_str(&data)?);
        }
        plans.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(plans)
    }

    // ---- Lifecycle ----

    pub fn transition(&mut self, target: PlanStatus) -> Result<()> {
        if !transition_allowed(self.status, target) {
            let reason = if self.status == PlanStatus::Approved {
                "approved plans are frozen"
            } else {
                "transition not allowed"
            };
            return Err(RemapError::InvalidTransition {
                from: self.status.to_string(),
                to: target.to_string(),
                reason: reason.to_string(),
            });
        }
        self.status = target;
        self.updated_at = Utc::now();
        if target == PlanStatus::Approved {
            self.approved_at = Some(self.updated_at);
        }
        Ok(())
    }

    /// Single-flight guard for generation, keyed by this plan. A plan stuck
    /// in `generating` (crashed run) is only re-entered with `force`.
    pub fn begin_generation(&mut self, force: bool) -> Result<()> {
        if self.status == PlanStatus::Generating {
            if force {
                self.updated_at = Utc::now();
                return Ok(());
            }
            return Err(RemapError::InvalidTransition {
                from: self.status.to_string(),
                to: PlanStatus::Generating.to_string(),
                reason: "generation already in progress (use --force to restart)".to_string(),
            });
        }
        self.transition(PlanStatus::Generating)
    }

    // ---- Folding engine output ----

    /// Rebuild the entry list from fresh planner output. Overrides
    /// (`removed`, `pinned`) and the current wave survive for entries whose
    /// id persists; entries the planner no longer produces are dropped.
    /// KEEP entries carry no wave: there is nothing to sequence.
    pub fn apply_actions(&mut self, actions: Vec<PlannedAction>) {
        let previous: BTreeMap<String, (Option<WaveNumber>, bool, bool)> = self
            .entries
            .drain(..)
            .map(|e| (e.id, (e.wave, e.removed, e.pinned)))
            .collect();

        for action in actions {
            let Some(id) = action.item_id.clone().or_else(|| action.topic_id.clone()) else {
                continue;
            };
            let (wave, removed, pinned) = previous.get(&id).copied().unwrap_or((None, false, false));
            let wave = if action.action == MigrationAction::Keep {
                None
            } else {
                wave
            };
            self.entries.push(PlanEntry {
                id,
                action,
                wave,
                removed,
                pinned,
            });
        }
        self.updated_at = Utc::now();
    }

    /// Active, schedulable entries as scheduler input. Titles and tree facts
    /// come from the linked topic when there is one, else from the item.
    pub fn wave_candidates(&self, inventory: &Inventory, topics: &TopicSet) -> Vec<WaveCandidate> {
        self.entries
            .iter()
            .filter(|e| !e.removed && e.action.action != MigrationAction::Keep)
            .map(|e| {
                let topic = e.action.topic_id.as_deref().and_then(|id| topics.find(id));
                let item = e.action.item_id.as_deref().and_then(|id| inventory.find(id));
                let title = topic
                    .map(|t| t.title.clone())
                    .or_else(|| item.map(|i| i.title.clone()))
                    .unwrap_or_else(|| e.id.clone());
                WaveCandidate {
                    id: e.id.clone(),
                    title,
                    kind: topic.map(|t| t.kind),
                    depth: topic.map(|t| topics.depth_of(&t.id)).unwrap_or(0),
                    monthly_clicks: item.map(|i| i.monthly_clicks).unwrap_or(0),
                    effort: e.action.effort,
                }
            })
            .collect()
    }

    /// Fold a fresh wave partition in. Pinned entries holding a wave are
    /// left alone; everything else takes the assigned wave, or None when the
    /// scheduler did not place it.
    pub fn apply_waves(&mut self, assignments: &[WaveAssignment]) {
        let mut by_id: BTreeMap<&str, WaveNumber> = BTreeMap::new();
        for assignment in assignments {
            for id in &assignment.item_ids {
                by_id.insert(id, assignment.wave);
            }
        }
        for entry in &mut self.entries {
            if entry.holds_wave() {
                continue;
            }
            entry.wave = by_id.get(entry.id.as_str()).copied();
        }
        self.updated_at = Utc::now();
    }

    /// Fold a rebalance delta in. Pinned entries holding a wave are left
    /// alone; moved ids take their new wave, and removed entries drop any
    /// stale wave. A later restore re-enters them unscheduled.
    pub fn apply_rebalance(&mut self, moves: &BTreeMap<String, WaveNumber>) {
        for entry in &mut self.entries {
            if entry.holds_wave() {
                continue;
            }
            if entry.removed {
                entry.wave = None;
            } else if let Some(wave) = moves.get(&entry.id) {
                entry.wave = Some(*wave);
            }
        }
        self.updated_at = Utc::now();
    }

    /// Run the whole pipeline and fold the results into this plan's entries.
    /// When any active schedulable entry is pinned to a wave, scheduling goes
    /// through the pin-respecting rebalance path; otherwise waves are
    /// assigned fresh. Status is the caller's concern.
    pub fn regenerate(
        &mut self,
        inventory: &Inventory,
        topics: &TopicSet,
        signals: &QuerySignalTable,
        config: &Config,
    ) -> MatchReport {
        let report = match_inventory(inventory, topics, signals, &config.matcher);
        let actions = generate_plan(inventory, topics, &report, &config.context, &config.planner);
        self.apply_actions(actions);

        let candidates = self.wave_candidates(inventory, topics);
        let has_pinned_waves = self.entries.iter().any(|e| {
            !e.removed && e.holds_wave() && e.action.action != MigrationAction::Keep
        });

        if has_pinned_waves {
            let inputs = self.rebalance_inputs(candidates);
            let moves = rebalance_waves(&inputs, self.strategy, &config.context, &config.scheduler);
            self.apply_rebalance(&moves);
        } else {
            let assignments =
                assign_waves(&candidates, self.strategy, &config.context, &config.scheduler);
            self.apply_waves(&assignments);
        }
        report
    }

    /// Re-pour the non-pinned active entries into waves by leftover capacity,
    /// keeping the planner verdicts as they are. Editable plans only.
    /// Returns the ids that took a new wave.
    pub fn rebalance(
        &mut self,
        inventory: &Inventory,
        topics: &TopicSet,
        config: &Config,
    ) -> Result<BTreeMap<String, WaveNumber>> {
        self.require_editable()?;
        let candidates = self.wave_candidates(inventory, topics);
        let inputs = self.rebalance_inputs(candidates);
        let moves = rebalance_waves(&inputs, self.strategy, &config.context, &config.scheduler);
        self.apply_rebalance(&moves);
        Ok(moves)
    }

    fn rebalance_inputs(&self, candidates: Vec<WaveCandidate>) -> Vec<RebalanceInput> {
        candidates
            .into_iter()
            .map(|candidate| {
                let entry = self.entries.iter().find(|e| e.id == candidate.id);
                RebalanceInput {
                    pinned: entry.map(|e| e.pinned).unwrap_or(false),
                    wave: entry.and_then(|e| e.wave),
                    candidate,
                }
            })
            .collect()
    }

    // ---- Entry access / overrides ----

    pub fn entry(&self, id: &str) -> Result<&PlanEntry> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| RemapError::EntryNotFound(id.to_string()))
    }

    pub fn entry_mut(&mut self, id: &str) -> Result<&mut PlanEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| RemapError::EntryNotFound(id.to_string()))
    }

    fn require_editable(&self) -> Result<()> {
        if self.status != PlanStatus::Ready {
            return Err(RemapError::PlanNotEditable {
                slug: self.slug.clone(),
                status: self.status.to_string(),
                reason: "entries can only be edited while ready".to_string(),
            });
        }
        Ok(())
    }

    pub fn remove_entry(&mut self, id: &str) -> Result<()> {
        self.require_editable()?;
        self.entry_mut(id)?.removed = true;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn restore_entry(&mut self, id: &str) -> Result<()> {
        self.require_editable()?;
        self.entry_mut(id)?.removed = false;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn pin_entry(&mut self, id: &str) -> Result<()> {
        self.require_editable()?;
        self.entry_mut(id)?.pinned = true;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn unpin_entry(&mut self, id: &str) -> Result<()> {
        self.require_editable()?;
        self.entry_mut(id)?.pinned = false;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.removed).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
