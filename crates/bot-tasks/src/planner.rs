//! Frontier planner: pick the next dig or place inside the target volume.
//!
//! The search is breadth-first from the agent's position clamped into the
//! volume. The first frontier ring that holds any actionable cell wins; among
//! its candidates the one farthest (summed Manhattan distance) from the other
//! players is chosen, ties broken uniformly at random.

use std::collections::{BTreeSet, HashSet};
use std::ops::ControlFlow;
use std::sync::Arc;

use bot_core::{DeterministicRng, Status, TaskResult};
use bot_world::{AssetMetadata, Face, Position, RegionSnapshot, Vec3};

use crate::client::BehaviourClient;
use crate::confirm::{settle, TaskFailure};
use crate::keys;
use crate::structure::{StructureView, AIR};
use crate::world_tasks::{dig, place_block};

const ONE: Position = Position::new(1, 1, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskAction {
    Dig,
    Place,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTask {
    pub action: TaskAction,
    pub position: Position,
    pub face: Face,
    /// Set for [`TaskAction::Place`].
    pub item: Option<String>,
}

pub struct PlannerInput<'a> {
    pub structure: &'a StructureView,
    pub available: &'a BTreeSet<String>,
    /// Block the local player stands in.
    pub player: Position,
    pub other_players: &'a [Vec3],
}

/// Box to snapshot for a plan: the volume plus one cell of margin, so anchors
/// and openings just outside the volume are visible.
pub fn planning_region(structure: &StructureView) -> (Position, Position) {
    (structure.start - ONE, structure.end + ONE)
}

pub fn plan(
    input: &PlannerInput<'_>,
    region: &RegionSnapshot,
    assets: &dyn AssetMetadata,
    rng: &mut impl DeterministicRng,
) -> Option<PlannedTask> {
    let start = input.structure.start;
    let end = input.structure.end;

    let mut frontier = BTreeSet::from([input.player.clamp(start, end)]);
    let mut explored = HashSet::new();

    while !frontier.is_empty() {
        let candidates: Vec<PlannedTask> = frontier
            .iter()
            .filter_map(|&pos| classify(pos, input, region, assets))
            .collect();
        if !candidates.is_empty() {
            return pick(candidates, input.other_players, rng);
        }

        explored.extend(frontier.iter().copied());
        frontier = frontier
            .iter()
            .flat_map(|p| p.neighbours().map(|(n, _)| n))
            .filter(|n| n.within(start, end) && !explored.contains(n))
            .collect();
    }
    None
}

fn classify(
    pos: Position,
    input: &PlannerInput<'_>,
    region: &RegionSnapshot,
    assets: &dyn AssetMetadata,
) -> Option<PlannedTask> {
    let target = input.structure.target_at(pos)?;
    // Unknown cells are neither candidates nor anchors.
    let current = assets.blockstate(region.get(pos)?)?;
    let known_air = |p: Position| region.get(p).and_then(|id| assets.is_air(id));

    if current.is_air() {
        if target == AIR {
            return None;
        }
        let name = input.structure.name_of(target)?;
        if !input.available.contains(name) {
            return None;
        }
        let face = pos
            .neighbours()
            .find_map(|(n, face)| (known_air(n) == Some(false)).then_some(face))?;
        return Some(PlannedTask {
            action: TaskAction::Place,
            position: pos,
            face,
            item: Some(name.to_string()),
        });
    }

    let wrong = target == AIR || input.structure.name_of(target) != Some(current.name());
    if !wrong {
        return None;
    }
    let face = pos
        .neighbours()
        .find_map(|(n, face)| (known_air(n) == Some(true)).then_some(face.opposite()))?;
    Some(PlannedTask {
        action: TaskAction::Dig,
        position: pos,
        face,
        item: None,
    })
}

fn pick(
    mut candidates: Vec<PlannedTask>,
    others: &[Vec3],
    rng: &mut impl DeterministicRng,
) -> Option<PlannedTask> {
    let scores: Vec<f64> = candidates
        .iter()
        .map(|c| others.iter().map(|p| c.position.manhattan_to(*p)).sum())
        .collect();
    let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let tied: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == best)
        .map(|(i, _)| i)
        .collect();
    let chosen = *rng.choose(&tied)?;
    Some(candidates.swap_remove(chosen))
}

/// Plan the next action and publish it under the `NextTask.*` keys.
/// Fails when nothing in the volume is actionable.
pub fn find_next_task(c: &mut BehaviourClient) -> TaskResult {
    let structure = StructureView::read(c.blackboard())?;
    let available = keys::INVENTORY_BLOCK_LIST.get(c.blackboard())?.clone();

    let Some(player) = c
        .entities()
        .read(|e| e.local_player().map(|p| Position::containing(p.position)))
    else {
        let failure = TaskFailure::impossible("local player position unknown");
        return Ok(settle(c, "find next task", Err(failure)));
    };
    let other_players = c.entities().read(|e| e.other_player_positions());
    let (min, max) = planning_region(&structure);
    let region = c.world().read(|w| RegionSnapshot::capture(w, min, max));

    let input = PlannerInput {
        structure: &structure,
        available: &available,
        player,
        other_players: &other_players,
    };
    let assets = Arc::clone(&c.handles().assets);
    let Some(task) = plan(&input, &region, assets.as_ref(), c.rng()) else {
        return Ok(settle(c, "find next task", Err(TaskFailure::PlannerExhausted)));
    };

    tracing::debug!(
        agent = %c.name(),
        action = ?task.action,
        position = %task.position,
        face = ?task.face,
        item = task.item.as_deref().unwrap_or(""),
        "next task"
    );
    let bb = c.blackboard_mut();
    keys::NEXT_TASK_ACTION.set(bb, task.action);
    keys::NEXT_TASK_POSITION.set(bb, task.position);
    keys::NEXT_TASK_FACE.set(bb, task.face);
    match task.item {
        Some(item) => keys::NEXT_TASK_ITEM.set(bb, item),
        None => {
            bb.remove(keys::NEXT_TASK_ITEM.name());
        }
    }
    Ok(Status::Success)
}

/// Run whatever [`find_next_task`] published.
pub fn execute_next_task(c: &mut BehaviourClient) -> TaskResult {
    let action = *keys::NEXT_TASK_ACTION.get(c.blackboard())?;
    let position = *keys::NEXT_TASK_POSITION.get(c.blackboard())?;
    let face = *keys::NEXT_TASK_FACE.get(c.blackboard())?;
    match action {
        TaskAction::Dig => dig(c, position, face),
        TaskAction::Place => {
            let item = keys::NEXT_TASK_ITEM.get(c.blackboard())?.clone();
            place_block(c, &item, position, face, true)
        }
    }
}

/// One cell of the volume that does not match the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Target is a block but the cell is air, or not loaded at all.
    Missing {
        position: Position,
        expected: String,
        loaded: bool,
    },
    Wrong {
        position: Position,
        found: String,
        expected: String,
    },
    /// Target is air but the cell holds a block.
    Additional { position: Position, found: String },
}

/// Walk the volume in x, y, z order and hand every mismatching cell to
/// `visit`, stopping early when it breaks.
pub fn compare_volume(
    structure: &StructureView,
    region: &RegionSnapshot,
    assets: &dyn AssetMetadata,
    mut visit: impl FnMut(Mismatch) -> ControlFlow<()>,
) {
    for x in structure.start.x..=structure.end.x {
        for y in structure.start.y..=structure.end.y {
            for z in structure.start.z..=structure.end.z {
                let position = Position::new(x, y, z);
                let target = structure.target_at(position).unwrap_or(AIR);
                let expected = structure.name_of(target).unwrap_or_default();
                let current = region.get(position).and_then(|id| assets.blockstate(id));

                let mismatch = match current {
                    None if target == AIR => None,
                    None => Some(Mismatch::Missing {
                        position,
                        expected: expected.to_string(),
                        loaded: false,
                    }),
                    Some(state) if state.is_air() => (target != AIR).then(|| Mismatch::Missing {
                        position,
                        expected: expected.to_string(),
                        loaded: true,
                    }),
                    Some(state) if target == AIR => Some(Mismatch::Additional {
                        position,
                        found: state.name().to_string(),
                    }),
                    Some(state) => (state.name() != expected).then(|| Mismatch::Wrong {
                        position,
                        found: state.name().to_string(),
                        expected: expected.to_string(),
                    }),
                };

                if let Some(mismatch) = mismatch {
                    if visit(mismatch).is_break() {
                        return;
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionReport {
    pub missing: usize,
    pub wrong: usize,
    pub additional: usize,
}

impl CompletionReport {
    /// Count every mismatch in the volume.
    pub fn measure(
        structure: &StructureView,
        region: &RegionSnapshot,
        assets: &dyn AssetMetadata,
    ) -> Self {
        let mut report = Self::default();
        compare_volume(structure, region, assets, |mismatch| {
            report.record(&mismatch);
            ControlFlow::Continue(())
        });
        report
    }

    pub fn record(&mut self, mismatch: &Mismatch) {
        match mismatch {
            Mismatch::Missing { .. } => self.missing += 1,
            Mismatch::Wrong { .. } => self.wrong += 1,
            Mismatch::Additional { .. } => self.additional += 1,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing + self.wrong + self.additional == 0
    }
}

const MAX_MISSING_DETAILS: usize = 100;

/// Compare the volume with the target.
///
/// Without `CheckCompletion.full_check` it stops at the first difference.
/// The three `CheckCompletion.*` flags default to false and are reset after
/// every call.
pub fn check_completion(c: &mut BehaviourClient) -> TaskResult {
    let structure = StructureView::read(c.blackboard())?;
    let print_details = keys::CHECK_COMPLETION_DETAILS.get_or(c.blackboard(), false)?;
    let print_errors = keys::CHECK_COMPLETION_ERRORS.get_or(c.blackboard(), false)?;
    let full_check = keys::CHECK_COMPLETION_FULL.get_or(c.blackboard(), false)?;
    {
        let bb = c.blackboard_mut();
        keys::CHECK_COMPLETION_DETAILS.set(bb, false);
        keys::CHECK_COMPLETION_ERRORS.set(bb, false);
        keys::CHECK_COMPLETION_FULL.set(bb, false);
    }

    let region = c
        .world()
        .read(|w| RegionSnapshot::capture(w, structure.start, structure.end));

    let agent = c.name();
    let mut report = CompletionReport::default();
    compare_volume(&structure, &region, c.assets(), |mismatch| {
        report.record(&mismatch);
        if print_details {
            match &mismatch {
                Mismatch::Missing {
                    position,
                    expected,
                    loaded,
                } if report.missing < MAX_MISSING_DETAILS => {
                    tracing::info!(agent, %position, block = %expected, loaded, "missing");
                }
                Mismatch::Missing { .. } => {}
                Mismatch::Wrong {
                    position,
                    found,
                    expected,
                } => {
                    tracing::info!(agent, %position, %found, %expected, "wrong");
                }
                Mismatch::Additional { position, found } => {
                    tracing::info!(agent, %position, block = %found, "additional");
                }
            }
        }
        if full_check {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    });

    if print_errors {
        tracing::info!(
            agent,
            wrong = report.wrong,
            missing = report.missing,
            additional = report.additional,
            "completion check"
        );
    }
    Ok(Status::from(report.is_complete()))
}
