// Explosion snapshot and the restore queue built from it.
//
// An `Explosion` is created once per blast from the origin and the detector's
// list of affected cells, then drained block by block until it is finished.
//
// ## Construction
//
// 1. Cells in a different world from the origin are dropped.
// 2. The rest are stable-sorted by descending distance from the origin, so
//    the blast is rebuilt from the outside in and equidistant cells keep the
//    detector's scan order.
// 3. One pass over the sorted cells with a consumed-location list:
//    - A cell within `coincidence_epsilon` of a consumed location is a
//      duplicate and is skipped.
//    - An ordnance cell (TNT) is not recorded. It is re-armed instead: a
//      primed entity spawns at the cell center with a random fuse in
//      `[fuse_ticks_min, fuse_ticks_max)` and a launch velocity of
//      `launch_speed` along origin center -> cell center.
//    - Anything else becomes an `ExplodedBlock`. Containers get their
//      occupied slots copied; signs get text and color. A chest that the
//      world reports as one half of a double chest owns the other half as
//      its companion, and the other half's location is consumed so it is
//      never a separate entry.
//    Every accepted cell's location is consumed, so coincident inputs from
//    overlapping detection passes collapse to one entry.
// 4. A companion half is a whole block, not a point. It is not linked if an
//    accepted cell already lies in its block, and once linked, later cells
//    in its block are duplicates. Either way the block is queued once.
//
// A pairing query that cannot be resolved (a half is missing, or the cell is
// neither half) produces a `StructuralPairingError`. The error is logged and
// kept on the explosion, and the cell is recorded without a companion.
//
// ## Draining
//
// Entries live in a `VecDeque` and are only ever popped from the front. A
// popped entry is moved into `ExplodedBlock::restore`, which consumes it, so
// nothing is restored twice and nothing is skipped. `recover_one`,
// `recover_up_to` and `recover_all` differ only in how many they pop. Once
// the deque is empty the explosion is finished; the caller then passes it to
// `on_finished`, which consumes it and reports to the stats sink.
//
// Dropping an unfinished `Explosion` abandons it. Whatever was restored stays
// restored.
//
// See also: `exploded_block.rs` for the restore write order, `queue.rs` for
// the tick-driven driver, `config.rs` for the tunables read here.

use crate::cell::{AffectedCell, BlockSnapshot, PrimedOrdnance, TileState};
use crate::config::RecoverConfig;
use crate::exploded_block::ExplodedBlock;
use crate::payload::{BlockPayload, ContainerItems, SignLines};
use crate::stats::StatsSink;
use crate::types::Location;
use crate::world::BlockWorld;
use creeper_recover_prng::RecoverRng;
use log::{debug, warn};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// Which half of a double chest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChestSide {
    Left,
    Right,
}

impl fmt::Display for ChestSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChestSide::Left => f.write_str("left"),
            ChestSide::Right => f.write_str("right"),
        }
    }
}

/// The world's double-chest answer for a cell could not be used.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum StructuralPairingError {
    #[error("double chest at {at} has no resolvable {side} half")]
    MissingHalf { at: Location, side: ChestSide },
    #[error("cell at {at} is neither half of its reported double chest")]
    CellNotInPair { at: Location },
}

pub struct Explosion {
    origin: Location,
    blocks: VecDeque<ExplodedBlock>,
    pairing_errors: Vec<StructuralPairingError>,
    rearmed: usize,
    duplicates: usize,
}

impl Explosion {
    /// Snapshot an explosion. Re-armed ordnance is spawned into `world`
    /// immediately; everything else is queued for restoration.
    pub fn new<W: BlockWorld + ?Sized>(
        origin: Location,
        cells: Vec<AffectedCell>,
        world: &mut W,
        rng: &mut RecoverRng,
        config: &RecoverConfig,
    ) -> Self {
        let epsilon = config.coincidence_epsilon;
        let mut sorted: Vec<(f64, AffectedCell)> = Vec::with_capacity(cells.len());
        for cell in cells {
            if cell.location.world != origin.world {
                warn!(
                    "dropping cell at {} outside the explosion's world {}",
                    cell.location, origin.world.0
                );
                continue;
            }
            sorted.push((cell.location.distance(&origin), cell));
        }
        sorted.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut explosion = Self {
            origin,
            blocks: VecDeque::with_capacity(sorted.len()),
            pairing_errors: Vec::new(),
            rearmed: 0,
            duplicates: 0,
        };
        let mut claims = Claims::with_capacity(sorted.len(), epsilon);

        for (_, cell) in sorted {
            if claims.is_duplicate(&cell.location) {
                explosion.duplicates += 1;
                continue;
            }
            claims.consumed.push(cell.location);

            if config.is_ordnance(cell.material.as_str()) {
                world.spawn_primed_ordnance(rearm(&origin, &cell, rng, config));
                explosion.rearmed += 1;
                continue;
            }

            let block = explosion.capture(cell, &*world, &mut claims);
            explosion.blocks.push_back(block);
        }

        debug!(
            "explosion at {}: {} blocks queued, {} ordnance re-armed, {} duplicates skipped",
            explosion.origin,
            explosion.blocks.len(),
            explosion.rearmed,
            explosion.duplicates
        );
        explosion
    }

    fn capture<W: BlockWorld + ?Sized>(
        &mut self,
        cell: AffectedCell,
        world: &W,
        claims: &mut Claims,
    ) -> ExplodedBlock {
        let AffectedCell {
            location,
            material,
            data,
            state,
        } = cell;
        let mut block = ExplodedBlock::new(location, material, data);
        match state {
            Some(TileState::Container { slots, chest }) => {
                block.add_payload(BlockPayload::StoredItems(ContainerItems::from_slots(
                    &slots,
                )));
                if chest {
                    match companion_half(&location, world, claims.epsilon) {
                        Ok(Some(other)) if claims.holds_block(&other.location) => {
                            debug!(
                                "chest half at {} already queued, not linking it to {}",
                                other.location, location
                            );
                        }
                        Ok(Some(other)) => {
                            claims.consumed.push(other.location);
                            claims.companions.push(other.location);
                            if let Err(rejected) = block.connect(ExplodedBlock::from_snapshot(other))
                            {
                                warn!("companion at {} was not linked", rejected.location());
                            }
                        }
                        Ok(None) => {}
                        Err(err) => {
                            warn!("skipping double chest link: {err}");
                            self.pairing_errors.push(err);
                        }
                    }
                }
            }
            Some(TileState::Sign { lines, color }) => {
                block.add_payload(BlockPayload::SignText(SignLines(lines)));
                block.add_payload(BlockPayload::SignColor(color));
            }
            None => {}
        }
        block
    }

    /// Restore the next (farthest pending) entry. Returns `false` when there
    /// was nothing left.
    pub fn recover_one<W: BlockWorld + ?Sized>(&mut self, world: &mut W) -> bool {
        match self.blocks.pop_front() {
            Some(block) => {
                block.restore(world);
                true
            }
            None => false,
        }
    }

    /// Restore every remaining entry. Returns how many were restored.
    pub fn recover_all<W: BlockWorld + ?Sized>(&mut self, world: &mut W) -> usize {
        let mut recovered = 0;
        while let Some(block) = self.blocks.pop_front() {
            block.restore(world);
            recovered += 1;
        }
        recovered
    }

    /// Restore at most `amount` entries. Returns how many were restored.
    pub fn recover_up_to<W: BlockWorld + ?Sized>(&mut self, amount: usize, world: &mut W) -> usize {
        let mut recovered = 0;
        while recovered < amount {
            let Some(block) = self.blocks.pop_front() else {
                break;
            };
            block.restore(world);
            recovered += 1;
        }
        recovered
    }

    pub fn is_finished(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Completion hook. Reports one recovered explosion to `stats` and
    /// consumes the explosion.
    ///
    /// Calling this before `is_finished()` abandons the remaining entries and
    /// reports nothing.
    pub fn on_finished<S: StatsSink + ?Sized>(self, stats: &S) {
        if self.is_finished() {
            stats.explosion_recovered();
        } else {
            warn!(
                "explosion at {} closed with {} blocks unrestored",
                self.origin,
                self.blocks.len()
            );
        }
    }

    pub fn origin(&self) -> &Location {
        &self.origin
    }

    /// Pending entries in restore order.
    pub fn blocks(&self) -> impl ExactSizeIterator<Item = &ExplodedBlock> {
        self.blocks.iter()
    }

    /// Number of pending top-level entries.
    pub fn remaining(&self) -> usize {
        self.blocks.len()
    }

    /// Pairing problems hit during construction.
    pub fn pairing_errors(&self) -> &[StructuralPairingError] {
        &self.pairing_errors
    }

    /// Ordnance cells re-armed during construction.
    pub fn rearmed_ordnance(&self) -> usize {
        self.rearmed
    }

    /// Input cells dropped as coincident with an earlier one.
    pub fn skipped_duplicates(&self) -> usize {
        self.duplicates
    }
}

impl fmt::Debug for Explosion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Explosion")
            .field("origin", &self.origin)
            .field("remaining", &self.blocks.len())
            .field("pairing_errors", &self.pairing_errors.len())
            .finish()
    }
}

/// Locations taken during construction.
struct Claims {
    epsilon: f64,
    /// Every accepted cell and linked companion half.
    consumed: Vec<Location>,
    /// Linked companion halves only.
    companions: Vec<Location>,
}

impl Claims {
    fn with_capacity(capacity: usize, epsilon: f64) -> Self {
        Self {
            epsilon,
            consumed: Vec::with_capacity(capacity),
            companions: Vec::new(),
        }
    }

    fn is_duplicate(&self, at: &Location) -> bool {
        self.consumed
            .iter()
            .any(|c| c.coincides_with(at, self.epsilon))
            || self.companions.iter().any(|c| c.same_block(at))
    }

    /// Whether `at` is already covered by an entry or a companion.
    fn holds_block(&self, at: &Location) -> bool {
        self.consumed
            .iter()
            .any(|c| c.coincides_with(at, self.epsilon) || c.same_block(at))
    }
}

/// Spawn request for an ordnance cell.
fn rearm(
    origin: &Location,
    cell: &AffectedCell,
    rng: &mut RecoverRng,
    config: &RecoverConfig,
) -> PrimedOrdnance {
    let center = cell.location.center();
    let velocity = origin
        .center()
        .vector_to(&center)
        .normalize()
        .scale(config.launch_speed);
    let fuse_ticks = if config.fuse_ticks_min < config.fuse_ticks_max {
        rng.range_u32(config.fuse_ticks_min, config.fuse_ticks_max)
    } else {
        config.fuse_ticks_min
    };
    PrimedOrdnance {
        location: center,
        material: cell.material.clone(),
        fuse_ticks,
        velocity,
    }
}

/// The half of the double chest at `at` that is not `at`, if `at` is part
/// of a double chest.
fn companion_half<W: BlockWorld + ?Sized>(
    at: &Location,
    world: &W,
    epsilon: f64,
) -> Result<Option<BlockSnapshot>, StructuralPairingError> {
    let Some(halves) = world.double_chest_halves(at) else {
        return Ok(None);
    };
    let left = halves.left.ok_or(StructuralPairingError::MissingHalf {
        at: *at,
        side: ChestSide::Left,
    })?;
    let right = halves.right.ok_or(StructuralPairingError::MissingHalf {
        at: *at,
        side: ChestSide::Right,
    })?;
    if at.coincides_with(&left.location, epsilon) {
        Ok(Some(right))
    } else if at.coincides_with(&right.location, epsilon) {
        Ok(Some(left))
    } else {
        Err(StructuralPairingError::CellNotInPair { at: *at })
    }
}
