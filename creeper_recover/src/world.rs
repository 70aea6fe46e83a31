// The world surface the engine writes into, and an in-memory implementation.
//
// `BlockWorld` is everything the engine needs from the live game world:
// place a block, refill container slots, rewrite sign text and color, spawn a
// primed ordnance entity, and ask whether a chest is one half of a double
// chest. Calls are assumed infallible at this layer. A write to a position
// that was changed since the explosion simply overwrites it.
//
// `MemoryWorld` is a sparse `BTreeMap` keyed by integer block coordinates.
// Unlike a dense voxel grid it has no bounds: explosions can happen anywhere.
// It records every spawned ordnance so callers can inspect what the engine
// re-armed. Double-chest pairs are registered explicitly with
// `link_double_chest`; the query answers from that registry plus whatever
// is currently placed at the two halves.
//
// See also: `exploded_block.rs` (writes via `place_block`, `fill_container`,
// sign writers), `explosion.rs` (spawns ordnance, queries pairing).
//
// **Critical constraint: determinism.** `MemoryWorld` iterates in key order.
// No `HashMap`.

use crate::cell::{BlockSnapshot, DoubleChestHalves, PrimedOrdnance};
use crate::payload::{ContainerItems, SignLines};
use crate::types::{BlockData, DyeColor, ItemStack, Location, Material, WorldId};
use std::collections::{BTreeMap, BTreeSet};

/// World mutation and query primitives used by the recovery engine.
pub trait BlockWorld {
    /// Set the material and orientation/state at a position.
    fn place_block(&mut self, at: &Location, material: &Material, data: &BlockData);

    /// Write each occupied slot into the container at `at`, at the same index.
    fn fill_container(&mut self, at: &Location, items: &ContainerItems);

    fn write_sign_lines(&mut self, at: &Location, lines: &SignLines);

    fn write_sign_color(&mut self, at: &Location, color: DyeColor);

    fn spawn_primed_ordnance(&mut self, ordnance: PrimedOrdnance);

    /// Structural pairing of the chest at `at`. `None` for a single chest.
    fn double_chest_halves(&self, at: &Location) -> Option<DoubleChestHalves>;
}

/// Block-cell key: world plus integer coordinates.
pub type BlockKey = (WorldId, [i32; 3]);

fn key_of(at: &Location) -> BlockKey {
    (at.world, at.block_coords())
}

/// What `MemoryWorld` stores for one occupied cell.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedBlock {
    pub material: Material,
    pub data: BlockData,
    pub slots: BTreeMap<usize, ItemStack>,
    pub sign_lines: Option<SignLines>,
    pub sign_color: Option<DyeColor>,
}

impl PlacedBlock {
    fn new(material: Material, data: BlockData) -> Self {
        Self {
            material,
            data,
            slots: BTreeMap::new(),
            sign_lines: None,
            sign_color: None,
        }
    }
}

/// Sparse in-memory `BlockWorld`.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorld {
    blocks: BTreeMap<BlockKey, PlacedBlock>,
    /// Each half of a registered double chest maps to (left, right) locations.
    chest_pairs: BTreeMap<BlockKey, (Location, Location)>,
    /// Halves the pairing query reports as unresolvable.
    broken_pairs: BTreeSet<BlockKey>,
    spawned: Vec<PrimedOrdnance>,
    /// Number of `place_block` calls, including overwrites.
    pub placements: usize,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, at: &Location) -> Option<&PlacedBlock> {
        self.blocks.get(&key_of(at))
    }

    /// Material at a position; air when nothing is placed.
    pub fn material_at(&self, at: &Location) -> Material {
        self.get(at)
            .map(|b| b.material.clone())
            .unwrap_or_else(Material::air)
    }

    /// Remove a block, as the explosion itself would.
    pub fn clear(&mut self, at: &Location) -> Option<PlacedBlock> {
        self.blocks.remove(&key_of(at))
    }

    /// Register two chests as the left and right half of one double chest.
    pub fn link_double_chest(&mut self, left: Location, right: Location) {
        self.chest_pairs.insert(key_of(&left), (left, right));
        self.chest_pairs.insert(key_of(&right), (left, right));
    }

    /// Make the pairing query report `half` as unresolvable, as a world
    /// that lost track of one side of the pair would.
    pub fn break_double_chest_half(&mut self, half: Location) {
        self.broken_pairs.insert(key_of(&half));
    }

    pub fn spawned_ordnance(&self) -> &[PrimedOrdnance] {
        &self.spawned
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn snapshot(&self, at: &Location) -> Option<BlockSnapshot> {
        if self.broken_pairs.contains(&key_of(at)) {
            return None;
        }
        self.get(at).map(|b| BlockSnapshot {
            location: *at,
            material: b.material.clone(),
            data: b.data.clone(),
        })
    }

    fn entry(&mut self, at: &Location) -> &mut PlacedBlock {
        self.blocks
            .entry(key_of(at))
            .or_insert_with(|| PlacedBlock::new(Material::air(), BlockData::default()))
    }
}

impl BlockWorld for MemoryWorld {
    fn place_block(&mut self, at: &Location, material: &Material, data: &BlockData) {
        self.placements += 1;
        self.blocks
            .insert(key_of(at), PlacedBlock::new(material.clone(), data.clone()));
    }

    fn fill_container(&mut self, at: &Location, items: &ContainerItems) {
        let block = self.entry(at);
        for (slot, stack) in items.iter() {
            block.slots.insert(slot, stack.clone());
        }
    }

    fn write_sign_lines(&mut self, at: &Location, lines: &SignLines) {
        self.entry(at).sign_lines = Some(lines.clone());
    }

    fn write_sign_color(&mut self, at: &Location, color: DyeColor) {
        self.entry(at).sign_color = Some(color);
    }

    fn spawn_primed_ordnance(&mut self, ordnance: PrimedOrdnance) {
        self.spawned.push(ordnance);
    }

    fn double_chest_halves(&self, at: &Location) -> Option<DoubleChestHalves> {
        let (left, right) = self.chest_pairs.get(&key_of(at))?;
        Some(DoubleChestHalves {
            left: self.snapshot(left),
            right: self.snapshot(right),
        })
    }
}
