// Detector input and world query results.
//
// `AffectedCell` is what the explosion detector hands over for each block the
// blast removed, captured before the world was mutated. Tile entities (chests,
// barrels, signs) carry their state in `TileState`.
//
// `BlockSnapshot` and `DoubleChestHalves` are answers from the live world to
// the pairing query `BlockWorld::double_chest_halves`. `PrimedOrdnance` is the
// spawn request the engine sends back for re-armed TNT.
//
// See also: `explosion.rs` which consumes all of these during construction,
// `world.rs` for the `BlockWorld` trait that produces/consumes them.

use crate::types::{BlockData, DyeColor, ItemStack, Location, Material, Vec3};
use serde::{Deserialize, Serialize};

/// One block removed by an explosion, as observed at event time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffectedCell {
    pub location: Location,
    pub material: Material,
    pub data: BlockData,
    /// Tile-entity state, if the block had one.
    pub state: Option<TileState>,
}

impl AffectedCell {
    /// A plain block with no tile entity.
    pub fn block(location: Location, material: Material, data: BlockData) -> Self {
        Self {
            location,
            material,
            data,
            state: None,
        }
    }

    pub fn with_state(mut self, state: TileState) -> Self {
        self.state = Some(state);
        self
    }
}

/// Tile-entity state captured with an `AffectedCell`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TileState {
    /// Any block with storage slots. `slots` is the full storage array as
    /// the world reported it; empty slots are `None`.
    Container {
        slots: Vec<Option<ItemStack>>,
        /// True for chest-like blocks that can join into a double chest.
        /// Only these trigger the pairing query.
        chest: bool,
    },
    Sign {
        lines: Vec<String>,
        color: DyeColor,
    },
}

/// Material and data of one live block, as reported by a structural query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub location: Location,
    pub material: Material,
    pub data: BlockData,
}

/// Both halves of a double chest. A half is `None` when the world promised a
/// pair but could not resolve that side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoubleChestHalves {
    pub left: Option<BlockSnapshot>,
    pub right: Option<BlockSnapshot>,
}

/// A live, fused ordnance entity to spawn in place of a destroyed TNT block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimedOrdnance {
    /// Block center the entity spawns at.
    pub location: Location,
    pub material: Material,
    pub fuse_ticks: u32,
    pub velocity: Vec3,
}
