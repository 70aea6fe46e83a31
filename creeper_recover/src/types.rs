// Core types shared across the engine.
//
// Defines world positions (`Location`, `WorldId`), the small vector type used
// for ordnance launch velocities (`Vec3`), and the block-level value types
// captured by a snapshot: `Material`, `BlockData`, `ItemStack`, `DyeColor`.
//
// Positions are `f64` because the detector hands us world locations, not grid
// indices. Block identity is still the integer cell containing the location
// (`Location::block_coords()`); `MemoryWorld` keys on that.
//
// See also: `cell.rs` for the raw detector input built from these types,
// `payload.rs` for the per-block extension payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// Identifier of a loaded world (dimension).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub u32);

/// A point in a world. Block cells span `[n, n + 1)` on each axis.
///
/// Axes follow the usual block-game convention: Y is up.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: WorldId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub const fn new(world: WorldId, x: f64, y: f64, z: f64) -> Self {
        Self { world, x, y, z }
    }

    /// Integer coordinates of the block cell containing this point.
    pub fn block_coords(&self) -> [i32; 3] {
        [
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        ]
    }

    /// Center of the containing block cell.
    pub fn center(&self) -> Self {
        Self {
            world: self.world,
            x: self.x.floor() + 0.5,
            y: self.y.floor() + 0.5,
            z: self.z.floor() + 0.5,
        }
    }

    /// Euclidean distance. The world is not compared; callers that care
    /// use `coincides_with` or filter by world first.
    pub fn distance(&self, other: &Location) -> f64 {
        self.vector_to(other).length()
    }

    /// True when both points are in the same world and closer than `epsilon`.
    pub fn coincides_with(&self, other: &Location, epsilon: f64) -> bool {
        self.world == other.world && self.distance(other) < epsilon
    }

    /// True when both points fall in the same block cell of the same world.
    pub fn same_block(&self, other: &Location) -> bool {
        self.world == other.world && self.block_coords() == other.block_coords()
    }

    /// Vector pointing from `self` to `other`.
    pub fn vector_to(&self, other: &Location) -> Vec3 {
        Vec3::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "world {} ({:.2}, {:.2}, {:.2})",
            self.world.0, self.x, self.y, self.z
        )
    }
}

/// Plain 3-component vector, used for entity velocities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(self) -> Self {
        let length = self.length();
        if length == 0.0 {
            Self::ZERO
        } else {
            self.scale(1.0 / length)
        }
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

// ---------------------------------------------------------------------------
// Block values
// ---------------------------------------------------------------------------

/// Namespaced material key, e.g. `minecraft:chest`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Material(pub String);

impl Material {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn air() -> Self {
        Self::new("minecraft:air")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialized orientation/state of a block, e.g.
/// `minecraft:chest[facing=north,type=left]`. Opaque to the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockData(pub String);

impl BlockData {
    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }
}

/// A stack of items in one container slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: Material,
    pub amount: u32,
}

impl ItemStack {
    pub fn new(material: Material, amount: u32) -> Self {
        Self { material, amount }
    }
}

/// Dye color applied to sign text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DyeColor {
    White,
    Orange,
    Magenta,
    LightBlue,
    Yellow,
    Lime,
    Pink,
    Gray,
    LightGray,
    Cyan,
    Purple,
    Blue,
    Brown,
    Green,
    Red,
    #[default]
    Black,
}
