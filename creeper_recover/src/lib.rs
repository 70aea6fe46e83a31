// creeper_recover: explosion snapshot and incremental restoration engine.
//
// When an explosion removes a cluster of blocks, the host hands the origin
// and the list of destroyed cells to `Explosion::new`. The engine records
// what each cell was (material, block data, container contents, sign text
// and color), re-arms any buried TNT as a launched primed entity instead of
// recording it, and then puts the recorded blocks back a few at a time,
// farthest from the origin first.
//
// Module overview:
// - `types.rs`:          Location, WorldId, Vec3, Material, BlockData, ItemStack, DyeColor.
// - `cell.rs`:           AffectedCell (detector input), tile state, pairing query results, PrimedOrdnance.
// - `payload.rs`:        ContainerItems, SignLines and the closed PayloadSet.
// - `world.rs`:          BlockWorld trait (the live world) + MemoryWorld reference implementation.
// - `exploded_block.rs`: ExplodedBlock: one captured cell, optional double-chest companion, restore().
// - `explosion.rs`:      Explosion: construction (ordering, dedup, re-arming, pairing) and the drain API.
// - `queue.rs`:          RecoveryQueue: per-tick driver with delay and pacing.
// - `stats.rs`:          StatsSink trait + prometheus-backed RecoveryStats.
// - `config.rs`:         RecoverConfig: all tunables, loaded from JSON.
// - `prng`:              Re-exported from `creeper_recover_prng`.
//
// The engine never touches a real game server. Everything it writes goes
// through `BlockWorld`, and detection, timers, and persistence belong to
// the host.
//
// **Critical constraint: determinism.** Given the same cells, config, and
// PRNG seed, construction produces the same restore order and the same fuse
// draws.

pub mod cell;
pub mod config;
pub mod exploded_block;
pub mod explosion;
pub mod payload;
pub use creeper_recover_prng as prng;
pub mod queue;
pub mod stats;
pub mod types;
pub mod world;

pub use cell::{AffectedCell, PrimedOrdnance, TileState};
pub use config::{ConfigError, RecoverConfig};
pub use exploded_block::ExplodedBlock;
pub use explosion::{Explosion, StructuralPairingError};
pub use queue::{ExplosionId, RecoveryQueue, TickReport};
pub use stats::{RecoveryStats, StatsSink};
pub use world::{BlockWorld, MemoryWorld};
