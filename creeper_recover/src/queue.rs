// Tick-driven driver for active explosions.
//
// `RecoveryQueue` is the body of the host's repeating recovery timer. The
// host owns the timer; once per timer tick it calls `tick(now, ...)` and the
// queue does the rest:
//
//   1. Every explosion whose delay has elapsed (`pushed_at +
//      recover_delay_ticks <= now`) restores up to `blocks_per_tick` blocks.
//   2. Explosions that are now finished are removed, passed to
//      `Explosion::on_finished`, and listed in the returned `TickReport`.
//
// Explosions are kept in push order, so within a tick older blasts restore
// first. `recover_everything` ignores delays and drains all of them, for a
// host that is shutting down and must not leave holes in the world.
//
// Each explosion is driven only from here, which is the single-writer
// contract `Explosion` relies on.
//
// See also: `explosion.rs` for the per-explosion drain API, `config.rs` for
// `recover_delay_ticks` and `blocks_per_tick`.

use crate::config::RecoverConfig;
use crate::explosion::Explosion;
use crate::stats::StatsSink;
use crate::world::BlockWorld;
use log::info;
use serde::{Deserialize, Serialize};

/// Handle for an explosion registered with a `RecoveryQueue`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExplosionId(pub u64);

#[derive(Debug)]
struct Pending {
    id: ExplosionId,
    ready_at: u64,
    explosion: Explosion,
}

/// What one `tick` did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub blocks_restored: usize,
    pub explosions_finished: Vec<ExplosionId>,
}

#[derive(Debug)]
pub struct RecoveryQueue {
    config: RecoverConfig,
    pending: Vec<Pending>,
    next_id: u64,
}

impl RecoveryQueue {
    pub fn new(config: RecoverConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Register an explosion observed at `now_tick`.
    pub fn push(&mut self, explosion: Explosion, now_tick: u64) -> ExplosionId {
        let id = ExplosionId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            ready_at: now_tick.saturating_add(self.config.recover_delay_ticks),
            explosion,
        });
        id
    }

    /// Advance recovery for every explosion that is due at `now_tick`.
    pub fn tick<W, S>(&mut self, now_tick: u64, world: &mut W, stats: &S) -> TickReport
    where
        W: BlockWorld + ?Sized,
        S: StatsSink + ?Sized,
    {
        // Zero would stall every explosion forever.
        let per_tick = self.config.blocks_per_tick.max(1);
        let mut report = TickReport::default();
        let mut still_pending = Vec::with_capacity(self.pending.len());

        for mut entry in std::mem::take(&mut self.pending) {
            if entry.ready_at > now_tick {
                still_pending.push(entry);
                continue;
            }
            report.blocks_restored += entry.explosion.recover_up_to(per_tick, world);
            if entry.explosion.is_finished() {
                info!(
                    "explosion {} at {} fully recovered",
                    entry.id.0,
                    entry.explosion.origin()
                );
                report.explosions_finished.push(entry.id);
                entry.explosion.on_finished(stats);
            } else {
                still_pending.push(entry);
            }
        }

        self.pending = still_pending;
        if report.blocks_restored > 0 {
            stats.blocks_recovered(report.blocks_restored as u64);
        }
        report
    }

    /// Restore every block of every explosion now, regardless of delay.
    /// Returns the number of entries restored.
    pub fn recover_everything<W, S>(&mut self, world: &mut W, stats: &S) -> usize
    where
        W: BlockWorld + ?Sized,
        S: StatsSink + ?Sized,
    {
        let mut restored = 0;
        for mut entry in std::mem::take(&mut self.pending) {
            restored += entry.explosion.recover_all(world);
            entry.explosion.on_finished(stats);
        }
        if restored > 0 {
            stats.blocks_recovered(restored as u64);
        }
        restored
    }

    pub fn get(&self, id: ExplosionId) -> Option<&Explosion> {
        self.pending
            .iter()
            .find(|p| p.id == id)
            .map(|p| &p.explosion)
    }

    /// Number of explosions still being recovered.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Entries still waiting across all explosions.
    pub fn pending_blocks(&self) -> usize {
        self.pending.iter().map(|p| p.explosion.remaining()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::AffectedCell;
    use crate::stats::RecoveryStats;
    use prometheus::Registry;
    use crate::types::{BlockData, Location, Material, WorldId};
    use crate::world::MemoryWorld;
    use creeper_recover_prng::RecoverRng;

    fn explosion(n: usize, world: &mut MemoryWorld) -> Explosion {
        let origin = Location::new(WorldId(0), 0.0, 0.0, 0.0);
        let cells = (0..n)
            .map(|i| {
                AffectedCell::block(
                    Location::new(WorldId(0), 0.0, i as f64 + 1.0, 0.0),
                    Material::new("minecraft:dirt"),
                    BlockData::default(),
                )
            })
            .collect();
        let mut rng = RecoverRng::new(0);
        Explosion::new(origin, cells, world, &mut rng, &RecoverConfig::default())
    }

    fn config(delay: u64, per_tick: usize) -> RecoverConfig {
        RecoverConfig {
            recover_delay_ticks: delay,
            blocks_per_tick: per_tick,
            ..RecoverConfig::default()
        }
    }

    #[test]
    fn waits_for_delay() {
        let mut world = MemoryWorld::new();
        let stats = RecoveryStats::new(&Registry::new()).unwrap();
        let mut queue = RecoveryQueue::new(config(20, 1));
        let blast = explosion(3, &mut world);
        queue.push(blast, 100);

        assert_eq!(queue.tick(119, &mut world, &stats).blocks_restored, 0);
        assert_eq!(queue.tick(120, &mut world, &stats).blocks_restored, 1);
        assert_eq!(queue.pending_blocks(), 2);
    }

    #[test]
    fn paces_and_finishes_once() {
        let mut world = MemoryWorld::new();
        let stats = RecoveryStats::new(&Registry::new()).unwrap();
        let mut queue = RecoveryQueue::new(config(0, 2));
        let blast = explosion(5, &mut world);
        let id = queue.push(blast, 0);

        let reports: Vec<TickReport> = (0..4).map(|t| queue.tick(t, &mut world, &stats)).collect();
        let restored: Vec<usize> = reports.iter().map(|r| r.blocks_restored).collect();
        assert_eq!(restored, vec![2, 2, 1, 0]);
        assert_eq!(reports[2].explosions_finished, vec![id]);
        assert!(reports[3].explosions_finished.is_empty());
        assert!(queue.is_empty());
        assert!(queue.get(id).is_none());
        assert_eq!(stats.explosions(), 1);
        assert_eq!(stats.blocks(), 5);
    }

    #[test]
    fn older_explosions_keep_their_place() {
        let mut world = MemoryWorld::new();
        let stats = RecoveryStats::new(&Registry::new()).unwrap();
        let mut queue = RecoveryQueue::new(config(10, 1));
        let first = explosion(2, &mut world);
        let second = explosion(2, &mut world);
        let a = queue.push(first, 0);
        let b = queue.push(second, 5);
        assert_ne!(a, b);

        // Only the first is due at tick 10.
        let report = queue.tick(10, &mut world, &stats);
        assert_eq!(report.blocks_restored, 1);
        assert_eq!(queue.get(a).unwrap().remaining(), 1);
        assert_eq!(queue.get(b).unwrap().remaining(), 2);

        let report = queue.tick(15, &mut world, &stats);
        assert_eq!(report.blocks_restored, 2);
        assert_eq!(report.explosions_finished, vec![a]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn recover_everything_ignores_delay() {
        let mut world = MemoryWorld::new();
        let stats = RecoveryStats::new(&Registry::new()).unwrap();
        let mut queue = RecoveryQueue::new(config(1_000, 1));
        let first = explosion(3, &mut world);
        let second = explosion(4, &mut world);
        queue.push(first, 0);
        queue.push(second, 0);

        assert_eq!(queue.recover_everything(&mut world, &stats), 7);
        assert!(queue.is_empty());
        assert_eq!(stats.explosions(), 2);
        assert_eq!(world.placements, 7);
    }

    #[test]
    fn empty_explosion_finishes_on_first_due_tick() {
        let mut world = MemoryWorld::new();
        let stats = RecoveryStats::new(&Registry::new()).unwrap();
        let mut queue = RecoveryQueue::new(config(0, 1));
        let blast = explosion(0, &mut world);
        let id = queue.push(blast, 3);
        let report = queue.tick(3, &mut world, &stats);
        assert_eq!(report.explosions_finished, vec![id]);
        assert_eq!(stats.explosions(), 1);
    }
}
