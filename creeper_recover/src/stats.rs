// Recovery statistics.
//
// `StatsSink` is the collaborator `Explosion::on_finished` reports to. It is
// passed in by the caller rather than reached through a global, so tests can
// count completions with their own sink.
//
// `RecoveryStats` is the stock sink: two prometheus counters registered in
// the host's `Registry`, which the host exports however it exports the rest
// of its metrics.

use prometheus::{IntCounter, Registry, register_int_counter_with_registry};

/// Receiver of recovery bookkeeping.
pub trait StatsSink {
    /// One explosion has been fully restored.
    fn explosion_recovered(&self);

    /// `count` blocks were restored. Optional.
    fn blocks_recovered(&self, _count: u64) {}
}

#[derive(Clone)]
pub struct RecoveryStats {
    pub explosions_recovered: IntCounter,
    pub blocks_recovered: IntCounter,
}

impl RecoveryStats {
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let explosions_recovered = register_int_counter_with_registry!(
            "creeper_recover_explosions_recovered",
            "Explosions whose blocks have all been restored",
            registry
        )?;

        let blocks_recovered = register_int_counter_with_registry!(
            "creeper_recover_blocks_recovered",
            "Queue entries restored (a double chest counts once)",
            registry
        )?;

        Ok(Self {
            explosions_recovered,
            blocks_recovered,
        })
    }

    pub fn explosions(&self) -> u64 {
        self.explosions_recovered.get()
    }

    pub fn blocks(&self) -> u64 {
        self.blocks_recovered.get()
    }
}

impl StatsSink for RecoveryStats {
    fn explosion_recovered(&self) {
        self.explosions_recovered.inc();
    }

    fn blocks_recovered(&self, count: u64) {
        self.blocks_recovered.inc_by(count);
    }
}
