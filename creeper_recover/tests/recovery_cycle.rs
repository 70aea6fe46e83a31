// End-to-end recovery of a small crater.
//
// Builds a stone box in a `MemoryWorld` with a double chest, a sign and two
// buried TNT blocks, captures every cell the way a detector would, removes
// them, and lets a `RecoveryQueue` put the world back tick by tick. The
// restored world must match the original except where TNT stood, and each
// TNT must come back as exactly one primed entity.

use creeper_recover::cell::{AffectedCell, TileState};
use creeper_recover::payload::SignLines;
use creeper_recover::prng::RecoverRng;
use creeper_recover::types::{BlockData, DyeColor, ItemStack, Location, Material, WorldId};
use creeper_recover::world::PlacedBlock;
use prometheus::Registry;
use creeper_recover::{
    BlockWorld, Explosion, MemoryWorld, RecoverConfig, RecoveryQueue, RecoveryStats,
};

const WORLD: WorldId = WorldId(0);

fn at(x: i32, y: i32, z: i32) -> Location {
    Location::new(WORLD, f64::from(x), f64::from(y), f64::from(z))
}

struct Crater {
    world: MemoryWorld,
    cells: Vec<AffectedCell>,
    tnt: Vec<Location>,
    chest_left: Location,
    chest_right: Location,
    sign: Location,
}

/// Helper: a 5x3x5 stone box with a few special blocks, plus the matching
/// detector cells in scan order.
fn crater() -> Crater {
    let mut world = MemoryWorld::new();
    let stone = Material::new("minecraft:stone");
    let chest = Material::new("minecraft:chest");
    let chest_left = at(1, 1, 2);
    let chest_right = at(2, 1, 2);
    let sign = at(3, 2, 3);
    let tnt = vec![at(0, 0, 0), at(4, 1, 4)];

    let mut chest_slots: Vec<Option<ItemStack>> = vec![None; 54];
    chest_slots[3] = Some(ItemStack::new(Material::new("minecraft:diamond"), 4));
    chest_slots[40] = Some(ItemStack::new(Material::new("minecraft:gunpowder"), 12));

    let mut cells = Vec::new();
    for x in 0..5 {
        for y in 0..3 {
            for z in 0..5 {
                let loc = at(x, y, z);
                let cell = if loc == chest_left || loc == chest_right {
                    let half = if loc == chest_left { "left" } else { "right" };
                    AffectedCell::block(
                        loc,
                        chest.clone(),
                        BlockData::new(format!("minecraft:chest[facing=north,type={half}]")),
                    )
                    .with_state(TileState::Container {
                        slots: chest_slots.clone(),
                        chest: true,
                    })
                } else if loc == sign {
                    AffectedCell::block(
                        loc,
                        Material::new("minecraft:oak_sign"),
                        BlockData::new("minecraft:oak_sign[rotation=8]"),
                    )
                    .with_state(TileState::Sign {
                        lines: vec!["Beware".into(), "of".into(), "creepers".into(), String::new()],
                        color: DyeColor::Green,
                    })
                } else if tnt.contains(&loc) {
                    AffectedCell::block(loc, Material::new("minecraft:tnt"), BlockData::default())
                } else {
                    AffectedCell::block(loc, stone.clone(), BlockData::new("minecraft:stone"))
                };
                world.place_block(&loc, &cell.material, &cell.data);
                cells.push(cell);
            }
        }
    }
    world.link_double_chest(chest_left, chest_right);

    Crater {
        world,
        cells,
        tnt,
        chest_left,
        chest_right,
        sign,
    }
}

fn blast(crater: &mut Crater, cells: Vec<AffectedCell>, seed: u64) -> Explosion {
    let origin = Location::new(WORLD, 2.3, 1.4, 2.6);
    let mut rng = RecoverRng::new(seed);
    let explosion = Explosion::new(
        origin,
        cells,
        &mut crater.world,
        &mut rng,
        &RecoverConfig::default(),
    );
    for cell in &crater.cells {
        crater.world.clear(&cell.location);
    }
    explosion
}

#[test]
fn crater_is_rebuilt_by_the_queue() {
    let mut crater = crater();
    let original: Vec<(Location, Material)> = crater
        .cells
        .iter()
        .map(|c| (c.location, c.material.clone()))
        .collect();
    let cells = crater.cells.clone();
    let explosion = blast(&mut crater, cells, 11);

    // 75 cells, two TNT, two chest halves folded into one entry.
    assert_eq!(explosion.remaining(), 75 - 2 - 1);
    assert_eq!(explosion.rearmed_ordnance(), 2);
    assert!(explosion.pairing_errors().is_empty());
    assert!(crater.world.is_empty());

    let primary_chest = *explosion
        .blocks()
        .find(|b| b.companion().is_some())
        .expect("double chest entry")
        .location();
    assert!(primary_chest == crater.chest_left || primary_chest == crater.chest_right);

    let config = RecoverConfig {
        recover_delay_ticks: 40,
        blocks_per_tick: 8,
        ..RecoverConfig::default()
    };
    let stats = RecoveryStats::new(&Registry::new()).unwrap();
    let mut queue = RecoveryQueue::new(config);
    queue.push(explosion, 0);

    let mut now = 0;
    let mut finished = Vec::new();
    while !queue.is_empty() {
        let report = queue.tick(now, &mut crater.world, &stats);
        if now < 40 {
            assert_eq!(report.blocks_restored, 0);
        } else {
            assert!(report.blocks_restored <= 8);
        }
        finished.extend(report.explosions_finished);
        now += 1;
        assert!(now < 1_000, "queue never drained");
    }
    assert_eq!(finished.len(), 1);
    // 72 entries at 8 per tick starting at tick 40.
    assert_eq!(now, 40 + 9);
    assert_eq!(stats.explosions(), 1);
    assert_eq!(stats.blocks(), 72);

    for (location, material) in original {
        let restored = crater.world.material_at(&location);
        if crater.tnt.contains(&location) {
            assert_eq!(restored, Material::air(), "TNT at {location} must not come back");
        } else {
            assert_eq!(restored, material, "wrong block at {location}");
        }
    }

    let chest: &PlacedBlock = crater.world.get(&primary_chest).unwrap();
    assert_eq!(chest.slots.len(), 2);
    assert_eq!(chest.slots[&40].material, Material::new("minecraft:gunpowder"));

    let sign = crater.world.get(&crater.sign).unwrap();
    assert_eq!(sign.sign_color, Some(DyeColor::Green));
    assert_eq!(
        sign.sign_lines,
        Some(SignLines(vec![
            "Beware".into(),
            "of".into(),
            "creepers".into(),
            String::new()
        ]))
    );

    let spawned = crater.world.spawned_ordnance();
    assert_eq!(spawned.len(), 2);
    for primed in spawned {
        assert!((10..30).contains(&primed.fuse_ticks));
        assert!((primed.velocity.length() - 0.7).abs() < 1e-9);
    }
}

#[test]
fn overlapping_detection_passes_do_not_duplicate() {
    let mut single = crater();
    let cells = single.cells.clone();
    let once = blast(&mut single, cells, 3);

    let mut doubled = crater();
    let mut cells = doubled.cells.clone();
    cells.extend(doubled.cells.clone());
    let twice = blast(&mut doubled, cells, 3);

    assert_eq!(twice.remaining(), once.remaining());
    assert_eq!(twice.rearmed_ordnance(), 2);
    // The farther chest half consumes the nearer one in both runs.
    assert_eq!(once.skipped_duplicates(), 1);
    assert_eq!(twice.skipped_duplicates(), 75 + 1);
    let order_once: Vec<Location> = once.blocks().map(|b| *b.location()).collect();
    let order_twice: Vec<Location> = twice.blocks().map(|b| *b.location()).collect();
    assert_eq!(order_once, order_twice);
}
