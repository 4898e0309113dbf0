use anyhow::{Result, bail};
use clap::Parser;
use party_core::{FrameInput, Level, LevelDescription, SimulationConfig, World};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 20_000)]
    frames: u64,
    /// Reshuffle the guests every this many frames (0 disables)
    #[arg(long, default_value_t = 1_500)]
    reinit_every: u64,
}

const FRAME_DT: f32 = 1.0 / 30.0;

fn garden() -> LevelDescription {
    LevelDescription {
        tiles: [
            "............", //
            "..ct....tc..",
            "..ct....tc..",
            "............",
            ".....b......",
            "...c....cc..",
            "..ctc...tt..",
            "............",
        ]
        .iter()
        .map(|row| (*row).to_string())
        .collect(),
        pass_score: 1_000,
        fail_score: 1_000,
        goose_count: 2,
    }
}

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    slice[rng.next_u64() as usize % slice.len()]
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting fuzz harness on seed {} for {} frames...", args.seed, args.frames);
    let mut level = Level::new(&garden(), SimulationConfig::default(), args.seed)?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let axis = [-1.0, -0.5, 0.0, 0.0, 0.5, 1.0];

    for frame in 0..args.frames {
        if args.reinit_every > 0 && frame > 0 && frame % args.reinit_every == 0 {
            level.reinit_guests();
        }
        let input = FrameInput {
            move_x: choose(&mut rng, &axis),
            move_z: choose(&mut rng, &axis),
            interact: rng.next_u32() % 8 == 0,
        };
        level.step(FRAME_DT, input);
        level.drain_cues();

        if let Err(violation) = level.world().check_links() {
            bail!("frame {frame}: {violation}");
        }
        let grid = &level.world().grid;
        for goose in level.world().geese.values() {
            let tile = World::tile_of(goose.position);
            if grid.is_wall(tile) {
                bail!("frame {frame}: goose inside wall at {tile:?}");
            }
        }
        let player = level.world().player();
        if grid.is_wall(World::tile_of(player.position)) {
            bail!("frame {frame}: player inside wall at {:?}", player.position);
        }
    }

    println!(
        "Fuzzing completed: state {:?}, score {}, negative {}, hash {}",
        level.state(),
        level.score(),
        level.negative_score(),
        level.snapshot_hash()
    );
    Ok(())
}
