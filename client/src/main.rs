use clap::{Parser, ValueEnum};
use client::init::{self, LaunchOptions};
use shared::{get_game_config, get_game_folder_paths, visibility::FogRenderMode, TICKS_PER_SECOND};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum FogMode {
    PerTile,
    Scaled,
}

impl From<FogMode> for FogRenderMode {
    fn from(mode: FogMode) -> Self {
        match mode {
            FogMode::PerTile => FogRenderMode::PerTile,
            FogMode::Scaled => FogRenderMode::Scaled,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "default")]
    world: String,

    #[arg(short, long)]
    game_folder_path: Option<String>,

    #[arg(short, long, help = "Exit after this many frames, saving first")]
    frames: Option<u64>,

    #[arg(short, long, default_value_t = TICKS_PER_SECOND)]
    ticks_per_second: u64,

    #[arg(long, value_enum, help = "Overrides the fog render mode from config.ron")]
    fog_mode: Option<FogMode>,

    #[arg(long, help = "Settle all water once before the first frame")]
    settle: bool,
}

fn main() {
    let args = Args::parse();

    if args.ticks_per_second == 0 || args.ticks_per_second > 240 {
        eprintln!("Error: ticks_per_second must be between 1 and 240 (inclusive).");
        eprintln!("Got: {}", args.ticks_per_second);
        std::process::exit(1);
    }

    let game_folder_paths = get_game_folder_paths(args.game_folder_path);

    println!(
        "Starting application with game folder: {}",
        game_folder_paths.game_folder_path.display()
    );

    let mut config = get_game_config(&game_folder_paths);
    if let Some(mode) = args.fog_mode {
        config.visibility.render_mode = mode.into();
    }

    init::init(
        config,
        LaunchOptions {
            world_name: args.world,
            frames: args.frames,
            ticks_per_second: args.ticks_per_second,
            settle_on_load: args.settle,
        },
        game_folder_paths,
    );
}
