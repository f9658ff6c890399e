//! Voicepool headless driver.
//!
//! Runs an ECS world with one audio player for a fixed amount of simulated
//! time, feeding it playback requests from the command line. Voice commands go
//! to the backend thread, which logs them; run with `RUST_LOG=debug` to see
//! every create/start/stop/destroy.
//!
//! # Running
//!
//! ```sh
//! cargo run -- --config audio.ini --seconds 3 \
//!     --play loop1:theme:0.6 --play once:explosion \
//!     --at 1.5=volume:theme:0.3 --at 2.5=stopall:theme --stats
//! ```

use bevy_ecs::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use voicepool::components::audioplayer::AudioPlayer;
use voicepool::events::audio::AudioRequest;
use voicepool::resources::activescope::ActiveScope;
use voicepool::resources::audio::{setup_audio, shutdown_audio};
use voicepool::resources::audioconfig::AudioConfig;
use voicepool::resources::clipstore::ClipStore;
use voicepool::resources::worldtime::WorldTime;
use voicepool::systems::audio_schedule;
use voicepool::systems::audioplayer::{despawn_audio_player, spawn_configured_audio_player};
use voicepool::systems::time::update_world_time;

/// A request issued once simulated time reaches `at` seconds.
#[derive(Debug, Clone)]
struct TimedRequest {
    at: f32,
    request: AudioRequest,
}

impl FromStr for TimedRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (at, request) = s
            .split_once('=')
            .ok_or_else(|| format!("expected SECONDS=REQUEST, got '{}'", s))?;
        let at = at
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid time in '{}': {}", s, e))?;
        Ok(TimedRequest {
            at,
            request: request.parse()?,
        })
    }
}

/// Voicepool headless driver
#[derive(Parser)]
#[command(version, about = "Drive a pooled audio player for a while and report what happened.")]
struct Cli {
    /// Audio configuration file (INI).
    #[arg(long, value_name = "PATH", default_value = "./audio.ini")]
    config: PathBuf,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 5.0)]
    seconds: f32,

    /// Frame delta in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Request sent on the first frame, e.g. `once:explosion:0.8`.
    #[arg(long = "play", value_name = "ACTION:CLIP[:VOLUME]")]
    play: Vec<AudioRequest>,

    /// Request sent once simulated time reaches SECONDS, e.g. `2.5=stop:theme`.
    #[arg(long = "at", value_name = "SECONDS=REQUEST")]
    at: Vec<TimedRequest>,

    /// Print player and backend statistics as JSON on exit.
    #[arg(long)]
    stats: bool,

    /// Write the effective configuration to --config and exit.
    #[arg(long)]
    save_config: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = AudioConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::warn!("{}; using defaults", e);
    }

    // Early-exit: write config and quit (no world needed)
    if cli.save_config {
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        println!("Audio config written to {}", cli.config.display());
        return;
    }

    if !(cli.dt > 0.0) {
        eprintln!("Error: --dt must be positive");
        std::process::exit(2);
    }

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(1.0));
    world.insert_resource(ActiveScope::default());
    world.insert_resource(ClipStore::new());
    world.insert_resource(config);

    setup_audio(&mut world); // sets up AudioBridge and the audio message queues

    let Some(player) = spawn_configured_audio_player(&mut world) else {
        log::error!("Failed to register the audio player");
        shutdown_audio(&mut world);
        std::process::exit(1);
    };

    {
        let mut requests = world.resource_mut::<Messages<AudioRequest>>();
        for request in cli.play {
            requests.write(request);
        }
    }

    let mut timed = cli.at;
    timed.sort_by(|a, b| b.at.total_cmp(&a.at)); // latest first, popped from the back

    let mut update = audio_schedule();
    update
        .initialize(&mut world)
        .expect("Failed to initialize schedule");

    // --------------- Main loop ---------------
    let frames = (cli.seconds / cli.dt).ceil().max(0.0) as u64;
    log::info!("Running {} frames of {:.4}s", frames, cli.dt);
    for _ in 0..frames {
        update_world_time(&mut world, cli.dt);

        let now = world.resource::<WorldTime>().elapsed;
        while timed.last().is_some_and(|t| t.at <= now) {
            if let Some(t) = timed.pop() {
                log::info!("t={:.3}s request {:?}", now, t.request);
                world.resource_mut::<Messages<AudioRequest>>().write(t.request);
            }
        }

        update.run(&mut world);
        world.clear_trackers();
    }

    let clock = *world.resource::<WorldTime>();
    log::info!(
        "Simulated {:.3}s over {} frames",
        clock.elapsed,
        clock.frame_count
    );

    let player_stats = world.get::<AudioPlayer>(player).map(|p| p.stats());

    despawn_audio_player(&mut world, player);
    update.run(&mut world); // forward the teardown commands
    let backend = shutdown_audio(&mut world);

    if cli.stats {
        let report = serde_json::json!({
            "player": player_stats,
            "backend": backend,
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => log::error!("Failed to serialize stats: {}", e),
        }
    }
}
