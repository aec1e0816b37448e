//! Pincer gripper kinematics CLI.
//!
//! Provides four modes of operation:
//! - `jaw`: solve a jaw width and print every link pose
//! - `place`: compose a placement matrix from a position and two directions
//! - `scene`: drive a headless Bevy scene and print the synced transforms
//! - `info`: print crate versions and the hand geometry

use std::path::PathBuf;
use std::process::ExitCode;

use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::{Args, Parser, Subcommand};
use nalgebra::{Isometry3, Matrix4, Vector3};
use tracing::info;

use pincer_bevy::{GripperMap, PincerPlugin, spawn_gripper};
use pincer_core::prelude::*;
use pincer_linkage::geometry::RTQ85_LINKS;
use pincer_linkage::{Hpr, LinkageModel};
use pincer_pose::{PlacementFrame, PoseComposer};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Parallel-jaw gripper kinematics.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a jaw width and print the link poses.
    Jaw {
        /// Distance between the fingertips, in [0, 85].
        width: f32,
    },

    /// Compose the placement matrix for a target frame.
    Place(PlacementArgs),

    /// Run a headless scene: apply width and placement, print transforms.
    Scene {
        /// Distance between the fingertips, in [0, 85].
        width: f32,

        #[command(flatten)]
        placement: PlacementArgs,
    },

    /// Print crate information and hand geometry.
    Info,
}

#[derive(Args, Clone)]
struct PlacementArgs {
    /// Root position as x,y,z.
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "0,0,0")]
    position: Vector3<f32>,

    /// Direction of the hand's local +Y as x,y,z.
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "0,1,0")]
    y_dir: Vector3<f32>,

    /// Direction of the hand's local +Z as x,y,z.
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "0,0,1")]
    z_dir: Vector3<f32>,

    /// Re-orthogonalise the directions instead of rejecting them.
    #[arg(long)]
    orthogonalize: bool,
}

impl PlacementArgs {
    fn frame(&self) -> PlacementFrame {
        PlacementFrame::new(self.position, self.y_dir, self.z_dir)
    }

    fn composer(&self, config: &PlacementConfig) -> Result<PoseComposer, ConfigError> {
        let mut config = config.clone();
        if self.orthogonalize {
            config.policy = FramePolicy::Orthogonalize;
        }
        PoseComposer::new(config)
    }
}

fn parse_vec3(s: &str) -> Result<Vector3<f32>, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z, got '{s}'"));
    };
    let parse = |v: &str| v.parse::<f32>().map_err(|e| format!("'{v}': {e}"));
    Ok(Vector3::new(parse(x)?, parse(y)?, parse(z)?))
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn fmt_vec(v: &Vector3<f32>) -> String {
    format!("({:8.3}, {:8.3}, {:8.3})", v.x, v.y, v.z)
}

fn fmt_hpr(h: Hpr) -> String {
    format!("({:8.3}, {:8.3}, {:8.3})", h.heading, h.pitch, h.roll)
}

fn print_matrix(m: &Matrix4<f32>) {
    for r in 0..4 {
        println!(
            "  [{:9.4} {:9.4} {:9.4} {:9.4}]",
            m[(r, 0)],
            m[(r, 1)],
            m[(r, 2)],
            m[(r, 3)]
        );
    }
}

fn print_links(model: &LinkageModel, root: &Isometry3<f32>) {
    let poses = model.placed_poses(root);
    println!("{:<20} {:<30} {:<30} world", "link", "offset", "hpr");
    for (id, link) in model.hierarchy().iter() {
        println!(
            "{:<20} {:<30} {:<30} {}",
            link.name(),
            fmt_vec(link.offset()),
            fmt_hpr(link.orientation()),
            fmt_vec(&poses[id.index()].translation.vector)
        );
    }
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_jaw(config: &PincerConfig, width: f32) -> Result<(), PincerError> {
    let mut model = LinkageModel::from_config(&config.gripper)?;
    model.set_jaw_width(width)?;
    let state = model.state();
    println!(
        "jaw_width={:.3} knuckle_angle={:.3} branch={:?}",
        state.jaw_width, state.knuckle_angle, state.branch
    );
    print_links(&model, &Isometry3::identity());
    Ok(())
}

fn run_place(config: &PincerConfig, args: &PlacementArgs) -> Result<(), PincerError> {
    let composer = args.composer(&config.placement)?;
    let m = composer.compose_frame(&args.frame())?;
    println!("placement ({:?}):", composer.config().policy);
    print_matrix(&m);
    Ok(())
}

fn run_scene(
    mut app: App,
    config: &PincerConfig,
    width: f32,
    args: &PlacementArgs,
) -> Result<(), PincerError> {
    app.add_plugins(PincerPlugin);
    app.finish();
    app.cleanup();

    let id = GripperId(0);
    let model = LinkageModel::from_config(&config.gripper)?;
    let spawned = spawn_gripper(app.world_mut(), &model, "rtq85");
    app.world_mut()
        .resource_mut::<GripperMap>()
        .insert(id, model, spawned);

    {
        let composer = args.composer(&config.placement)?;
        let mut map = app.world_mut().resource_mut::<GripperMap>();
        map.set_jaw_width(id, width)?;
        map.set_placement(id, &composer, &args.frame())?;
    }
    app.update();
    info!(gripper = %id, width, "scene synced");

    let world = app.world();
    let map = world.resource::<GripperMap>();
    if let Some(entry) = map.get(id) {
        let spawned = entry.spawned();
        let holder = world.get::<Transform>(spawned.root).copied().unwrap_or_default();
        println!(
            "holder {}: translation={} rotation={}",
            spawned.name, holder.translation, holder.rotation
        );
        for (_, link) in entry.model().hierarchy().iter() {
            let Some(entity) = spawned.link_entity(link.name()) else {
                continue;
            };
            if let Some(t) = world.get::<Transform>(entity) {
                println!(
                    "{:<20} translation={} rotation={}",
                    link.name(),
                    t.translation,
                    t.rotation
                );
            }
        }
    }
    Ok(())
}

fn run_info() {
    println!("pincer v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  pincer-core     {}", env!("CARGO_PKG_VERSION"));
    println!("  pincer-linkage  {}", env!("CARGO_PKG_VERSION"));
    println!("  pincer-pose     {}", env!("CARGO_PKG_VERSION"));
    println!("  pincer-bevy     {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("jaw width range: [{JAW_WIDTH_MIN}, {JAW_WIDTH_MAX}]");
    println!("{:<20} {:<20} {:<36} hpr", "link", "parent", "offset");
    for desc in RTQ85_LINKS {
        println!(
            "{:<20} {:<20} {:<36} {:?}",
            desc.name,
            desc.parent.unwrap_or("-"),
            fmt_vec(&Vector3::from(desc.offset)),
            desc.hpr
        );
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<PincerConfig, PincerError> {
    match path {
        Some(path) => Ok(PincerConfig::from_file(path)?),
        None => Ok(PincerConfig::default()),
    }
}

/// App with only the log subscriber installed.
fn logging_app(level: Level) -> App {
    let mut app = App::new();
    app.add_plugins(LogPlugin {
        level,
        filter: "wgpu=error,naga=warn".into(),
        ..default()
    });
    app
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    let app = logging_app(cli.log_level);

    let result = load_config(cli.config.as_ref()).and_then(|config| match cli.command {
        Some(Commands::Jaw { width }) => run_jaw(&config, width),
        Some(Commands::Place(args)) => run_place(&config, &args),
        Some(Commands::Scene { width, placement }) => run_scene(app, &config, width, &placement),
        Some(Commands::Info) => {
            run_info();
            Ok(())
        }
        None => {
            // Default: solve the configured initial width
            run_jaw(&config, config.gripper.initial_jaw_width)
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
