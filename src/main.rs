use std::convert::TryFrom;
use std::path::PathBuf;

use anyhow::{ Context, Result };
use clap::Parser;
use log::info;

use whitted::consts::OUT_FILE;
use whitted::context::RenderContext;
use whitted::render::{ render, render_parallel };
use whitted::scene;

/// Renders spheres and planes with a recursive ray tracer.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// JSON scene description; the built-in demo scene if omitted
    #[clap(short, long)]
    scene: Option<PathBuf>,

    /// Where to write the PPM image
    #[clap(short, long, default_value = OUT_FILE)]
    output: PathBuf,

    /// Image width in pixels
    #[clap(long)]
    width: Option<usize>,

    /// Image height in pixels
    #[clap(long)]
    height: Option<usize>,

    /// Maximum ray depth, counting the primary ray
    #[clap(long)]
    max_depth: Option<usize>,

    /// Worker threads (0 = one per core)
    #[clap(short = 'j', long)]
    threads: Option<usize>,

    /// Render on a single thread
    #[clap(long)]
    single_threaded: bool,

    /// Let emissive spheres light the scene
    #[clap(long)]
    emissive_lights: bool,

    /// Log progress
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default()
        .default_filter_or(level)).init();

    let mut description = match &args.scene {
        Some(path) => scene::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => scene::demo(),
    };

    if let Some(width) = args.width {
        description.camera.width = width;
    }
    if let Some(height) = args.height {
        description.camera.height = height;
    }
    if let Some(max_depth) = args.max_depth {
        description.settings.max_depth = max_depth;
    }
    if let Some(threads) = args.threads {
        description.settings.threads = threads;
    }
    if args.emissive_lights {
        description.settings.emissive_lights = true;
    }

    let ctx = RenderContext::try_from(description)
        .context("building scene")?;

    info!("rendering {}x{} image, max depth {}",
        ctx.camera.hsize, ctx.camera.vsize, ctx.config.max_depth);

    let frame = if args.single_threaded {
        render(&ctx)?
    } else {
        render_parallel(&ctx, None)?
    };

    frame.save_ppm(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("saved render to {}", args.output.display());

    Ok(())
}
