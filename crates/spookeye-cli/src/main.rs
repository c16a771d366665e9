use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use spookeye_core::target::eye_geometry;
use spookeye_core::{
    compute_target, ContentSize, DecorativeImage, Engine, EngineOptions, EyeLayout,
    ExpressionScores, FaceLandmarks, Point, Rect, Scene, Side, Size,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "spookeye", about = "Spookeye eye-tracking renderer tools")]
struct Cli {
    /// Eye layout TOML (defaults to the built-in spooky layout)
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render frames offline and write the canvas as PNG
    Render {
        /// Decorative image
        #[arg(short, long)]
        image: PathBuf,
        /// Canvas size, e.g. 800x600
        #[arg(short, long, value_parser = parse_size, default_value = "800x600")]
        canvas: (u32, u32),
        /// Tracked nose point in canvas pixels, e.g. 120,80
        #[arg(short, long, value_parser = parse_point)]
        nose: Option<Point>,
        /// Frames to run before writing
        #[arg(short, long, default_value_t = 60)]
        frames: u32,
        /// Draw the debug overlay
        #[arg(long)]
        debug: bool,
        /// Output PNG
        #[arg(short, long, default_value = "spookeye.png")]
        out: PathBuf,
    },
    /// Print socket geometry and pupil targets as JSON
    Targets {
        /// Canvas size, e.g. 800x600
        #[arg(short, long, value_parser = parse_size)]
        canvas: (u32, u32),
        /// Decorative image size, e.g. 400x300
        #[arg(short, long, value_parser = parse_size)]
        image: (u32, u32),
        /// Tracked nose point in canvas pixels
        #[arg(short, long, value_parser = parse_point)]
        nose: Option<Point>,
    },
    /// Show the eye layout in use
    Layout,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let layout = match &cli.layout {
        Some(path) => EyeLayout::load(path)?,
        None => EyeLayout::default(),
    };

    match cli.command {
        Commands::Render {
            image,
            canvas,
            nose,
            frames,
            debug,
            out,
        } => render(layout, &image, canvas, nose, frames, debug, &out),
        Commands::Targets {
            canvas,
            image,
            nose,
        } => targets(&layout, canvas, image, nose),
        Commands::Layout => {
            println!("pupil radius:  {}", layout.pupil_radius);
            println!("socket radius: {}", layout.socket_radius);
            for side in Side::BOTH {
                let o = layout.offset(side);
                println!("{:<5} offset:  ({}, {})", side.as_str(), o.x_offset, o.y_offset);
            }
            Ok(())
        }
    }
}

fn render(
    layout: EyeLayout,
    image: &Path,
    (width, height): (u32, u32),
    nose: Option<Point>,
    frames: u32,
    debug: bool,
    out: &Path,
) -> Result<()> {
    let decorative = DecorativeImage::load(image)
        .with_context(|| format!("loading {}", image.display()))?;
    let options = EngineOptions {
        debug,
        ..EngineOptions::default()
    };
    let mut engine = Engine::raster(layout, options, &ContentSize::new(width, height));
    let debug_enabled = debug;
    tracing::info!(
        image = %image.display(),
        width,
        height,
        frames,
        debug = debug_enabled,
        "rendering offline"
    );

    // Pretend the display refreshes at 60 Hz.
    let frame_time = Duration::from_secs(1) / 60;
    let start = Instant::now();
    engine.set_image(decorative, start);

    if let Some(point) = nose {
        let landmarks = FaceLandmarks::new(vec![point; spookeye_core::face::LANDMARK_COUNT])?;
        engine.report_face(&Rect::default(), &landmarks, &ExpressionScores::default(), start);
    }

    let mut now = start;
    for _ in 0..frames {
        now += frame_time;
        engine.frame(now, frame_time);
    }

    engine.canvas().surface().save_png(out)?;
    println!("wrote {} ({} frames)", out.display(), engine.frames());
    Ok(())
}

fn targets(
    layout: &EyeLayout,
    canvas: (u32, u32),
    image: (u32, u32),
    nose: Option<Point>,
) -> Result<()> {
    let canvas = Size::from_pixels(canvas.0, canvas.1);
    let image = Size::from_pixels(image.0, image.1);
    if canvas.is_empty() || image.is_empty() {
        bail!("canvas and image sizes must be non-zero");
    }
    let scene = Scene::new(canvas, image);
    tracing::info!(scale = scene.scale(), nose = ?nose, "computing targets");

    let mut eyes = serde_json::Map::new();
    for side in Side::BOTH {
        let offset = layout.offset(side);
        eyes.insert(
            side.as_str().to_string(),
            serde_json::json!({
                "socket": eye_geometry(&scene, layout.radii(), offset),
                "rest": compute_target(&scene, layout.radii(), offset, None),
                "target": compute_target(&scene, layout.radii(), offset, nose),
            }),
        );
    }

    let out = serde_json::json!({
        "scale": scene.scale(),
        "nose": nose,
        "eyes": eyes,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok((w, h))
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("800x600"), Ok((800, 600)));
        assert_eq!(parse_size("64X48"), Ok((64, 48)));
        assert!(parse_size("800").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("12.5, -3"), Ok(Point::new(12.5, -3.0)));
        assert!(parse_point("12").is_err());
    }

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::try_parse_from([
            "spookeye", "render", "--image", "a.png", "--canvas", "320x240", "--nose", "1,2",
        ])
        .unwrap();
        match cli.command {
            Commands::Render { canvas, nose, frames, .. } => {
                assert_eq!(canvas, (320, 240));
                assert_eq!(nose, Some(Point::new(1.0, 2.0)));
                assert_eq!(frames, 60);
            }
            _ => panic!("expected render"),
        }
    }
}
