// CLI front end: renders demo scenes or JSON scene files with the
// software pipeline and writes the framebuffer to PNG, with an optional
// preview window.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

pub mod scene;
pub mod scenes;

#[derive(Parser)]
#[command(name = "softgl")]
#[command(about = "Software fixed-function 3D renderer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Render a built-in demo scene to a PNG
    Demo {
        /// Demo name (see `softgl scenes`)
        #[arg(short, long, default_value = "lit-cube")]
        scene: String,

        /// Output PNG path
        #[arg(short, long, default_value = "softgl.png")]
        output: PathBuf,

        /// Square framebuffer size in pixels
        #[arg(long, default_value_t = 256)]
        size: u32,

        /// Turntable angle in degrees
        #[arg(long, default_value_t = 30.0)]
        angle: f32,

        /// Show the result in a window
        #[arg(long)]
        preview: bool,
    },
    /// Render a JSON scene description to a PNG
    Render {
        /// Path to the scene file
        scene_file: PathBuf,

        /// Output PNG path
        #[arg(short, long, default_value = "softgl.png")]
        output: PathBuf,

        /// Show the result in a window
        #[arg(long)]
        preview: bool,
    },
    /// Render a turntable animation of a demo scene as numbered PNGs
    Animate {
        /// Demo name (see `softgl scenes`)
        #[arg(short, long, default_value = "lit-cube")]
        scene: String,

        /// Number of frames over a full revolution
        #[arg(long, default_value_t = 60)]
        frames: u32,

        /// Directory for the numbered frames
        #[arg(short, long, default_value = "frames")]
        output_dir: PathBuf,

        /// Square framebuffer size in pixels
        #[arg(long, default_value_t = 256)]
        size: u32,
    },
    /// List the built-in demo scenes
    Scenes,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            scene,
            output,
            size,
            angle,
            preview,
        } => {
            let image = scenes::render(&scene, size, angle)
                .with_context(|| format!("unknown demo scene {scene:?} (try `softgl scenes`)"))?;
            save_png(&image, &output)?;
            if preview {
                show_preview(&image, &scene)?;
            }
        }
        Commands::Render {
            scene_file,
            output,
            preview,
        } => {
            let scene = scene::load(&scene_file)?;
            let context = scene.render()?;
            save_png(context.framebuffer(), &output)?;
            if preview {
                show_preview(context.framebuffer(), "scene")?;
            }
        }
        Commands::Animate {
            scene,
            frames,
            output_dir,
            size,
        } => {
            anyhow::ensure!(frames > 0, "frame count must be positive");
            scenes::render(&scene, 1, 0.0)
                .with_context(|| format!("unknown demo scene {scene:?} (try `softgl scenes`)"))?;
            std::fs::create_dir_all(&output_dir)?;

            let bar = ProgressBar::new(frames as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .expect("static template is valid")
                    .progress_chars("=>-"),
            );
            bar.set_message(scene.clone());

            for frame in 0..frames {
                let angle = frame as f32 * 360.0 / frames as f32;
                let image = scenes::render(&scene, size, angle)
                    .expect("scene validity checked before the loop");
                let path = output_dir.join(format!("{scene}_{frame:04}.png"));
                save_png(&image, &path)?;
                bar.inc(1);
            }
            bar.finish_with_message("done");
        }
        Commands::Scenes => {
            for name in scenes::NAMES {
                println!("{name}");
            }
        }
    }

    Ok(())
}

fn save_png(image: &RgbaImage, path: &Path) -> anyhow::Result<()> {
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Blocking preview window; closes on Escape.
fn show_preview(image: &RgbaImage, title: &str) -> anyhow::Result<()> {
    let (width, height) = image.dimensions();
    let buffer: Vec<u32> = image
        .pixels()
        .map(|p| {
            let [r, g, b, _] = p.0;
            ((r as u32) << 16) | ((g as u32) << 8) | b as u32
        })
        .collect();

    let mut window = minifb::Window::new(
        &format!("softgl - {title}"),
        width as usize,
        height as usize,
        minifb::WindowOptions::default(),
    )
    .context("failed to open preview window")?;
    window.limit_update_rate(Some(std::time::Duration::from_secs_f64(1.0 / 30.0)));

    while window.is_open() && !window.is_key_down(minifb::Key::Escape) {
        window
            .update_with_buffer(&buffer, width as usize, height as usize)
            .context("failed to update preview window")?;
    }
    Ok(())
}
