use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use isoview::{AppConfig, MeshSource, ViewPreset};

/// Spin a solid under a fixed parallel projection.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Mesh file to display (STL). Defaults to the built-in cube.
    #[arg(short, long)]
    mesh: Option<PathBuf>,

    /// Fixed view: isometric, dimetric, trimetric, front, top or side.
    #[arg(short, long, default_value_t = ViewPreset::Isometric)]
    view: ViewPreset,

    /// Rotation speed in degrees per second.
    #[arg(short, long, default_value_t = isoview::DEFAULT_DEGREES_PER_SECOND)]
    speed: f64,

    /// Uniform scale applied in front of the view.
    #[arg(long, default_value_t = 0.5)]
    scale: f32,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Window title.
    #[arg(long, default_value = "isoview")]
    title: String,
}

impl Args {
    fn into_config(self) -> AppConfig {
        let mesh = self
            .mesh
            .map(MeshSource::from_path)
            .unwrap_or(MeshSource::BuiltinCube);

        AppConfig::new()
            .title(self.title)
            .size(self.width, self.height)
            .mesh(mesh)
            .view(self.view)
            .speed(self.speed)
            .scale(self.scale)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    // run_with_config logs its error before returning it.
    match isoview::run_with_config(args.into_config()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
