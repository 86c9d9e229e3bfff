// cli.rs - Command-line interface configuration
use anyhow::{bail, Context, Result};
use clap::Parser;
use glam::Vec3;
use std::path::PathBuf;

use crate::camera::Camera;
use crate::controllers::ControllerKind;

#[derive(Parser, Debug, Clone)]
#[command(name = "gltf-viewer")]
#[command(about = "glTF 2.0 scene viewer", long_about = None)]
pub struct Cli {
    /// glTF file to open (.gltf or .glb)
    pub file: PathBuf,

    /// Initial camera as eye,center,up (nine comma separated numbers)
    #[arg(long, value_name = "X,Y,Z,X,Y,Z,X,Y,Z", allow_hyphen_values = true)]
    pub lookat: Option<String>,

    /// Render a single frame to this image file and exit
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Camera controller used at startup
    #[arg(long, value_enum, default_value_t = ControllerKind::Trackball)]
    pub controller: ControllerKind,

    /// WGSL file replacing the built-in forward shader
    #[arg(long, value_name = "PATH")]
    pub shader: Option<PathBuf>,

    /// Start with lighting disabled
    #[arg(long = "no-lighting", default_value = "false")]
    pub no_lighting: bool,

    /// Attach the light to the camera
    #[arg(long = "light-from-camera", default_value = "false")]
    pub light_from_camera: bool,

    /// Print the draw calls of one frame and exit
    #[arg(long = "dump-draws", default_value = "false")]
    pub dump_draws: bool,
}

/// What the viewer does once the scene is loaded
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    Interactive,
    /// Render one frame offscreen and write it to this path
    Capture(PathBuf),
    /// Print one frame of draw calls
    DumpDraws,
}

/// Validated startup options
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub file: PathBuf,
    pub camera: Option<Camera>,
    pub width: u32,
    pub height: u32,
    pub controller: ControllerKind,
    /// Contents of the `--shader` file
    pub shader_source: Option<String>,
    pub lighting: bool,
    pub light_from_camera: bool,
    pub mode: RunMode,
}

impl TryFrom<Cli> for ViewerConfig {
    type Error = anyhow::Error;

    fn try_from(cli: Cli) -> Result<Self> {
        if cli.width == 0 || cli.height == 0 {
            bail!("Viewport size must be positive, got {}x{}", cli.width, cli.height);
        }

        let camera = cli
            .lookat
            .as_deref()
            .map(parse_lookat)
            .transpose()
            .context("Invalid --lookat")?;

        let shader_source = cli
            .shader
            .as_ref()
            .map(|path| {
                std::fs::read_to_string(path).with_context(|| format!("Failed to read shader {:?}", path))
            })
            .transpose()?;

        let mode = match (cli.output, cli.dump_draws) {
            (Some(_), true) => bail!("--output and --dump-draws cannot be combined"),
            (Some(path), false) => RunMode::Capture(path),
            (None, true) => RunMode::DumpDraws,
            (None, false) => RunMode::Interactive,
        };

        Ok(Self {
            file: cli.file,
            camera,
            width: cli.width,
            height: cli.height,
            controller: cli.controller,
            shader_source,
            lighting: !cli.no_lighting,
            light_from_camera: cli.light_from_camera,
            mode,
        })
    }
}

/// Parse `eye,center,up` as printed by `Camera::look_at_args`
pub fn parse_lookat(args: &str) -> Result<Camera> {
    let values = args
        .split(',')
        .map(|value| {
            value
                .trim()
                .parse::<f32>()
                .with_context(|| format!("'{}' is not a number", value.trim()))
        })
        .collect::<Result<Vec<f32>>>()?;

    if values.len() != 9 {
        bail!("Expected 9 comma separated numbers, got {}", values.len());
    }

    let eye = Vec3::from_slice(&values[0..3]);
    let center = Vec3::from_slice(&values[3..6]);
    let up = Vec3::from_slice(&values[6..9]);
    if eye == center {
        bail!("Eye and center must differ");
    }
    Ok(Camera::new(eye, center, up))
}
