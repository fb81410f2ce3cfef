use anyhow::Context;
use clap::{Parser, Subcommand};
use glassroom_render::{
    Command, DrawStatus, FileShaderLoader, ObjectFile, RecordingContext, Scene, SceneInspector,
    ShaderLoader,
};
use glassroom_room::{LightVisualizer, OrbitCamera, RoomScene};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glassroom-cli", about = "Run the glass room scene headlessly")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read shader sources from this directory instead of the built-in ones
    #[arg(long, global = true)]
    shader_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// List the expected programs and whether they compile
    Programs,
    /// Start the scene and draw frames against a recording context
    Render {
        /// Number of frames to draw
        #[arg(short, long, default_value = "3")]
        frames: u32,
        /// Factor mapping 0..255 light colors to marker emissive color
        #[arg(long, default_value = "0.0025")]
        emissive_scale: f32,
        /// Intensity applied to every light
        #[arg(long, default_value = "1.0")]
        light_intensity: f32,
        /// Hide the light markers
        #[arg(long)]
        hide_lights: bool,
        /// JSON file with extra objects (`[{"geometry": .., "material": ..}]`)
        #[arg(long)]
        objects: Option<PathBuf>,
    },
}

fn loader(shader_dir: Option<PathBuf>) -> Box<dyn ShaderLoader> {
    match shader_dir {
        Some(dir) => Box::new(FileShaderLoader::new(dir)),
        None => Box::new(glassroom_room::builtin_loader()),
    }
}

fn start(ctx: &mut RecordingContext, loader: &dyn ShaderLoader) -> anyhow::Result<Scene> {
    let programs = glassroom_room::programs();
    tracing::info!("starting scene with {} programs", programs.len());
    let mut scene = Scene::new();
    pollster::block_on(scene.initialize(ctx, loader, &programs))
        .context("scene startup failed")?;
    Ok(scene)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("glassroom-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", glassroom_render::crate_info());
            println!("programs: {}", glassroom_room::programs().len());
        }
        Commands::Programs => {
            for program in glassroom_room::programs() {
                println!(
                    "{}: {} + {} ({} attributes, {} uniforms)",
                    program.name,
                    program.vertex,
                    program.fragment,
                    program.attributes.len(),
                    program.uniforms.len()
                );
            }
            let mut ctx = RecordingContext::new();
            let scene = start(&mut ctx, loader(cli.shader_dir).as_ref())?;
            let names: Vec<_> = scene.registry().names().collect();
            println!("Registered: [{}]", names.join(", "));
        }
        Commands::Render {
            frames,
            emissive_scale,
            light_intensity,
            hide_lights,
            objects,
        } => {
            let mut ctx = RecordingContext::new();
            let mut scene = start(&mut ctx, loader(cli.shader_dir).as_ref())?;

            let mut visualizer = LightVisualizer::new(emissive_scale);
            visualizer.visible = !hide_lights;
            let room = RoomScene::new(visualizer).with_light_intensity(light_intensity);
            room.populate(&mut scene)?;

            if let Some(path) = objects {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let extra: Vec<ObjectFile> = serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?;
                for object in extra {
                    scene.add_descriptor(object.into())?;
                }
            }

            let mut camera = OrbitCamera::default();
            for frame in 0..frames {
                match scene.draw(&mut ctx, &room.frame_uniforms(&camera)) {
                    DrawStatus::Drawn(n) => println!("Frame {frame}: drew {n} objects"),
                    status => tracing::warn!("frame {frame} skipped: {status:?}"),
                }
                camera.rotate(40.0, 0.0);
            }

            println!("{}", SceneInspector::summary(&scene));
            for index in 0..scene.object_count() {
                if let Some(info) =
                    SceneInspector::inspect_object(&scene, glassroom_render::ObjectId(index))
                {
                    println!("  {info}");
                }
            }
            println!(
                "Commands: {} total, {} uniform uploads, {} texture ops, {} image uploads, {} draw calls",
                ctx.commands().len(),
                ctx.count(Command::is_uniform_upload),
                ctx.count(Command::is_texture_op),
                ctx.uploads(),
                ctx.draw_calls()
            );
        }
    }

    Ok(())
}
