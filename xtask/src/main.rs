use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for glassroom")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, shaders, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Check the room shader sources for entry points
    Shaders,
    /// Build rustdoc for the workspace
    Doc,
    /// Render a few frames with the CLI
    Demo {
        #[arg(short, long, default_value = "3")]
        frames: u32,
    },
}

const SHADER_DIR: &str = "crates/room/shaders";

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            cargo("fmt", &["fmt", "--all", "--", "--check"])?;
            clippy()?;
            check_shaders()?;
            cargo("test", &["test", "--workspace"])?;
            cargo("doc", &["doc", "--workspace", "--no-deps"])?;
        }
        Commands::Fmt => cargo("fmt", &["fmt", "--all", "--", "--check"])?,
        Commands::Clippy => clippy()?,
        Commands::Test => cargo("test", &["test", "--workspace"])?,
        Commands::Shaders => check_shaders()?,
        Commands::Doc => cargo("doc", &["doc", "--workspace", "--no-deps"])?,
        Commands::Demo { frames } => {
            let frames = frames.to_string();
            cargo(
                "run",
                &[
                    "run",
                    "-p",
                    "glassroom-cli",
                    "--",
                    "render",
                    "--frames",
                    &frames,
                    "--shader-dir",
                    SHADER_DIR,
                ],
            )?;
        }
    }

    Ok(())
}

fn cargo(step: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {step}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {step} failed");
    }
    Ok(())
}

fn clippy() -> Result<()> {
    cargo(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn check_shaders() -> Result<()> {
    println!("==> Checking shaders in {SHADER_DIR}");
    let mut checked = 0;
    for entry in std::fs::read_dir(Path::new(SHADER_DIR)).context("listing shader dir")? {
        let path = entry?.path();
        let is_stage = path
            .extension()
            .is_some_and(|ext| ext == "vs" || ext == "fs");
        if !is_stage {
            continue;
        }
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        if !source.contains("void main") {
            anyhow::bail!("{} has no main()", path.display());
        }
        checked += 1;
    }
    println!("{checked} shader stages ok");
    Ok(())
}
