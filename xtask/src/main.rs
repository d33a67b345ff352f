use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for pasture")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc, headless smoke run
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Run a short headless simulation and its determinism check
    Smoke,
}

/// A named cargo invocation.
struct Step {
    banner: &'static str,
    args: &'static [&'static str],
}

const FMT: Step = Step {
    banner: "cargo fmt --check",
    args: &["fmt", "--all", "--", "--check"],
};
const CLIPPY: Step = Step {
    banner: "cargo clippy",
    args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
};
const TEST: Step = Step {
    banner: "cargo test",
    args: &["test", "--workspace"],
};
const DOC: Step = Step {
    banner: "cargo doc",
    args: &["doc", "--workspace", "--no-deps"],
};
const BUILD: Step = Step {
    banner: "cargo build",
    args: &["build", "--workspace"],
};
const SMOKE_SIMULATE: Step = Step {
    banner: "pasture-cli simulate",
    args: &[
        "run", "-q", "-p", "pasture-cli", "--", "simulate", "--frames", "900", "--json",
    ],
};
const SMOKE_DETERMINISM: Step = Step {
    banner: "pasture-cli determinism",
    args: &[
        "run", "-q", "-p", "pasture-cli", "--", "determinism", "--frames", "900",
    ],
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let steps = match cli.command {
        Commands::Check => vec![FMT, CLIPPY, TEST, DOC, SMOKE_SIMULATE, SMOKE_DETERMINISM],
        Commands::Fmt => vec![FMT],
        Commands::Clippy => vec![CLIPPY],
        Commands::Test => vec![TEST],
        Commands::Doc => vec![DOC],
        Commands::Build => vec![BUILD],
        Commands::Smoke => vec![SMOKE_SIMULATE, SMOKE_DETERMINISM],
    };
    for step in &steps {
        run(step)?;
    }

    Ok(())
}

fn run(step: &Step) -> Result<()> {
    println!("==> Running {}", step.banner);
    let status = Command::new("cargo").args(step.args).status()?;
    if !status.success() {
        anyhow::bail!("{} failed", step.banner);
    }
    Ok(())
}
