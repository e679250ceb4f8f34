//! `aiflow` - build context packs for AI-assisted development.
//!
//! ## Commands
//!
//! - `export` - Export a project into bundles, indexes and optional reports
//! - `pack` - Write `PROMPT.md`, optionally with `.project/` and accepted ADRs
//! - `init-project` - Seed `.project/`, `docs/adr/` and `docs/spec/` from templates
//! - `validate` - Check a ledger, decisions or intent document
//!
//! Logs go to stderr (`RUST_LOG` overrides the default `info` filter); stdout
//! carries only the command result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use context_pack_exporter::{run_export, FileStatus};
use context_pack_governance::{
    copy_governance, init_project, validate_decisions, validate_intent, validate_ledger,
    write_prompt,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "aiflow")]
#[command(about = "Build context packs for AI-assisted development")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a project into bundles/index/summary/tree
    Export {
        /// export_config.json (or .toml) path
        #[arg(long)]
        config: PathBuf,
    },
    /// Write PROMPT.md and optionally copy .project + accepted ADRs
    Pack {
        #[arg(long)]
        project_root: PathBuf,

        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value = "")]
        task: String,

        /// Repeatable
        #[arg(long = "do-not-do")]
        do_not_do: Vec<String>,

        #[arg(long)]
        copy_governance: bool,

        #[arg(long)]
        no_adrs: bool,
    },
    /// Seed .project/ + docs/adr/ + docs/spec/ from a template directory
    InitProject {
        #[arg(long)]
        project_root: PathBuf,

        #[arg(long)]
        template_dir: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
    /// Validate a governance document
    Validate {
        kind: DocumentKind,
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DocumentKind {
    Ledger,
    Decisions,
    Intent,
}

fn cmd_export(config: &Path) -> Result<ExitCode> {
    let report = run_export(config)
        .with_context(|| format!("export failed for config {}", config.display()))?;
    if report.count(FileStatus::ReadError) > 0 {
        log::warn!(
            "{} file(s) could not be read, see manifest.json",
            report.count(FileStatus::ReadError)
        );
    }
    println!("[export] done: {}", report.out_dir.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_pack(
    project_root: &Path,
    out: &Path,
    task: &str,
    do_not_do: &[String],
    copy: bool,
    include_adrs: bool,
) -> Result<ExitCode> {
    std::fs::create_dir_all(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let out_dir = std::fs::canonicalize(out)
        .with_context(|| format!("failed to resolve {}", out.display()))?;

    write_prompt(&out_dir, task, do_not_do).context("failed to write prompt")?;

    if copy {
        let project_root = std::fs::canonicalize(project_root)
            .with_context(|| format!("project root not found: {}", project_root.display()))?;
        let copied = copy_governance(&project_root, &out_dir, include_adrs)
            .context("failed to copy governance files")?;
        log::info!(
            "Copied {} ledger file(s) and {} ADR(s)",
            copied.project_files.len(),
            copied.adrs.len()
        );
    }

    println!("[pack] done: {}", out_dir.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_init_project(project_root: &Path, template_dir: &Path, force: bool) -> Result<ExitCode> {
    std::fs::create_dir_all(project_root)
        .with_context(|| format!("failed to create {}", project_root.display()))?;
    let project_root = std::fs::canonicalize(project_root)
        .with_context(|| format!("failed to resolve {}", project_root.display()))?;

    let report = init_project(template_dir, &project_root, force)?;
    for kept in &report.kept {
        log::info!("Kept existing {}", kept.display());
    }
    println!(
        "[init-project] wrote .project/ + docs/adr/ + docs/spec/ into: {}",
        project_root.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(kind: DocumentKind, file: &Path) -> Result<ExitCode> {
    let problems = match kind {
        DocumentKind::Ledger => validate_ledger(file),
        DocumentKind::Decisions => validate_decisions(file),
        DocumentKind::Intent => validate_intent(file),
    }?;

    if problems.is_empty() {
        println!("[validate] ok: {}", file.display());
        return Ok(ExitCode::SUCCESS);
    }
    for problem in &problems {
        println!("- {problem}");
    }
    println!("[validate] {} problem(s): {}", problems.len(), file.display());
    Ok(ExitCode::from(1))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Commands::Export { config } => cmd_export(&config),
        Commands::Pack {
            project_root,
            out,
            task,
            do_not_do,
            copy_governance,
            no_adrs,
        } => cmd_pack(
            &project_root,
            &out,
            &task,
            &do_not_do,
            copy_governance,
            !no_adrs,
        ),
        Commands::InitProject {
            project_root,
            template_dir,
            force,
        } => cmd_init_project(&project_root, &template_dir, force),
        Commands::Validate { kind, file } => cmd_validate(kind, &file),
    }
}
