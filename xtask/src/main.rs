use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

const BIOS_SIZE: u64 = 512 * 1024;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for xsp")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Library modules that can be tested in isolation
#[derive(Clone, Copy, ValueEnum)]
enum Module {
    Cpu,
    Gpu,
    Memory,
    Dma,
    Interrupt,
    Display,
    SharedState,
    System,
}

impl Module {
    fn path(self) -> &'static str {
        match self {
            Module::Cpu => "core::cpu",
            Module::Gpu => "core::gpu",
            Module::Memory => "core::memory",
            Module::Dma => "core::dma",
            Module::Interrupt => "core::interrupt",
            Module::Display => "core::display",
            Module::SharedState => "core::shared_state",
            Module::System => "core::system",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Quick checks before commit (fmt, clippy)
    Check {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        #[arg(long)]
        doc: bool,
        /// Also run tests that need a real BIOS (XSP_BIOS_PATH)
        #[arg(long)]
        ignored: bool,
        /// Restrict to the unit tests of these modules
        #[arg(short, long, value_enum)]
        module: Vec<Module>,
    },
    /// Run benchmarks
    Bench,
    /// Boot a BIOS image headless for a number of ticks
    Boot {
        /// Path to BIOS file
        #[arg(default_value = "SCPH1001.BIN")]
        bios_path: String,
        /// Number of ticks to run
        #[arg(short = 'n', long, default_value = "15780")]
        ticks: u64,
        /// Dump the final framebuffer to this file
        #[arg(long)]
        dump_frame: Option<String>,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Pre-commit hook (fmt, clippy, test)
    PreCommit,
    /// Install git hooks
    InstallHooks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_ci(verbose),
        Commands::Check { verbose } => run_check(verbose),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release } => run_build(release),
        Commands::Test {
            doc,
            ignored,
            module,
        } => run_test(doc, ignored, &module),
        Commands::Bench => run_bench(),
        Commands::Boot {
            bios_path,
            ticks,
            dump_frame,
            release,
        } => run_boot(&bios_path, ticks, dump_frame.as_deref(), release),
        Commands::PreCommit => run_pre_commit(),
        Commands::InstallHooks => install_hooks(),
    }
}

fn run_ci(verbose: bool) -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;
    run_task("Build", || run_build(false), verbose)?;
    run_task("Test", || run_test(false, false, &[]), verbose)?;

    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );

    Ok(())
}

fn run_check(verbose: bool) -> Result<()> {
    println!("{}", "=== Running Quick Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;

    println!(
        "\n{} {}",
        "✓ Checks passed in".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );

    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("fmt").arg("--all");

    if check {
        cmd.arg("--").arg("--check");
    }

    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("clippy").arg("--all-targets").arg("--all-features");

    if fix {
        cmd.arg("--fix");
    } else {
        cmd.arg("--").arg("-D").arg("warnings");
    }

    execute_command(&mut cmd)
}

fn run_build(release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("build");

    if release {
        cmd.arg("--release");
    }

    execute_command(&mut cmd)
}

fn run_test(doc: bool, ignored: bool, modules: &[Module]) -> Result<()> {
    if doc || modules.is_empty() {
        let mut cmd = Command::new("cargo");
        cmd.arg("test").arg("--all-features");

        if doc {
            cmd.arg("--doc");
        }
        if ignored {
            cmd.arg("--").arg("--ignored");
        }

        return execute_command(&mut cmd);
    }

    let mut failed = Vec::new();

    for &module in modules {
        let path = module.path();
        println!("{} Running {} tests...", "→".blue(), path.bold());

        let mut cmd = Command::new("cargo");
        cmd.arg("test").arg("--all-features").arg("--lib").arg(path);

        if ignored {
            cmd.arg("--").arg("--ignored");
        }

        match execute_command(&mut cmd) {
            Ok(()) => println!("{} {} tests passed\n", "✓".green(), path),
            Err(e) => {
                println!("{} {} tests failed\n", "✗".red(), path);
                if modules.len() == 1 {
                    return Err(e);
                }
                failed.push(path);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Module tests failed: {}", failed.join(", "))
    }
}

fn run_bench() -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("bench");

    execute_command(&mut cmd)
}

fn run_boot(bios_path: &str, ticks: u64, dump_frame: Option<&str>, release: bool) -> Result<()> {
    println!("{}", "=== BIOS Boot ===".bold().blue());

    let bios = Path::new(bios_path);
    if !bios.exists() {
        println!(
            "{} BIOS file not found: {}",
            "✗".red().bold(),
            bios_path.yellow()
        );
        println!(
            "\n{} Pass a BIOS image path or place SCPH1001.BIN in the project root.",
            "ℹ".blue()
        );
        anyhow::bail!("BIOS file not found");
    }

    let len = std::fs::metadata(bios)?.len();
    if len != BIOS_SIZE {
        println!(
            "{} Invalid BIOS size: {} bytes (expected {} bytes)",
            "✗".red().bold(),
            len,
            BIOS_SIZE
        );
        anyhow::bail!("Invalid BIOS file size");
    }

    println!("{} BIOS file: {}", "✓".green(), bios_path.cyan());
    println!("{} Ticks: {}", "→".blue(), ticks.to_string().bold());
    println!(
        "{} Build mode: {}",
        "→".blue(),
        if release {
            "release".green().bold()
        } else {
            "debug".yellow().bold()
        }
    );
    println!();

    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.arg("run").arg("--bin").arg("xsp");

    if release {
        cmd.arg("--release");
    }

    cmd.arg("--").arg(bios_path).arg("-n").arg(ticks.to_string());

    if let Some(path) = dump_frame {
        cmd.arg("--dump-frame").arg(path);
    }

    if let Err(e) = execute_command(&mut cmd) {
        println!("\n{} BIOS boot failed", "✗".red().bold());
        return Err(e);
    }

    println!(
        "\n{} BIOS boot completed in {}",
        "✓".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );

    Ok(())
}

fn run_pre_commit() -> Result<()> {
    println!("{}", "=== Pre-commit Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), false)?;
    run_task("Clippy", || run_clippy(false), false)?;
    run_task("Test", || run_test(false, false, &[]), false)?;

    println!(
        "\n{} {}",
        "✓ Pre-commit checks passed in".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );

    Ok(())
}

fn install_hooks() -> Result<()> {
    use std::fs;

    println!("{}", "Installing git hooks...".bold());

    let hook_content = r#"#!/bin/sh
# Auto-generated by cargo x install-hooks
set -e

echo "Running pre-commit checks..."
cargo x pre-commit
"#;

    let hook_path = ".git/hooks/pre-commit";
    fs::write(hook_path, hook_content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(hook_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(hook_path, perms)?;
    }

    println!("{}", "✓ Git hooks installed".green());
    println!("  Pre-commit hook will run: fmt, clippy, test");

    Ok(())
}

fn run_task<F>(name: &str, task: F, verbose: bool) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();

    match task() {
        Ok(()) => {
            if verbose {
                println!(
                    "{} ({:.2}s)",
                    "✓".green().bold(),
                    start.elapsed().as_secs_f64()
                );
            } else {
                println!("{}", "✓".green().bold());
            }
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}
