use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use include_flattener::plan::{self, ApplyReport, Plan};
use include_flattener::{Result, ToolError, logging};

const RULE: &str = "-----------------------------";

fn main() {
    let cli = Cli::parse();
    if let Err(error) = logging::init(cli.verbose) {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    if !cli.json {
        banner("Flattening source directories...");
        println!("Target directory: {}", cli.target.display());
        println!("Output directory: {}", cli.output.display());
    }

    let plan = plan::plan(&cli.target, &cli.output)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    print_plan(&plan);
    if !plan.collisions.is_empty() {
        return Err(ToolError::Collisions(plan.collisions.clone()));
    }
    if cli.dry_run {
        println!("\nDry run, nothing written.");
        return Ok(());
    }

    let confirmed = cli.yes || prompt_for_confirmation()?;
    let report = plan::apply(&plan, confirmed)?;
    print_summary(&report);

    println!("\nDONE");
    println!("{RULE}");

    match report.failure_count() {
        0 => Ok(()),
        failures => Err(ToolError::Incomplete { failures }),
    }
}

fn banner(title: &str) {
    println!("{RULE}");
    println!("{title}");
    println!("{RULE}");
}

fn print_plan(plan: &Plan) {
    println!();
    banner("Include directory structure:");
    print!("{}", plan.include_tree());

    println!();
    banner("Src directory structure:");
    print!("{}", plan.src_tree());

    println!();
    banner("Replacement list");
    print!("{}", plan.table);

    if !plan.collisions.is_empty() {
        println!();
        banner("Flat name collisions");
        for collision in &plan.collisions {
            println!("{}", collision.flat_name);
            for source in &collision.sources {
                println!("  <- {}", source.display());
            }
        }
    }
}

/// Any line, including an empty one, confirms. End of input declines.
fn prompt_for_confirmation() -> Result<bool> {
    println!();
    println!("{RULE}");
    print!("Press enter to proceed...");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    Ok(read > 0)
}

fn print_summary(report: &ApplyReport) {
    println!();
    println!(
        "Wrote {} file(s), rewrote {} include(s).",
        report.flatten.written.len(),
        report.flatten.replacement_count()
    );
    for failure in &report.flatten.failures {
        println!("Skipped {}: {}", failure.path.display(), failure.error);
    }
    if report.walk_failures > 0 {
        println!("{} path(s) could not be walked.", report.walk_failures);
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Flatten an include/src source tree into one directory and rewrite its includes."
)]
struct Cli {
    /// Directory containing the `include` and `src` roots.
    target: PathBuf,

    /// Existing directory receiving the flattened files.
    output: PathBuf,

    /// Proceed without waiting for confirmation.
    #[arg(short, long)]
    yes: bool,

    /// Print the plan and stop before writing.
    #[arg(long)]
    dry_run: bool,

    /// Print the plan as JSON and stop before writing.
    #[arg(long, conflicts_with = "dry_run")]
    json: bool,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}
