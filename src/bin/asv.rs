// asv-collect - Benchmark result collection tool
// Copyright (c) 2025 Oliver Seifert
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::Result;
use asv_collect::config::{Config, DEFAULT_CONFIG_FILE};
use asv_collect::format::default_max_width;
use asv_collect::{CollectOptions, LogConsole, collect};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "asv")]
#[command(about = "Inspect stored benchmark results", long_about = None)]
#[command(version)]
struct Cli {
    /// Benchmark configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that operate on a subset of the suite
#[derive(Args)]
struct BenchArgs {
    /// Regular expression for benchmarks to include (may be repeated)
    #[arg(short, long)]
    bench: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect benchmark suite and display results
    Collect {
        /// Also display results for given range of commits
        range: Option<String>,
        #[command(flatten)]
        bench: BenchArgs,
        /// Print `asv run` commands for values that are missing
        #[arg(long)]
        missing: bool,
        /// Machine entry to use from ~/.asv-machine.json
        #[arg(long)]
        machine: Option<String>,
        /// Read machine information from this file instead
        #[arg(long)]
        machine_file: Option<PathBuf>,
    },
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            log::Level::Warn => writeln!(buf, "{} {}", "warning:".yellow(), record.args()),
            log::Level::Error => writeln!(buf, "{} {}", "error:".red(), record.args()),
            level => writeln!(
                buf,
                "{} {}",
                format!("{}:", level.as_str().to_lowercase()).dimmed(),
                record.args()
            ),
        })
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let conf = Config::load(&cli.config)?;

    match cli.command {
        Commands::Collect {
            range,
            bench,
            missing,
            machine,
            machine_file,
        } => {
            let options = CollectOptions {
                range,
                bench: bench.bench,
                missing,
                machine,
                machine_file,
                max_width: default_max_width(),
            };
            collect::run(&conf, &options, &mut LogConsole)?;
        }
    }

    Ok(())
}
