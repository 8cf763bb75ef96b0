use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shcov::cli::{self, CoverageOptions, OutputFormat};
use shcov::runner::{ShellCommand, TestRun, DEFAULT_PS4, DEFAULT_SHELL};
use shcov::trace::{PathFilter, PathRewrite};

/// shcov: line coverage for shell scripts, from `set -x` traces.
#[derive(Parser)]
#[command(
    name = "shcov",
    version,
    about,
    after_help = "When analysing captured output, make sure it was produced with\n  \
                  export PS4='+PS4 + ${BASH_SOURCE} + ${SECONDS}S + L${LINENO} + '\n\
                  Bash before 4.3 truncates PS4 to 99 characters; use --replace-paths\n\
                  to shorten long script paths instead."
)]
struct Cli {
    #[command(flatten)]
    filter: FilterArgs,

    /// Scripts to include in the report even if no trace mentions them.
    #[arg(long, global = true, num_args = 1.., value_name = "SCRIPT")]
    scripts: Vec<PathBuf>,

    /// Report format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log debug diagnostics to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Only analyse scripts whose path contains one of these.
    #[arg(short = 'p', long, global = true, num_args = 1.., value_name = "PATH")]
    only_paths: Vec<String>,

    /// Ignore scripts whose path contains one of these.
    #[arg(long, global = true, num_args = 1.., value_name = "PATH")]
    ignore_paths: Vec<String>,

    /// Rewrite script paths, applied in order, e.g. /a/b/run:/home.
    #[arg(long, global = true, num_args = 1.., value_name = "ORIG:REPLACE")]
    replace_paths: Vec<PathRewrite>,
}

impl From<FilterArgs> for PathFilter {
    fn from(args: FilterArgs) -> Self {
        PathFilter {
            only: args.only_paths,
            ignore: args.ignore_paths,
            rewrites: args.replace_paths,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run test scripts under a tracing shell and report coverage.
    Run {
        /// Test scripts, or directories searched for test_*.{sh,bash,ksh}.
        #[arg(required = true)]
        test_paths: Vec<PathBuf>,

        /// Shell used to run each test, split with shell quoting rules.
        #[arg(long, env = "SHCOV_SHELL", default_value = DEFAULT_SHELL)]
        shell: ShellCommand,

        /// Trace prompt exported to the test scripts.
        #[arg(long, env = "SHCOV_PS4", default_value = DEFAULT_PS4)]
        ps4: String,
    },

    /// Report coverage from previously captured trace output.
    Report {
        /// Captured output files; "-" reads from stdin.
        #[arg(required = true)]
        results: Vec<PathBuf>,
    },

    /// Show the coverable lines of a script.
    Lines {
        script: PathBuf,

        /// Print the stripped text with line numbers instead.
        #[arg(long)]
        stripped: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = CoverageOptions {
        filter: cli.filter.into(),
        scripts: cli.scripts,
        format: cli.format,
    };

    let output = match cli.command {
        Commands::Run {
            test_paths,
            shell,
            ps4,
        } => {
            let run = TestRun {
                test_paths,
                shell,
                ps4,
            };
            cli::cmd_run(&run, &options)?
        }
        Commands::Report { results } => cli::cmd_report(&results, &options)?,
        Commands::Lines { script, stripped } => cli::cmd_lines(&script, stripped)?,
    };

    print!("{output}");
    Ok(())
}
