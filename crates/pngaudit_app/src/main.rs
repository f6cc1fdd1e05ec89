//! pngaudit - structural checker for PNG, MNG and JNG files.

mod engine;
mod extract;
mod render;

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use pngaudit_core::{CheckConfig, Severity, Verbosity};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use engine::{Input, Options};

/// Exit status when any file had problems.
const EXIT_PROBLEMS: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "pngaudit")]
#[command(version, about = "Check PNG, MNG and JNG files for structural errors")]
struct Args {
    /// Verbose listing; repeat to list row filters as well
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,

    /// Print tEXt, zTXt and iTXt contents
    #[arg(short = 't', long = "text")]
    print_text: bool,

    /// Like -t, escaping every byte outside 7-bit ASCII
    #[arg(short = '7', long = "seven-bit")]
    seven_bit: bool,

    /// Print palette, transparency and histogram entries
    #[arg(short = 'p', long = "palette")]
    print_palette: bool,

    /// Keep checking after length and framing errors
    #[arg(short, long)]
    force: bool,

    /// Search for PNG, MNG and JNG streams anywhere in the input
    #[arg(short, long)]
    search: bool,

    /// Search and write each stream found to <name>-<n>.<ext>
    #[arg(short = 'x', long)]
    extract: bool,

    /// Log filter for diagnostics on stderr (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Number of files checked in parallel
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Files to check; "-" reads standard input
    files: Vec<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches)?;
    init_tracing(args.log_level.as_deref())?;

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("failed to start worker threads")?;
    }

    let inputs: Vec<Input> = if args.files.is_empty() {
        if std::io::stdin().is_terminal() {
            Args::command().print_help()?;
            return Ok(ExitCode::SUCCESS);
        }
        vec![Input::Stdin]
    } else {
        args.files.iter().cloned().map(Input::from_arg).collect()
    };

    let options = Options {
        config: build_config(&args, quiet_wins(&matches)),
        search: args.search || args.extract,
        extract: args.extract,
    };
    tracing::debug!(files = inputs.len(), ?options, "starting");

    let worst = engine::run(&inputs, &options)?;
    Ok(if worst > Severity::Clean {
        ExitCode::from(EXIT_PROBLEMS)
    } else {
        ExitCode::SUCCESS
    })
}

fn init_tracing(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(filter) => EnvFilter::try_new(filter).context("invalid --log-level filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!(e))
}

/// `-q` and `-v` cancel each other; whichever comes last on the command line wins.
fn quiet_wins(matches: &ArgMatches) -> bool {
    let Some(quiet) = matches.index_of("quiet") else {
        return false;
    };
    matches
        .indices_of("verbose")
        .and_then(|indices| indices.max())
        .is_none_or(|verbose| quiet > verbose)
}

fn build_config(args: &Args, quiet_last: bool) -> CheckConfig {
    let verbosity = match args.verbose {
        0 => Verbosity::Plain,
        1 => Verbosity::Verbose,
        _ => Verbosity::VeryVerbose,
    };
    let config = CheckConfig::new()
        .with_force(args.force)
        .with_print_text(args.print_text)
        .with_seven_bit(args.seven_bit)
        .with_print_palette(args.print_palette);
    if quiet_last {
        config.with_verbosity(verbosity).with_quiet(true)
    } else {
        config.with_quiet(args.quiet).with_verbosity(verbosity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> (Args, ArgMatches) {
        let matches = Args::command().try_get_matches_from(argv).unwrap();
        let args = Args::from_arg_matches(&matches).unwrap();
        (args, matches)
    }

    #[test]
    fn test_last_of_quiet_and_verbose_wins() {
        let (args, matches) = parse(&["pngaudit", "-v", "-q", "a.png"]);
        let config = build_config(&args, quiet_wins(&matches));
        assert!(config.quiet);
        assert_eq!(config.verbosity, Verbosity::Plain);

        let (args, matches) = parse(&["pngaudit", "-q", "-vv", "a.png"]);
        let config = build_config(&args, quiet_wins(&matches));
        assert!(!config.quiet);
        assert_eq!(config.verbosity, Verbosity::VeryVerbose);
    }

    #[test]
    fn test_seven_bit_prints_text() {
        let (args, matches) = parse(&["pngaudit", "-7", "a.png"]);
        let config = build_config(&args, quiet_wins(&matches));
        assert!(config.print_text);
        assert!(config.seven_bit);
    }

    #[test]
    fn test_stdin_dash() {
        let (args, _) = parse(&["pngaudit", "-", "b.png"]);
        let inputs: Vec<Input> = args.files.into_iter().map(Input::from_arg).collect();
        assert_eq!(inputs[0], Input::Stdin);
        assert_eq!(inputs[1], Input::File(PathBuf::from("b.png")));
    }

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }
}
