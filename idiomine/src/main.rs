use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use idiomine_core::cli::{self, CliOverrides, Command};
use idiomine_rust::RustFrontend;

#[derive(Parser)]
#[command(
    name = "idiomine",
    version,
    about = "Mine small, context-isolated code changes from revision histories"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to idiomine.toml in the current directory).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` overrides the
/// default `info` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let Cli { command, config } = Cli::parse();

    let frontend = RustFrontend::new();
    let stdout = std::io::stdout();
    let mut writer = stdout.lock();

    let mut loaded = match cli::load_config(config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(e.exit_code());
        }
    };

    let result = match command {
        Command::Extract {
            input,
            output,
            grammar,
            max_changed_lines,
            context_lines,
            threads,
            batch_size,
            with_commit_message,
        } => {
            let overrides = CliOverrides {
                max_changed_lines,
                context_lines,
                threads,
                batch_size,
                include_commit_message: if with_commit_message { Some(true) } else { None },
            };
            cli::apply_overrides(&mut loaded, &overrides);
            cli::cmd_extract(
                &frontend,
                loaded,
                &input,
                &output,
                grammar.as_deref(),
                &mut writer,
            )
            .map(|_| ())
        }
        Command::Canonicalize { file, two_pass } => {
            cli::cmd_canonicalize(&frontend, &file, two_pass, &mut writer)
        }
        Command::Diff {
            before,
            after,
            canonical,
        } => cli::cmd_diff(&frontend, loaded, &before, &after, canonical, &mut writer),
        Command::Grammar => cli::cmd_grammar(&frontend, &mut writer),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(e.exit_code());
    }
}
