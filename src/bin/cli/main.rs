//! CLI tool for dictionary attacks on password-protected archives.

mod commands;
mod exit_codes;
mod output;
mod progress;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// Dictionary attack on password-protected ZIP and 7z archives
#[derive(Parser)]
#[command(name = "wordcrack")]
#[command(author, version, about = "Dictionary attack on password-protected archives", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(
        long,
        short = 'f',
        value_enum,
        default_value = "human",
        global = true,
        env = "WORDCRACK_FORMAT"
    )]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true, env = "WORDCRACK_QUIET")]
    quiet: bool,

    /// Enable debug logging (RUST_LOG takes precedence per module)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Try every word of a wordlist against an archive (alias: c)
    #[command(alias = "c")]
    Crack {
        /// Password-protected archive
        archive: PathBuf,

        /// Wordlist, one candidate per line
        wordlist: PathBuf,

        /// Verification tools in priority order (default: 7z,unzip)
        #[arg(long = "tool", value_enum, value_delimiter = ',', env = "WORDCRACK_TOOLS")]
        tools: Vec<Tool>,

        /// Minimum milliseconds between progress updates
        #[arg(long, default_value = "1000", env = "WORDCRACK_INTERVAL_MS")]
        interval_ms: u64,

        /// Also update progress every N words (0 = time only)
        #[arg(long, default_value = "1000", env = "WORDCRACK_EVERY")]
        every: u64,

        /// Reject a word at the first tool that says it is wrong
        #[arg(long)]
        short_circuit: bool,

        /// Skip the up-front word count
        #[arg(long)]
        no_count: bool,
    },

    /// Count lines and candidate words in a wordlist
    Count {
        /// Wordlist to count
        wordlist: PathBuf,
    },

    /// Show which verification tools are available on this host
    Probe {
        /// Tools to probe (default: 7z,unzip)
        #[arg(long = "tool", value_enum, value_delimiter = ',')]
        tools: Vec<Tool>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Tool {
    /// 7-Zip (`7z`, `7zz` or `7za`)
    #[value(name = "7z")]
    SevenZip,
    /// Info-ZIP `unzip`
    Unzip,
}

fn init_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Crack {
            archive,
            wordlist,
            tools,
            interval_ms,
            every,
            short_circuit,
            no_count,
        } => commands::crack(&commands::CrackConfig {
            archive_path: &archive,
            wordlist_path: &wordlist,
            tools: &tools,
            interval_ms,
            every,
            short_circuit,
            count: !no_count,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::Count { wordlist } => commands::count(&wordlist, cli.format),

        Commands::Probe { tools } => commands::probe(&tools, cli.format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
