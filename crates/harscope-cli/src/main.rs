use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use harscope_cli::OutputFormat;
use harscope_cli::commands::{
    self, EntryFilter, entries::EntriesOptions, filter::FilterOptions, metrics::MetricsOptions,
    timeline::TimelineOptions,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "harscope")]
#[command(author, version)]
#[command(
    about = "Performance analysis for HTTP Archive (HAR) files",
    long_about = "harscope computes page performance metrics from HAR files, draws request \
                  waterfalls, and compares recordings against a baseline."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Host patterns counted as third-party (comma-separated, replaces the built-in list)
    #[arg(
        long,
        global = true,
        env = "HARSCOPE_THIRD_PARTY",
        value_delimiter = ',',
        value_name = "PATTERNS"
    )]
    third_party: Option<Vec<String>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate performance metrics for a HAR file
    Metrics {
        /// Path to the HAR file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of slowest and largest requests to list (0 to hide the breakdown)
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Only include entries whose URL, method or MIME type contains this text
        #[arg(long)]
        search: Option<String>,

        /// Filter by HTTP status code (supports ranges like 2xx, 404, 500-599)
        #[arg(long)]
        status: Option<String>,

        /// Filter by HTTP method (GET, POST, etc.)
        #[arg(long)]
        method: Option<String>,
    },

    /// Draw a request waterfall for a HAR file
    Timeline {
        /// Path to the HAR file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Total output width in columns (defaults to the terminal width)
        #[arg(long)]
        width: Option<usize>,

        /// Maximum number of requests to draw
        #[arg(long)]
        limit: Option<usize>,

        /// Only include entries whose URL, method or MIME type contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// List HAR entries, or show one entry in detail
    Entries {
        /// Path to the HAR file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Show the entry at this position in the file
        #[arg(long)]
        index: Option<usize>,

        /// Only include entries whose URL, method or MIME type contains this text
        #[arg(long, conflicts_with = "index")]
        search: Option<String>,

        /// Filter by HTTP status code (supports ranges like 2xx, 404, 500-599)
        #[arg(long, conflicts_with = "index")]
        status: Option<String>,

        /// Filter by HTTP method (GET, POST, etc.)
        #[arg(long, conflicts_with = "index")]
        method: Option<String>,
    },

    /// Compare HAR files against the first one
    Compare {
        /// HAR files to compare; the first is the baseline
        #[arg(value_name = "FILE", num_args = 2.., required = true)]
        files: Vec<PathBuf>,
    },

    /// Filter HAR entries by various criteria
    Filter {
        /// Path to the HAR file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Filter by host pattern (repeatable, comma-separated, supports globs like *.example.com)
        #[arg(long = "host")]
        hosts: Vec<String>,

        /// Filter by HTTP status code (supports ranges like 2xx, 404, 500-599)
        #[arg(long)]
        status: Option<String>,

        /// Filter by HTTP method (GET, POST, etc.)
        #[arg(long)]
        method: Option<String>,

        /// Filter by content type substring
        #[arg(long)]
        content_type: Option<String>,

        /// Only include entries whose URL, method or MIME type contains this text
        #[arg(long)]
        search: Option<String>,

        /// Output filtered HAR to file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:
    bash, zsh, fish, powershell, elvish

INSTALLATION:
    bash:  harscope completion --shell bash >> ~/.bashrc
    zsh:   harscope completion --shell zsh > ~/.zfunc/_harscope
           (add `fpath=(~/.zfunc $fpath)` to ~/.zshrc)
    fish:  harscope completion --shell fish > ~/.config/fish/completions/harscope.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let third_party = cli.third_party.as_deref();

    match cli.command {
        Commands::Metrics {
            file,
            top,
            search,
            status,
            method,
        } => {
            let options = MetricsOptions {
                top,
                filter: EntryFilter {
                    search,
                    status,
                    method,
                },
                third_party: cli.third_party.clone(),
            };
            commands::metrics::execute(&file, &options, cli.format)
        }
        Commands::Timeline {
            file,
            width,
            limit,
            search,
        } => {
            let options = TimelineOptions {
                width,
                limit,
                filter: EntryFilter {
                    search,
                    ..Default::default()
                },
            };
            commands::timeline::execute(&file, &options, cli.format)
        }
        Commands::Entries {
            file,
            index,
            search,
            status,
            method,
        } => {
            let options = EntriesOptions {
                filter: EntryFilter {
                    search,
                    status,
                    method,
                },
                index,
            };
            commands::entries::execute(&file, &options, cli.format)
        }
        Commands::Compare { files } => commands::compare::execute(&files, third_party, cli.format),
        Commands::Filter {
            file,
            hosts,
            status,
            method,
            content_type,
            search,
            output,
        } => {
            let options = FilterOptions {
                hosts,
                status,
                method,
                content_type,
                search,
                output,
            };
            commands::filter::execute(&file, &options)
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            commands::completion::execute(shell, &mut cmd, &mut std::io::stdout())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("harscope=debug,harscope_cli=debug,harscope_core=debug")
    } else {
        EnvFilter::new("harscope=info,harscope_cli=info,harscope_core=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
