use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use risk_lens::backend::{self, BackendClient, BackendError};
use risk_lens::config::Config;
use risk_lens::record::{apply_assignments, AccountId};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_SERVER: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Decision label and signed bar chart
    Chart,
    /// feature<TAB>score<TAB>value rows for the displayed contributions
    Tsv,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit an applicant record and print the assigned account number
    Submit {
        /// Override a field before submitting (repeatable), e.g. --set age=42
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// Print the JSON body instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Assess an account and show the top feature contributions
    Assess {
        /// Account number returned by `submit`
        account: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Chart)]
        format: OutputFormat,
    },
    /// Show a previously stored assessment by its id
    Explanation {
        id: u64,
    },
    /// Ask the backend to retrain its model if enough assessments exist
    Retrain,
    /// List the applicant fields with their defaults and kinds
    Fields,
    /// Interactively create the config file
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "risk-lens")]
#[command(about = "Submit applicants and inspect explained credit-risk decisions", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/risk-lens/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Without a subcommand the interactive UI starts
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // rustls 0.23+ needs a process-wide provider; Err means one is already set
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_CONFIG } else { EXIT_SUCCESS };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    let config_path = cli.config.map(PathBuf::from);

    // The wizard must work even when the existing config is broken
    if let Some(Commands::Init) = cli.command {
        if let Err(e) = risk_lens::config::init::run_init_wizard(config_path) {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match risk_lens::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(e) = risk_lens::telemetry::init(cli.verbose, config.log_level()) {
        eprintln!("Config error: {}", e);
        std::process::exit(EXIT_CONFIG);
    }

    if let Err(errors) = risk_lens::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    debug!(backend_url = %config.backend_url, "configuration loaded");

    let code = match cli.command {
        Some(Commands::Fields) => run_fields(&config),
        Some(Commands::Submit { set, dry_run }) => match connect(&config) {
            Ok(client) => run_submit(&client, &config, &set, dry_run).await,
            Err(code) => code,
        },
        Some(Commands::Assess { account, format }) => match connect(&config) {
            Ok(client) => run_assess(&client, &account, format).await,
            Err(code) => code,
        },
        Some(Commands::Explanation { id }) => match connect(&config) {
            Ok(client) => run_explanation(&client, id).await,
            Err(code) => code,
        },
        Some(Commands::Retrain) => match connect(&config) {
            Ok(client) => run_retrain(&client).await,
            Err(code) => code,
        },
        Some(Commands::Init) => EXIT_SUCCESS,
        None => match connect(&config) {
            Ok(client) => run_interactive(client, &config).await,
            Err(code) => code,
        },
    };

    std::process::exit(code);
}

fn connect(config: &Config) -> Result<BackendClient, i32> {
    backend::create_client(config).map_err(|e| {
        eprintln!("Config error: {:#}", e);
        EXIT_CONFIG
    })
}

/// Print a failed backend call and map it to an exit code
fn report(context: &str, error: &BackendError) -> i32 {
    eprintln!("{}: {}", context, error);
    if error.is_transport() {
        EXIT_NETWORK
    } else {
        EXIT_SERVER
    }
}

fn run_fields(config: &Config) -> i32 {
    match config.applicant_defaults() {
        Ok(record) => {
            let use_colors = risk_lens::output::should_use_colors();
            println!("{}", risk_lens::output::format_record(&record, use_colors));
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Config error: {}", e);
            EXIT_CONFIG
        }
    }
}

async fn run_submit(client: &BackendClient, config: &Config, assignments: &[String], dry_run: bool) -> i32 {
    let mut record = match config.applicant_defaults() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return EXIT_CONFIG;
        }
    };

    if let Err(e) = apply_assignments(&mut record, assignments) {
        eprintln!("Invalid --set: {}", e);
        return EXIT_CONFIG;
    }

    if dry_run {
        return match serde_json::to_string_pretty(&record) {
            Ok(body) => {
                println!("{}", body);
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to encode record: {}", e);
                EXIT_CONFIG
            }
        };
    }

    let start = Instant::now();
    match backend::submit_record(client, &record).await {
        Ok(submission) => {
            info!(account = %submission.account, elapsed = ?start.elapsed(), "record submitted");
            let use_colors = risk_lens::output::should_use_colors();
            println!("{}", risk_lens::output::format_submission(&submission, use_colors));
            EXIT_SUCCESS
        }
        Err(e) => report("Failed to insert", &e),
    }
}

async fn run_assess(client: &BackendClient, input: &str, format: OutputFormat) -> i32 {
    let account: AccountId = match input.parse() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Invalid account number: {}", e);
            return EXIT_CONFIG;
        }
    };

    match backend::assess(client, account).await {
        Ok(result) => {
            match format {
                OutputFormat::Chart => {
                    let use_colors = risk_lens::output::should_use_colors();
                    println!("{}", risk_lens::output::format_assessment(account, &result, use_colors));
                }
                OutputFormat::Tsv => {
                    let tsv = risk_lens::output::format_tsv(&result.explain());
                    if !tsv.is_empty() {
                        println!("{}", tsv);
                    }
                }
            }
            EXIT_SUCCESS
        }
        Err(e) => report("Error", &e),
    }
}

async fn run_explanation(client: &BackendClient, id: u64) -> i32 {
    match backend::fetch_explanation(client, id).await {
        Ok(stored) => {
            let use_colors = risk_lens::output::should_use_colors();
            println!(
                "{}",
                risk_lens::output::format_stored_assessment(id, &stored, use_colors)
            );
            EXIT_SUCCESS
        }
        Err(e) => report("Error", &e),
    }
}

async fn run_retrain(client: &BackendClient) -> i32 {
    match backend::retrain_if_needed(client).await {
        Ok(message) => {
            println!("{}", message);
            EXIT_SUCCESS
        }
        Err(e) => report("Retrain failed", &e),
    }
}

async fn run_interactive(client: BackendClient, config: &Config) -> i32 {
    let record = match config.applicant_defaults() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return EXIT_CONFIG;
        }
    };

    // Query the terminal background before raw mode takes over
    let theme = risk_lens::tui::resolve_theme(config.theme);
    let label = client.base_url().to_string();
    let app = risk_lens::tui::App::new(record, theme, label);

    match risk_lens::tui::run_tui(app, client).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("TUI error: {:#}", e);
            EXIT_FAILURE
        }
    }
}
