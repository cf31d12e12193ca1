// innbot - ИНН lookup bot and batch command line

mod exit_codes;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use tracing::info;

use innbot_cli::bot::{self, PollOptions};
use innbot_cli::{BatchHandler, TelegramClient, TransportError};
use innbot_config::{process_env, ConfigError, DotEnv, Settings};
use innbot_engine::{EnrichError, Pipeline, PipelineError};
use innbot_io::{FormatError, SheetStyle, WorkDir};
use innbot_lookup::{DadataClient, LookupError};

use exit_codes::{
    EXIT_CONFIG, EXIT_ERROR, EXIT_LOOKUP, EXIT_READ, EXIT_SUCCESS, EXIT_TRANSPORT, EXIT_USAGE,
};
use logging::{init_logging, LogConfig};

#[derive(Parser)]
#[command(name = "innbot")]
#[command(about = "Merge spreadsheets and fill in the ФИО column from the ИНН")]
#[command(version)]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot (long polling)
    #[command(after_help = "\
Examples:
  TOKEN=123:abc DADATA_KEY=... innbot serve
  innbot serve --config /etc/innbot/config.toml -v")]
    Serve {
        /// Config file (default: <config dir>/innbot/config.toml)
        #[arg(long, env = "INNBOT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Merge one or two local files, look up names, write the result
    #[command(after_help = "\
Examples:
  innbot process companies.xlsx -o out.xlsx
  innbot process ids.xlsx details.xlsx -o out.xlsx --merged merged.xlsx")]
    Process {
        /// First spreadsheet (its columns come first)
        first: PathBuf,

        /// Optional second spreadsheet, joined row by row
        second: Option<PathBuf>,

        /// Output file
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Also write the merged table before lookups
        #[arg(long)]
        merged: Option<PathBuf>,

        /// Config file (default: <config dir>/innbot/config.toml)
        #[arg(long, env = "INNBOT_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let serving = matches!(cli.command, Commands::Serve { .. });
    init_logging(&LogConfig::from_verbosity(cli.verbose).with_timestamps(serving));

    let result = match cli.command {
        Commands::Serve { config } => cmd_serve(config),
        Commands::Process {
            first,
            second,
            output,
            merged,
            config,
        } => cmd_process(first, second, output, merged, config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Parse { .. } => Some("see the [telegram], [lookup] and [output] sections".to_string()),
            _ => None,
        };
        Self { code: EXIT_CONFIG, message: err.to_string(), hint }
    }

    pub fn style(err: FormatError) -> Self {
        Self {
            code: EXIT_CONFIG,
            message: err.to_string(),
            hint: Some("check base_row_height and line_height in [output]".to_string()),
        }
    }

    pub fn lookup(err: LookupError) -> Self {
        let hint = match &err {
            LookupError::NotAuthenticated(_) => Some("check DADATA_KEY".to_string()),
            _ => None,
        };
        Self { code: EXIT_LOOKUP, message: err.to_string(), hint }
    }

    pub fn transport(err: TransportError) -> Self {
        let hint = match &err {
            TransportError::Api { code: 401 | 404, .. } => Some("check TOKEN".to_string()),
            _ => None,
        };
        Self { code: EXIT_TRANSPORT, message: err.to_string(), hint }
    }

    pub fn pipeline(err: PipelineError) -> Self {
        let code = match &err {
            PipelineError::Read(_) => EXIT_READ,
            PipelineError::Enrich(EnrichError::Lookup { .. } | EnrichError::LookupShape { .. }) => EXIT_LOOKUP,
            PipelineError::Enrich(_) => EXIT_READ,
            PipelineError::Write(_) => EXIT_ERROR,
        };
        let hint = match &err {
            PipelineError::Enrich(EnrichError::MissingColumn(_)) => {
                Some("the first row must hold column names, one of them ИНН".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

fn sheet_style(settings: &Settings) -> Result<SheetStyle, CliError> {
    let style = SheetStyle {
        base_row_height: settings.output.base_row_height,
        line_height: settings.output.line_height,
    };
    style.validate().map_err(CliError::style)?;
    Ok(style)
}

/// Secret lookup: process environment, then `.env` in the working directory.
type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn load_dotenv() -> Result<DotEnv, CliError> {
    DotEnv::from_cwd().map_err(CliError::config)
}

fn lookup_client(settings: &Settings, env: EnvLookup<'_>) -> Result<DadataClient, CliError> {
    let key = settings.lookup_key(env);
    info!(source = key.source.as_str(), "lookup API key");
    let key = settings
        .require_lookup_key(env)
        .map_err(CliError::config)?;
    DadataClient::with_base_url(key, settings.lookup.api_base.as_str()).map_err(CliError::lookup)
}

// ============================================================================
// serve
// ============================================================================

fn cmd_serve(config: Option<PathBuf>) -> Result<(), CliError> {
    let settings = Settings::load(config.as_deref()).map_err(CliError::config)?;

    let dotenv = load_dotenv()?;
    let env = dotenv.layered(&process_env);

    let token = settings.telegram_token(&env);
    info!(source = token.source.as_str(), "bot token");
    let token = settings
        .require_telegram_token(&env)
        .map_err(CliError::config)?;

    let style = sheet_style(&settings)?;
    let suggester = lookup_client(&settings, &env)?;

    let client = TelegramClient::with_base_url(token, settings.telegram.api_base.as_str())
        .map_err(CliError::transport)?;
    let me = client.get_me().map_err(CliError::transport)?;
    info!(bot = me.username.as_deref().unwrap_or("?"), "connected to bot API");

    let workdir = WorkDir::create(&settings.output.work_dir).map_err(|e| {
        CliError::io(format!(
            "cannot create work directory '{}': {}",
            settings.output.work_dir.display(),
            e
        ))
    })?;

    let handler = BatchHandler::new(client, suggester, workdir)
        .with_send_merged(settings.output.send_merged)
        .with_style(style);

    let options = PollOptions {
        poll_timeout_secs: settings.telegram.poll_timeout_secs,
        settle: Duration::from_millis(settings.telegram.media_group_settle_ms),
    };
    bot::serve(Arc::new(handler), &options).map_err(CliError::transport)
}

// ============================================================================
// process
// ============================================================================

fn require_file(path: &Path) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::args(format!("input file not found: {}", path.display())))
    }
}

fn cmd_process(
    first: PathBuf,
    second: Option<PathBuf>,
    output: PathBuf,
    merged_out: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<(), CliError> {
    require_file(&first)?;
    if let Some(second) = &second {
        require_file(second)?;
    }

    let settings = Settings::load(config.as_deref()).map_err(CliError::config)?;
    let style = sheet_style(&settings)?;
    let dotenv = load_dotenv()?;
    let suggester = lookup_client(&settings, &dotenv.layered(&process_env))?;

    let pipeline = Pipeline::new(&suggester, style);
    let merged = pipeline
        .merge(&first, second.as_deref())
        .map_err(CliError::pipeline)?;

    if let Some(path) = &merged_out {
        let export = pipeline.write_merged(&merged, path).map_err(CliError::pipeline)?;
        println!("merged: {} ({})", path.display(), export.summary());
    }

    let (presented, stats) = pipeline.enrich(&merged).map_err(CliError::pipeline)?;
    let export = pipeline
        .write_presented(&presented, &output)
        .map_err(CliError::pipeline)?;

    println!("output: {} ({})", output.display(), export.summary());
    println!(
        "lookups: {}, named: {}, skipped: {}",
        stats.lookups, stats.named, stats.skipped
    );
    if let Some(err) = &export.style_error {
        eprintln!("warning: styling skipped: {}", err);
    }
    Ok(())
}
