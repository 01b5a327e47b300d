use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use tfq_core::{
    FilterKey, TokenParams, active_filters, from_url, parse_events, parse_query, to_api_query,
    to_query_string, to_url,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Token filter query processor
#[derive(Parser, Debug)]
#[command(name = "tfq", author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a filter query and print the parameters as JSON
    Parse {
        query: String,
        /// Start from empty parameters instead of chainId 1
        #[arg(long)]
        no_default_chain: bool,
        /// Also print the upstream API query string
        #[arg(long)]
        api: bool,
    },
    /// Print the autocomplete events a query produces
    Events { query: String },
    /// Print the canonical query for JSON parameters (FILE or stdin)
    Format { file: Option<String> },
    /// Build a shareable URL from JSON parameters (FILE or stdin)
    Url {
        base_url: String,
        file: Option<String>,
    },
    /// Read parameters back from a shareable URL
    FromUrl { url: String },
    /// List the active filter chips for JSON parameters (FILE or stdin)
    Filters { file: Option<String> },
    /// List filter keys, optionally only those matching SEARCH
    Keys { search: Option<String> },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(file: Option<&str>) -> Result<String, String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).map_err(|e| format!("error reading file '{path}': {e}"))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("error reading stdin: {e}"))?;
            Ok(buffer)
        }
    }
}

fn read_params(file: Option<&str>) -> Result<TokenParams, String> {
    let input = read_input(file)?;
    serde_json::from_str(&input).map_err(|e| format!("error parsing parameters: {e}"))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("error serializing output: {e}"))
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Parse {
            query,
            no_default_chain,
            api,
        } => {
            let seed = if no_default_chain {
                TokenParams::default()
            } else {
                TokenParams::with_default_chain()
            };
            let params = parse_query(&query, seed, &mut ())
                .ok_or_else(|| format!("no filter recognized in '{query}'"))?;
            println!("{}", to_json(&params)?);
            if api {
                println!("{}", to_api_query(&params));
            }
        }
        Command::Events { query } => {
            let (params, events) = parse_events(&query);
            debug!(recognized = params.is_some(), "parsed");
            println!("{}", to_json(&events)?);
        }
        Command::Format { file } => {
            let params = read_params(file.as_deref())?;
            println!("{}", to_query_string(&params));
        }
        Command::Url { base_url, file } => {
            let params = read_params(file.as_deref())?;
            println!("{}", to_url(&params, &base_url));
        }
        Command::FromUrl { url } => {
            let params = from_url(&url).map_err(|e| e.to_string())?;
            println!("{}", to_json(&params)?);
        }
        Command::Filters { file } => {
            let params = read_params(file.as_deref())?;
            println!("{}", to_json(&active_filters(&params))?);
        }
        Command::Keys { search } => {
            let keys = match search.as_deref() {
                Some(search) => tfq_core::vocab::key_suggestions(search),
                None => FilterKey::ALL.to_vec(),
            };
            for key in keys {
                println!(
                    "{:<22} {:<32} e.g. {key}:{}",
                    key.name(),
                    key.description(),
                    key.example()
                );
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tfq: {e}");
            ExitCode::FAILURE
        }
    }
}
