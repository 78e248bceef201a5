use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use webhook_filter::config::{resolve_config, Args};
use webhook_filter::lifecycle::load_rules;
use webhook_filter::routing::{extract_ref, parse_payload, RuleSet};

#[derive(Parser)]
#[command(name = "filter-cli")]
#[command(about = "Test tool for webhook-filter rules", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Mapping rules in JSON format, overriding the config file
    #[arg(long, env = "RULESJSON")]
    rulesjson: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the rules and print them in order
    Validate,
    /// Print the target a payload file would be forwarded to
    Resolve {
        /// Webhook payload (JSON)
        payload: PathBuf,
    },
    /// POST a payload file to a running filter
    Send {
        /// Webhook payload (JSON)
        payload: PathBuf,

        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,

        /// Value for the X-Gogs-Event header
        #[arg(short, long, default_value = "push")]
        event: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate => {
            let rules = rules(&cli.config, &cli.rulesjson)?;
            println!("{} rule(s)", rules.len());
            for (i, rule) in rules.iter().enumerate() {
                println!("{:>3}: {}", i + 1, rule);
            }
        }
        Commands::Resolve { ref payload } => {
            let rules = rules(&cli.config, &cli.rulesjson)?;
            let payload = parse_payload(&fs::read(payload)?)?;
            let git_ref = extract_ref(&payload)?;
            match rules.resolve(git_ref, &payload) {
                Some(target) => println!("{}", target),
                None => {
                    eprintln!("No target for ref {:?}", git_ref);
                    std::process::exit(2);
                }
            }
        }
        Commands::Send { payload, url, event } => {
            let body = fs::read(&payload)?;

            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            headers.insert(
                HeaderName::from_static("x-gogs-event"),
                HeaderValue::from_str(&event)?,
            );

            let res = reqwest::Client::new()
                .post(&url)
                .headers(headers)
                .body(body)
                .send()
                .await?;

            let status = res.status();
            let text = res.text().await?;
            if !status.is_success() {
                eprintln!("Error: filter returned status {}", status);
                eprintln!("Response: {}", text.trim_end());
                std::process::exit(1);
            }
            println!("{}", text.trim_end());
        }
    }

    Ok(())
}

fn rules(config: &Option<PathBuf>, rulesjson: &Option<String>) -> Result<RuleSet, Box<dyn std::error::Error>> {
    let args = Args {
        config: config.clone(),
        rulesjson: rulesjson.clone(),
        ..Default::default()
    };
    let config = resolve_config(&args)?;
    Ok(load_rules(&config)?)
}
