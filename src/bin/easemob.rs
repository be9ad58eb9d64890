use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use easemob_client::config::loader::file_to_config;
use easemob_client::observability::metrics::render_metrics;
use easemob_client::resources::messages::{Envelope, TargetType};
use easemob_client::utils::logging::{self, LogLevel};
use easemob_client::{ApiResult, Call, EasemobClient, Endpoint};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "EASEMOB_CONFIG", default_value = "easemob.yaml")]
    config: PathBuf,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Print prometheus metrics after the command
    #[arg(long)]
    print_metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the bearer header line
    Token {
        #[arg(long)]
        force: bool,
    },
    /// Run any endpoint of the table
    Call {
        endpoint: String,
        /// Path parameter, name=value
        #[arg(short = 'p', long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
        /// Query parameter, name=value
        #[arg(short = 'q', long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
        /// JSON body
        #[arg(long)]
        body: Option<String>,
    },
    /// List endpoint names
    Endpoints,
    UsersPage {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        cursor: Option<String>,
    },
    GroupsPage {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        cursor: Option<String>,
    },
    SendText {
        #[arg(long, default_value = "admin")]
        from: String,
        #[arg(long, value_parser = parse_target_type, default_value = "users")]
        target_type: TargetType,
        #[arg(long, required = true)]
        target: Vec<String>,
        #[arg(long)]
        content: String,
    },
    Download {
        #[arg(long)]
        uuid: String,
        #[arg(long)]
        secret: String,
        #[arg(long)]
        thumbnail: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let client_config = file_to_config(&args.config)
        .await
        .context("failed to load client config")?;
    logging::run(&client_config.settings, args.log_level);

    // -------------------------------
    // 2. Create client
    // -------------------------------

    let client = EasemobClient::new(client_config)?;
    info!("client ready");

    // -------------------------------
    // 3. Run command
    // -------------------------------

    match args.command {
        Command::Token { force } => println!("{}", client.get_token(force).await?),
        Command::Call { endpoint, params, query, body } => {
            let endpoint: Endpoint = endpoint.parse()?;
            let mut call = Call::new(endpoint);
            for (name, value) in &params {
                call = call.param(name, value);
            }
            for (name, value) in &query {
                call = call.query(name, value);
            }
            if let Some(body) = body {
                let body: Value = serde_json::from_str(&body).context("--body is not JSON")?;
                call = call.json(&body)?;
            }
            match client.execute(call).await? {
                ApiResult::Json(value) => print_json(&value)?,
                ApiResult::Raw(bytes) => println!("{} raw bytes", bytes.len()),
            }
        }
        Command::Endpoints => {
            for endpoint in Endpoint::ALL {
                let spec = endpoint.spec();
                println!("{:<28} {:<7} {}", endpoint.name(), spec.verb, spec.path);
            }
        }
        Command::UsersPage { limit, cursor } => {
            print_json(&client.users_page(limit, cursor.as_deref()).await?)?
        }
        Command::GroupsPage { limit, cursor } => {
            print_json(&client.groups_page(limit, cursor.as_deref()).await?)?
        }
        Command::SendText { from, target_type, target, content } => {
            let envelope = Envelope::new(from, target_type, target);
            print_json(&client.send_text(envelope, content).await?)?
        }
        Command::Download { uuid, secret, thumbnail } => {
            let file_name = if thumbnail {
                client.download_thumbnail(&uuid, &secret).await?
            } else {
                client.download_file(&uuid, &secret).await?
            };
            println!("{}", client.download_dir().join(file_name).display());
        }
    }

    if args.print_metrics {
        print!("{}", render_metrics().await);
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_pair(raw: &str) -> Result<(String, String)> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_owned(), value.to_owned()))
        .ok_or_else(|| anyhow!("expected name=value, got '{}'", raw))
}

fn parse_target_type(raw: &str) -> Result<TargetType> {
    match raw {
        "users" => Ok(TargetType::Users),
        "chatgroups" => Ok(TargetType::Chatgroups),
        "chatrooms" => Ok(TargetType::Chatrooms),
        other => Err(anyhow!("unknown target type '{}'", other)),
    }
}
