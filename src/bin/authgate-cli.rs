use std::io::BufRead;

use clap::{Parser, Subcommand};
use serde_json::Value;

use authgate::auth::{format_entry, PasswordHash};

#[derive(Parser)]
#[command(name = "authgate-cli")]
#[command(about = "Operator CLI for the authgate edge proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Username for Basic Authentication.
    #[arg(long)]
    user: Option<String>,

    /// Secret for Basic Authentication.
    #[arg(long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a credential file line for USERNAME (secret read from stdin if not given)
    HashPassword {
        username: String,
        #[arg(long)]
        secret: Option<String>,
    },
    /// Call the unauthenticated health endpoint
    Health,
    /// Call the greeting endpoint
    Home,
    /// Call the application info endpoint
    Info,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let path = match cli.command {
        Commands::HashPassword { username, secret } => {
            let secret = match secret {
                Some(secret) => secret,
                None => read_secret()?,
            };
            let line = format_entry(&username, &PasswordHash::generate(&secret))?;
            println!("{line}");
            return Ok(());
        }
        Commands::Health => "/health",
        Commands::Home => "/",
        Commands::Info => "/api/info",
    };

    let client = reqwest::Client::new();
    let mut request = client.get(format!("{}{}", cli.url.trim_end_matches('/'), path));
    if let Some(user) = cli.user {
        request = request.basic_auth(user, cli.password);
    }

    print_response(request.send().await?).await
}

fn read_secret() -> Result<String, std::io::Error> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let secret = line.trim_end_matches(['\r', '\n']).to_string();
    if secret.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty secret on stdin",
        ));
    }
    Ok(secret)
}

/// Non-success answer from the proxy, surfaced as the process exit status.
#[derive(Debug, thiserror::Error)]
#[error("proxy returned status {status}: {body}")]
struct StatusError {
    status: reqwest::StatusCode,
    body: String,
}

fn ensure_success(status: reqwest::StatusCode, body: String) -> Result<String, StatusError> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(StatusError { status, body })
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Some(challenge) = res.headers().get(reqwest::header::WWW_AUTHENTICATE) {
        eprintln!("Challenge: {}", challenge.to_str().unwrap_or("<binary>"));
    }
    let body = ensure_success(status, res.text().await?)?;

    let json: Value = serde_json::from_str(&body)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
