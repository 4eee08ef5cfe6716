use clap::{Parser, Subcommand};
use failover_breaker::alert::model::{AlertPayload, CONDITION_FIRED, CONDITION_RESOLVED};

#[derive(Parser)]
#[command(name = "breaker-cli")]
#[command(about = "Send test alerts to a running failover breaker", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Post a firing alert for a profile
    Fire {
        /// Full resource ID of the Traffic Manager profile
        target_id: String,
    },
    /// Post a resolved alert for a profile (expected to be ignored)
    Resolve { target_id: String },
    /// Check that the breaker is up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Fire { target_id } => {
            client
                .post(format!("{}/api/breaker", base))
                .json(&AlertPayload::new(CONDITION_FIRED, &target_id))
                .send()
                .await?
        }
        Commands::Resolve { target_id } => {
            client
                .post(format!("{}/api/breaker", base))
                .json(&AlertPayload::new(CONDITION_RESOLVED, &target_id))
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{}/healthz", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if status.is_client_error() || status.is_server_error() {
        eprintln!("Error: breaker returned status {}", status);
        if !text.is_empty() {
            eprintln!("{}", text);
        }
        std::process::exit(1);
    }
    println!("{} {}", status.as_u16(), text);
    Ok(())
}
