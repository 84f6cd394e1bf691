use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Management CLI for the OGC web service relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, env = "OWS_RELAY_ADMIN_KEY", default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check relay status
    Status,
    /// Show the configured allow-list
    AllowList,
    /// Fetch a target URL through the relay
    Fetch {
        /// Full target URL, e.g. "http://202.36.29.39/wms?REQUEST=GetCapabilities"
        target: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::AllowList => {
            let res = client
                .get(format!("{}/admin/allow-list", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Fetch { target } => {
            let res = client
                .get(format!("{}/proxy", cli.url))
                .query(&[("u", target.as_str())])
                .send()
                .await?;
            let status = res.status();
            let content_type = res
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();
            let body = res.text().await?;
            eprintln!("{} ({})", status, content_type);
            println!("{}", body);
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: serde_json::Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
