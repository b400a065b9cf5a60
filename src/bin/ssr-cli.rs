use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "ssr-cli")]
#[command(about = "Operator CLI for the storefront SSR host", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the host is up
    Health,
    /// Show version, environment, uptime and bootstrap state
    Diagnostics,
    /// List the CMS templates the host serves
    Templates,
    /// Print one CMS template
    Template {
        /// Path relative to the template directory
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match &cli.command {
        Commands::Health => client.get(format!("{base}/.spire/health")),
        Commands::Diagnostics => client.get(format!("{base}/.spire/diagnostics")),
        Commands::Templates => client.get(format!("{base}/.spire/content/getTemplatePaths")),
        Commands::Template { path } => client
            .get(format!("{base}/.spire/content/getTemplate"))
            .query(&[("path", path)]),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: host returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
