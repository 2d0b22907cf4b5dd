use anyhow::Context;
use clap::{Parser, Subcommand};
use overdose_sentinel::analytics::AnalyticsEngine;
use overdose_sentinel::ingest::parse_incidents;
use reqwest::Client;

#[derive(Parser)]
#[command(name = "ods-cli")]
#[command(about = "Overdose Sentinel CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a local CSV file offline and print the result
    Analyze {
        #[arg(value_name = "FILE")]
        file: String,

        /// Print the full snapshot as JSON instead of a summary
        #[arg(short, long)]
        json: bool,
    },

    /// Upload a CSV file to a running server
    Upload {
        #[arg(short, long)]
        user: String,

        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Fetch the latest analysis snapshot for a user
    Analysis {
        #[arg(short, long)]
        user: String,
    },

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Analyze { file, json } => {
            let data = std::fs::read(&file).with_context(|| format!("reading {}", file))?;
            let incidents = parse_incidents(&data, chrono::Utc::now())
                .map_err(|e| anyhow::anyhow!("validation failed: {}", e))?;

            let engine = AnalyticsEngine::with_defaults();
            let result = engine.analyze(&incidents);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Incidents analyzed: {}", result.total_incidents);
                println!("Last 7 days:        {}", result.total_last_7_days);
                println!(
                    "Week-over-week:     {:+.1}%",
                    result.percent_change_last_7_days
                );
                println!(
                    "County baseline:    {:.2}/day (stddev {:.2})",
                    result.county_rolling_28_day_mean, result.county_rolling_28_day_std_dev
                );
                println!("Areas:");
                for area in &result.area_analyses {
                    println!(
                        "  {}  {:>8}  7d avg {:>5.2}  z {:>5.2}  ({} total)",
                        area.area_code,
                        area.severity.to_string(),
                        area.current_7_day_avg,
                        area.std_devs_from_mean,
                        area.total_incidents
                    );
                }
            }
        }

        Commands::Upload { user, file } => {
            let data =
                std::fs::read_to_string(&file).with_context(|| format!("reading {}", file))?;

            let response = client
                .post(format!(
                    "{}/v1/users/{}/incidents/upload",
                    cli.endpoint, user
                ))
                .header("Content-Type", "text/csv")
                .body(data)
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Analysis { user } => {
            let response = client
                .get(format!("{}/v1/users/{}/analysis", cli.endpoint, user))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
