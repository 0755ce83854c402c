use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "vehicle-api-cli")]
#[command(about = "Command-line client for the vehicle listing API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a monthly payment
    Quote {
        price: f64,
        #[arg(long, default_value_t = 0.0)]
        down_payment: f64,
        #[arg(long, default_value_t = 0.0)]
        trade_in: f64,
        #[arg(long)]
        apr: Option<f64>,
        #[arg(long)]
        term: Option<u32>,
    },
    /// List vehicles, optionally filtered (key=value pairs)
    Vehicles {
        #[arg(value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// Show one vehicle by id or slug
    Vehicle { id: String },
    /// Show the available filter facets
    Filters,
    /// Geocode an address or postcode
    Geocode { address: String },
    /// Test the WordPress connection
    WpTest,
    /// Drop the cached vehicle listings
    ClearCache,
    /// Check a function's health endpoint
    Health {
        #[arg(default_value = "vehicles")]
        function: String,
    },
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Quote {
            price,
            down_payment,
            trade_in,
            apr,
            term,
        } => client
            .post(format!("{base}/api/payments/calculate"))
            .json(&json!({
                "price": price,
                "downPayment": down_payment,
                "tradeIn": trade_in,
                "apr": apr,
                "termMonths": term,
            })),
        Commands::Vehicles { filters } => client
            .get(format!("{base}/api/vehicles"))
            .query(&filters),
        Commands::Vehicle { id } => client.get(format!("{base}/api/vehicles/{id}")),
        Commands::Filters => client.get(format!("{base}/api/vehicles/filters")),
        Commands::Geocode { address } => client
            .get(format!("{base}/api/geocode"))
            .query(&[("q", address)]),
        Commands::WpTest => client.get(format!("{base}/api/wordpress/test")),
        Commands::ClearCache => client.delete(format!("{base}/api/vehicles/cache")),
        Commands::Health { function } => client.get(format!("{base}/api/{function}/health")),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
