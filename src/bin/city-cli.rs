use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "city-cli")]
#[command(about = "Command-line client for the city API", long_about = None)]
struct Cli {
    #[arg(short, long, env = "CITY_API_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Access token from `city-cli login`.
    #[arg(short, long, env = "CITY_API_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange credentials for an access token
    Login {
        username: String,
        #[arg(short, long, env = "CITY_API_PASSWORD")]
        password: String,
    },
    /// List every city
    List,
    /// Show one city by name
    Get { name: String },
    /// Search cities by field
    Search {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        country_code: Option<String>,
        #[arg(long)]
        district: Option<String>,
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    }

    let res = match cli.command {
        Commands::Login { username, password } => {
            client
                .post(format!("{}/v1/auth/login", cli.url))
                .json(&json!({ "username": username, "password": password }))
                .send()
                .await?
        }
        Commands::List => client.get(format!("{}/", cli.url)).send().await?,
        Commands::Get { name } => {
            client
                .get(city_url(&cli.url, &name)?)
                .headers(headers)
                .send()
                .await?
        }
        Commands::Search {
            name,
            country_code,
            district,
            limit,
        } => {
            let mut filter = Map::new();
            for (key, value) in [("name", name), ("country_code", country_code), ("district", district)] {
                if let Some(value) = value {
                    filter.insert(key.to_string(), Value::String(value));
                }
            }
            filter.insert("limit".to_string(), json!(limit));
            client
                .post(format!("{}/v1/city/search", cli.url))
                .headers(headers)
                .json(&Value::Object(filter))
                .send()
                .await?
        }
    };

    print_response(res).await
}

/// `{base}/v1/city/{name}` with `name` encoded as a single path segment.
fn city_url(base: &str, name: &str) -> Result<reqwest::Url, Box<dyn std::error::Error>> {
    let mut url = reqwest::Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("{base} cannot be used as a base URL"))?
        .pop_if_empty()
        .extend(["v1", "city", name]);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

    if !status.is_success() {
        eprintln!("Error: API returned status {status}");
        eprintln!("{}", serde_json::to_string_pretty(&body)?);
        std::process::exit(1);
    }

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
