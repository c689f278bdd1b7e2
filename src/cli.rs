use clap::Parser;

/// bloxpulse — collect G2 product reviews into a JSON file
#[derive(Parser, Debug, Clone)]
#[command(name = "bloxpulse", version, about)]
pub struct Cli {
    /// RapidAPI key (falls back to the config file, then $RAPID_API_KEY)
    #[arg(long = "api-key", alias = "apikey")]
    pub api_key: Option<String>,

    /// Product to collect (bloxone-ddi, infoblox-nios, bloxone-threat-defense); all when omitted
    #[arg(long)]
    pub product: Option<String>,

    /// Maximum number of reviews to fetch per product
    #[arg(long = "max")]
    pub max_reviews: Option<u32>,

    /// Path of the JSON file to write
    #[arg(long, alias = "scraped")]
    pub output: Option<String>,

    /// Use synthetic reviews instead of calling the API
    #[arg(long)]
    pub mock: bool,

    /// Path to config file (default: bloxpulse.toml, optional)
    #[arg(long)]
    pub config: Option<String>,

    /// Directory for raw API response dumps
    #[arg(long)]
    pub raw_dir: Option<String>,

    /// Do not write raw API responses to disk
    #[arg(long, conflicts_with = "raw_dir")]
    pub no_raw_dump: bool,

    /// Skip fetching and only verify an existing output file
    #[arg(long)]
    pub skip_fetch: bool,
}
