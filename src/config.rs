use std::path::PathBuf;
use std::time::Duration;
use clap::{Parser, ValueEnum};
use log::LevelFilter;

pub const PA_SERVICE_URL: &str = "https://www.miamidade.gov/Apps/PA/PApublicServiceProxy/PaServicesProxy.ashx";
pub const TAX_SITE_URL: &str = "https://miamidade.county-taxes.com";

pub const DEFAULT_INPUT: &str = "input.csv";
pub const DEFAULT_OUTPUT: &str = "miamidade.json";

/// Result window requested from the address search.
pub const SEARCH_FROM: u32 = 1;
pub const SEARCH_TO: u32 = 200;

/// Tax history is capped at this many entries per property.
pub const MAX_TAX_ENTRIES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty JSON array of nested records
    Json,
    /// JSON array of flattened records (`tax_1_bill`, `owners_2`, ...)
    FlatJson,
    /// Flattened records as CSV
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "property_scraper", version, about = "Scrape Miami-Dade property and tax records for a list of addresses")]
pub struct Args {
    /// Address table with NUMBER, PREDIR, STNAME, STSUFFIX columns (.csv, .xlsx, .xls)
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Output file; overwritten on every run
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Proxy used for requests that need automatic unblocking (tax site)
    #[arg(long, env = "PROPERTY_SCRAPER_UNBLOCK_PROXY")]
    pub unblock_proxy: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Minimum delay between addresses in seconds
    #[arg(long, default_value_t = 0)]
    pub min_delay: u64,

    /// Maximum delay between addresses in seconds
    #[arg(long, default_value_t = 0)]
    pub max_delay: u64,

    #[arg(short, long)]
    pub verbose: bool,
}

/// Base URLs of the property-appraiser service and the tax site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub pa_service: String,
    pub tax_site: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            pa_service: PA_SERVICE_URL.to_string(),
            tax_site: TAX_SITE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub endpoints: Endpoints,
    pub unblock_proxy: Option<String>,
    pub timeout: Duration,
    pub delay: (u64, u64),
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: OutputFormat::Json,
            endpoints: Endpoints::default(),
            unblock_proxy: None,
            timeout: Duration::from_secs(30),
            delay: (0, 0),
            log_level: LevelFilter::Info,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let min = args.min_delay.min(args.max_delay);
        let max = args.min_delay.max(args.max_delay);
        Config {
            input: args.input,
            output: args.output,
            format: args.format,
            endpoints: Endpoints::default(),
            unblock_proxy: args.unblock_proxy.filter(|p| !p.trim().is_empty()),
            timeout: Duration::from_secs(args.timeout),
            delay: (min, max),
            log_level: if args.verbose { LevelFilter::Debug } else { LevelFilter::Info },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_input_csv_and_json_output() {
        let args = Args::parse_from(["property_scraper"]);
        let config = Config::from(args);
        assert_eq!(config.input, PathBuf::from("input.csv"));
        assert_eq!(config.output, PathBuf::from("miamidade.json"));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.delay, (0, 0));
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn swapped_delay_bounds_are_ordered() {
        let args = Args::parse_from(["property_scraper", "--min-delay", "9", "--max-delay", "2", "-v", "--format", "csv"]);
        let config = Config::from(args);
        assert_eq!(config.delay, (2, 9));
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.log_level, LevelFilter::Debug);
    }
}
