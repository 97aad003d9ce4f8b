pub mod config;
pub mod error;
pub mod logger;
pub mod input_loader;
pub mod lookup;
pub mod resolver;
pub mod property;
pub mod tax_parser;
pub mod fetcher;
pub mod delay_manager;
pub mod pipeline;
pub mod output;

// Exporting types for convenience
pub use config::{Config, Endpoints, OutputFormat};
pub use error::ScrapeError;
pub use fetcher::{Fetch, Fetcher, Request};
pub use input_loader::AddressRecord;
pub use property::{PropertyRecord, TaxEntry};
