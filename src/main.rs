use property_scraper_lib::{config, input_loader, logger, output, pipeline};
use property_scraper_lib::{Config, Fetcher};

use std::error::Error;
use clap::Parser;
use log::{info, error};

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from(config::Args::parse());
    logger::init(config.log_level);
    info!("Starting Miami-Dade property scraper...");

    // 1. Load addresses; a missing input file aborts the run
    let records = match input_loader::load_records(&config.input) {
        Ok(records) => records,
        Err(e) => {
            error!("{}. Expected headers: NUMBER, PREDIR, STNAME, STSUFFIX", e);
            return Err(e.into());
        }
    };

    // 2. Resolve, build and enrich every address
    let fetcher = Fetcher::new(&config)?;
    let properties = pipeline::run(&fetcher, &records, &config);

    // 3. Write the output, replacing any previous run
    output::write_records(&config.output, config.format, &properties)?;

    info!("Done. {} records written to {:?}.", properties.len(), config.output);
    Ok(())
}
