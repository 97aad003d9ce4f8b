use log::LevelFilter;
use env_logger::Builder;
use std::io::Write;
use chrono::Local;

/// Crates that log every parsed node at debug level.
const NOISY_MODULES: [&str; 3] = ["html5ever", "selectors", "markup5ever"];

pub fn builder(level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(buf,
                "{} [{}] {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter(None, level);
    for module in NOISY_MODULES {
        builder.filter_module(module, level.min(LevelFilter::Warn));
    }
    // RUST_LOG, when set, overrides the levels above.
    builder.parse_default_env();
    builder
}

/// Installs the global logger; later calls keep the first one.
pub fn init(level: LevelFilter) {
    match builder(level).try_init() {
        Ok(()) => log::debug!("Logger initialized at {}.", level),
        Err(e) => log::debug!("Logger already initialized: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        init(LevelFilter::Debug);
        init(LevelFilter::Info);
        log::info!("still logging");
    }

    #[test]
    fn builder_can_be_built_for_every_level() {
        for level in [LevelFilter::Off, LevelFilter::Warn, LevelFilter::Info, LevelFilter::Trace] {
            let _logger = builder(level).build();
        }
    }
}
