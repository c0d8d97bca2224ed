use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result, ensure};
use log::{LevelFilter, info};
use serde::Serialize;
use treasure_rs::entities::Catalog;
use treasure_rs::io::read_records;
use treasure_rs::pricing::PriceModel;

use crate::EPOCH;
use crate::config::ReslotConfig;

pub mod cli;
pub mod output;
pub mod report;

pub fn read_config(path: &Path) -> Result<ReslotConfig> {
    let file = File::open(path)
        .with_context(|| format!("could not open config file: {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).context("incorrect config file format")
}

/// Builds the catalog described by `config`: read from its combinations file if one is set,
/// enumerated otherwise.
pub fn load_catalog(config: &ReslotConfig) -> Result<Catalog> {
    let model = PriceModel::new(&config.prices);
    let catalog = match &config.combinations_file {
        Some(path) => {
            let catalog = read_records(path)?.to_catalog(model, config.capacity_policy);
            ensure!(
                !catalog.is_empty(),
                "no usable combinations in {}",
                path.display()
            );
            catalog
        }
        None => Catalog::enumerate(model),
    };
    Ok(catalog)
}

pub fn write_json(value: &impl Serialize, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not open output file: {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)
        .with_context(|| format!("could not write output file: {}", path.display()))?;

    info!("[IO] output written to {}", path.display());
    Ok(())
}

pub fn init_logger(level_filter: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        // Perform allocation-free log formatting
        .format(|out, message, record| {
            let handle = std::thread::current();
            let thread_name = handle.name().unwrap_or("-");

            let duration = EPOCH.elapsed();
            let sec = duration.as_secs() % 60;
            let min = (duration.as_secs() / 60) % 60;
            let hours = (duration.as_secs() / 60) / 60;

            let prefix = format!(
                "[{}] [{:0>2}:{:0>2}:{:0>2}] <{}>",
                record.level(),
                hours,
                min,
                sec,
                thread_name,
            );

            out.finish(format_args!("{:<27}{}", prefix, message))
        })
        .level(level_filter)
        .chain(std::io::stdout())
        .apply()?;
    info!("[MAIN] time: {}", jiff::Timestamp::now().round(jiff::Unit::Second)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_combinations_file_is_an_error() {
        let config = ReslotConfig {
            combinations_file: Some(PathBuf::from("does/not/exist.txt")),
            ..ReslotConfig::default()
        };
        assert!(load_catalog(&config).is_err());
    }

    #[test]
    fn default_config_enumerates() {
        let catalog = load_catalog(&ReslotConfig::default()).unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.violations().is_empty());
    }
}
