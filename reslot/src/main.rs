use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::Parser as ClapParser;
use log::{info, warn};
use reslot::config::ReslotConfig;
use reslot::io::cli::{Cli, Command};
use reslot::io::output::{OptimizeOutput, TestOutput};
use reslot::io::report;
use reslot::session::{Session, test_presets};
use reslot::{EPOCH, io};
use treasure_rs::entities::{Catalog, SortKey, TreasureKind};
use treasure_rs::io::{read_records, write_records};

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let config = match args.config_file {
        None => {
            warn!("[MAIN] No config file provided, use --config-file to provide a custom config");
            ReslotConfig::default()
        }
        Some(config_file) => io::read_config(&config_file)?,
    };

    info!("[MAIN] Successfully parsed ReslotConfig: {config:?}");

    let catalog = io::load_catalog(&config)?;

    match args.command {
        Command::Catalog {
            treasure,
            sort,
            limit,
        } => main_catalog(&catalog, treasure.as_deref(), sort.into(), limit),
        Command::Optimize {
            preset,
            preset_file,
            add,
            strategy,
            output,
            save,
        } => {
            let mut session = Session::new(&catalog, &config);
            if let Some(strategy) = strategy {
                session.set_strategy(strategy.into());
            }
            match (preset, preset_file) {
                (Some(name), _) => session.load_bundled(&name)?,
                (None, Some(path)) => load_preset_file(&mut session, &path)?,
                (None, None) => info!("[MAIN] no preset given, starting from an empty inventory"),
            }
            for (name, qty) in add.iter() {
                session
                    .add(name, *qty)
                    .with_context(|| format!("could not apply {name}={qty}"))?;
            }
            main_optimize(session, config, output.as_deref(), save.as_deref())
        }
        Command::Test { output } => {
            let reports = test_presets(&catalog, &config)?;
            print!("{}", report::preset_reports(&reports));
            if let Some(path) = output {
                let output = TestOutput {
                    presets: reports,
                    config,
                };
                io::write_json(&output, &path)?;
            }
            Ok(())
        }
    }
}

fn main_catalog(
    catalog: &Catalog,
    treasure: Option<&str>,
    key: SortKey,
    limit: Option<usize>,
) -> Result<()> {
    let treasures = match treasure {
        Some(name) => {
            vec![TreasureKind::resolve(name).ok_or_else(|| anyhow!("unknown treasure '{name}'"))?]
        }
        None => TreasureKind::ALL.to_vec(),
    };
    print!("{}", report::catalog_listing(catalog, &treasures, key, limit));
    Ok(())
}

fn load_preset_file(session: &mut Session, path: &Path) -> Result<()> {
    let parsed = read_records(path)?;
    let starting = parsed.to_allocation(session.catalog().model());
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("preset");
    session.load_preset(name, starting);
    Ok(())
}

fn main_optimize(
    mut session: Session,
    config: ReslotConfig,
    output: Option<&Path>,
    save: Option<&Path>,
) -> Result<()> {
    let strategy = session.optimize()?;
    print!("{}", report::session(&session));

    if let Some(path) = save {
        write_records(session.new_list(), path)?;
    }
    if let Some(path) = output {
        let output = OptimizeOutput::new(&session, strategy, config);
        io::write_json(&output, path)?;
    }
    info!("[MAIN] finished in {}ms", EPOCH.elapsed().as_millis());
    Ok(())
}
