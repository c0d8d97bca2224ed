use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;

use crate::entities::{Allocation, FilledTreasure};

/// `Name/FinalPrice/Ruby/Sapphire/YellowDiamond/Emerald/Alexandrite/RedBeryl`
pub fn record_line(filled: &FilledTreasure) -> String {
    let counts = filled.gems.as_array().iter().join("/");
    format!("{}/{}/{}", filled.treasure, filled.final_price(), counts)
}

/// Writes `allocation` as a record file that can be loaded back as a preset
pub fn write_records(allocation: &Allocation, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not create record file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "# {} treasures, total {}", allocation.len(), allocation.total_price())?;
    for filled in allocation.iter() {
        writeln!(writer, "{}", record_line(filled))?;
    }
    writer.flush()?;

    info!("[EXPORT] {} records written to {}", allocation.len(), path.display());
    Ok(())
}
