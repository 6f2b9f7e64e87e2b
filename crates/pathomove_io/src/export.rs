//! CSV writers for trait trajectories, proximity networks and landscapes.

use crate::error::{Result, ResultExt};
use crate::output::{generate_run_id, open_append, OutputLayout};
use pathomove_core::{GenerationObserver, GenerationView, SimConfig};
use pathomove_data::{EdgeRecord, ItemRecord, TraitRecord};
use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const TRAIT_HEADER: &str = "id,gen,x,y,energy,trait";
pub const NETWORK_HEADER: &str = "gen,id1,id2,weight";
pub const LANDSCAPE_HEADER: &str = "x,y";

/// Appends trait rows to `path`, writing the header only when the file is
/// created.
pub fn append_traits(path: &Path, records: &[TraitRecord]) -> Result<()> {
    let mut writer = open_append(path, TRAIT_HEADER)?;
    for r in records {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            r.id, r.gen, r.x, r.y, r.energy, r.trait_value
        )?;
    }
    writer.flush().context(format!("writing {}", path.display()))
}

pub fn append_edges(path: &Path, edges: &[EdgeRecord]) -> Result<()> {
    let mut writer = open_append(path, NETWORK_HEADER)?;
    for e in edges {
        writeln!(writer, "{},{},{},{}", e.gen, e.id1, e.id2, e.weight)?;
    }
    writer.flush().context(format!("writing {}", path.display()))
}

/// Writes item coordinates to `path`, replacing any existing file.
pub fn write_landscape(path: &Path, items: &[ItemRecord]) -> Result<()> {
    let file = File::create(path).context(format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{LANDSCAPE_HEADER}")?;
    for item in items {
        writeln!(writer, "{},{}", item.x, item.y)?;
    }
    writer.flush().context(format!("writing {}", path.display()))
}

/// Observer that exports every recorded generation of a run.
///
/// Trait and network rows are appended for generations on the record
/// interval and for the final generation. The landscape is written once,
/// from the first generation seen.
pub struct CsvExporter {
    layout: OutputLayout,
    run_id: String,
    record_interval: usize,
    landscape_written: bool,
}

impl CsvExporter {
    /// Prepares the layout, draws a run id and registers it in the lookup
    /// table.
    pub fn create<R: Rng + ?Sized>(
        layout: OutputLayout,
        config: &SimConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let run_id = generate_run_id(rng);
        Self::with_run_id(layout, config, run_id)
    }

    pub fn with_run_id(layout: OutputLayout, config: &SimConfig, run_id: String) -> Result<Self> {
        layout.prepare()?;
        layout.append_lookup(
            &run_id,
            config.landscape.cluster_count,
            config.landscape.cluster_spread,
        )?;
        tracing::info!(run_id = %run_id, root = %layout.root().display(), "Exporting run");
        Ok(Self {
            layout,
            run_id,
            record_interval: config.run.record_interval.max(1),
            landscape_written: false,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }
}

impl GenerationObserver for CsvExporter {
    fn on_generation_end(&mut self, view: &GenerationView<'_>) -> anyhow::Result<()> {
        if !self.landscape_written {
            write_landscape(&self.layout.landscape_path(&self.run_id), &view.field.records())?;
            self.landscape_written = true;
        }
        if view.gen % self.record_interval == 0 || view.is_final {
            append_traits(
                &self.layout.trait_path(&self.run_id),
                &view.population.trait_records(view.gen),
            )?;
            append_edges(
                &self.layout.network_path(&self.run_id),
                &view.network.edge_records(view.gen),
            )?;
            tracing::debug!(gen = view.gen, run_id = %self.run_id, "Exported generation");
        }
        Ok(())
    }
}
