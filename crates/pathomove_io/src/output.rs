//! Output directory layout, run identifiers and the lookup table.
//!
//! ```text
//! <root>/lookup.csv          filename,clusters,dispersal
//! <root>/trait/<id>.csv      id,gen,x,y,energy,trait
//! <root>/pbsn/<id>.csv       gen,id1,id2,weight
//! <root>/landscape/<id>.csv  x,y
//! ```

use crate::error::{IoError, Result, ResultExt};
use rand::Rng;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const LOOKUP_FILE: &str = "lookup.csv";
pub const LOOKUP_HEADER: &str = "filename,clusters,dispersal";

/// Identifier of one run: milliseconds since the Unix epoch plus a random
/// offset below 10000, so runs started in the same millisecond differ.
pub fn generate_run_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let offset: i64 = rng.gen_range(0..10_000);
    (millis + offset).to_string()
}

/// Opens `path` for appending; the header is written only if the file is
/// new or empty.
pub(crate) fn open_append(path: &Path, header: &str) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context(format!("opening {}", path.display()))?;
    let is_new = file
        .metadata()
        .context(format!("reading metadata of {}", path.display()))?
        .len()
        == 0;
    let mut writer = BufWriter::new(file);
    if is_new {
        writeln!(writer, "{header}")?;
    }
    Ok(writer)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Creates the root and its per-table subdirectories.
    pub fn prepare(&self) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.root.join("trait"),
            self.root.join("pbsn"),
            self.root.join("landscape"),
        ] {
            std::fs::create_dir_all(&dir).context(format!("creating {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn lookup_path(&self) -> PathBuf {
        self.root.join(LOOKUP_FILE)
    }

    pub fn trait_path(&self, run_id: &str) -> PathBuf {
        self.root.join("trait").join(format!("{run_id}.csv"))
    }

    pub fn network_path(&self, run_id: &str) -> PathBuf {
        self.root.join("pbsn").join(format!("{run_id}.csv"))
    }

    pub fn landscape_path(&self, run_id: &str) -> PathBuf {
        self.root.join("landscape").join(format!("{run_id}.csv"))
    }

    /// Appends one row mapping `run_id` to its landscape parameters.
    pub fn append_lookup(&self, run_id: &str, clusters: usize, dispersal: f64) -> Result<()> {
        if run_id.is_empty() || run_id.contains([',', '\n']) {
            return Err(IoError::validation(format!("invalid run id {run_id:?}")));
        }
        let path = self.lookup_path();
        let mut writer = open_append(&path, LOOKUP_HEADER)?;
        writeln!(writer, "{run_id},{clusters},{dispersal}")?;
        writer.flush().context(format!("writing {}", path.display()))
    }
}
