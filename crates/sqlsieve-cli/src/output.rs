//! Script discovery and document persistence

use anyhow::{Context, Result};
use sqlsieve_core::{OutputConfig, RunReport, StatementCategory};
use sqlsieve_engine::PipelineOutput;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A document written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDocument {
    pub category: StatementCategory,
    pub path: PathBuf,
    pub statements: usize,
    pub blocking: usize,
}

/// Paths written during one invocation
///
/// Two scripts mapping to the same output file is an error rather than a
/// silent overwrite.
#[derive(Debug, Default)]
pub struct OutputTargets {
    claimed: HashSet<PathBuf>,
}

impl OutputTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a path, failing if an earlier script already wrote it
    pub fn claim(&mut self, path: &Path, script: &Path) -> Result<()> {
        if !self.claimed.insert(path.to_path_buf()) {
            anyhow::bail!(
                "Output {} for {} was already written by another script in this run",
                path.display(),
                script.display()
            );
        }
        Ok(())
    }
}

/// Collect the scripts to process
///
/// A file is returned as-is. A directory is walked for `*.<extension>` files,
/// skipping files this tool generated earlier. Results are sorted.
pub fn collect_scripts(path: &Path, naming: &OutputConfig) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!("Input not found: {}", path.display());
    }

    let mut scripts = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let has_extension = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(naming.extension.as_str()));

        if has_extension && !naming.is_generated(&file_name) {
            scripts.push(entry.into_path());
        }
    }

    scripts.sort();
    Ok(scripts)
}

/// Directory receiving the documents of `script`
///
/// Without an output directory, documents land next to the script. With one,
/// the script's location below the walked `root` is mirrored under it.
pub fn output_dir_for(script: &Path, root: &Path, output_dir: Option<&Path>) -> PathBuf {
    let parent = script.parent().unwrap_or_else(|| Path::new(""));

    match output_dir {
        None => parent.to_path_buf(),
        Some(base) => match parent.strip_prefix(root) {
            Ok(relative) => base.join(relative),
            Err(_) => base.to_path_buf(),
        },
    }
}

/// Write every document of a run into `dir`
pub fn write_documents(
    output: &PipelineOutput,
    stem: &str,
    dir: &Path,
    naming: &OutputConfig,
    targets: &mut OutputTargets,
) -> Result<Vec<WrittenDocument>> {
    let script = Path::new(&output.report.source);
    let paths: Vec<PathBuf> = output
        .documents
        .iter()
        .map(|document| dir.join(document.file_name(naming, stem)))
        .collect();
    for path in &paths {
        targets.claim(path, script)?;
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();
    for (document, path) in output.documents.iter().zip(paths) {
        std::fs::write(&path, &document.body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), statements = document.len(), "wrote document");

        written.push(WrittenDocument {
            category: document.category,
            path,
            statements: document.len(),
            blocking: document.blocking_count(),
        });
    }

    Ok(written)
}

/// Write the JSON run report next to the documents
pub fn write_report(
    report: &RunReport,
    stem: &str,
    dir: &Path,
    targets: &mut OutputTargets,
) -> Result<PathBuf> {
    let path = dir.join(format!("{}_REPORT.json", stem));
    targets.claim(&path, Path::new(&report.source))?;
    report
        .save_to_file(&path)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    Ok(path)
}
