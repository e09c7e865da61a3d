use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use zip::ZipArchive;

use crate::scan::ClassSource;

/// Read class entries from a jar, a directory tree, or a single class file.
/// Entries come back sorted by name.
pub fn read_input(path: &Path) -> Result<Vec<ClassSource>> {
    let mut sources = Vec::new();
    if path.is_dir() {
        read_dir(path, path, &mut sources)?;
    } else {
        match extension(path).as_deref() {
            Some("jar") | Some("zip") => read_jar_file(path, &mut sources)?,
            Some("class") => {
                let bytes =
                    fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default();
                sources.push(ClassSource::new(name, bytes));
            }
            _ => anyhow::bail!("unsupported input file: {}", path.display()),
        }
    }
    sources.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(input = %path.display(), entries = sources.len(), "read input");
    Ok(sources)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn read_dir(root: &Path, path: &Path, sources: &mut Vec<ClassSource>) -> Result<()> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path)
        .with_context(|| format!("failed to read directory {}", path.display()))?
    {
        let entry =
            entry.with_context(|| format!("failed to read entry under {}", path.display()))?;
        entries.push(entry.path());
    }
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            read_dir(root, &entry, sources)?;
            continue;
        }
        if extension(&entry).as_deref() != Some("class") {
            continue;
        }
        let relative = entry.strip_prefix(root).unwrap_or(&entry);
        let name = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let bytes =
            fs::read(&entry).with_context(|| format!("failed to read {}", entry.display()))?;
        sources.push(ClassSource::new(name, bytes));
    }
    Ok(())
}

fn read_jar_file(path: &Path, sources: &mut Vec<ClassSource>) -> Result<()> {
    let file =
        fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut archive =
        ZipArchive::new(file).with_context(|| format!("failed to read {}", path.display()))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if entry.is_dir() || !entry.name().ends_with(".class") {
            continue;
        }
        let name = entry.name().to_string();
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to read {}:{}", path.display(), name))?;
        sources.push(ClassSource::new(name, bytes));
    }
    Ok(())
}
