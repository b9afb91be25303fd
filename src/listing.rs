use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{paths, ExplorerError, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Filename glob patterns such as `*.png`, matched case-insensitively.
#[derive(Debug, Clone)]
pub struct FilePatterns {
    patterns: Vec<Pattern>,
}

impl FilePatterns {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Pattern::new(pattern).map_err(|source| ExplorerError::InvalidPattern {
                    pattern: pattern.to_owned(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(file_name, MATCH_OPTIONS))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Extensions of the plain `*.ext` patterns, for file dialog filters.
    pub fn extensions(&self) -> Vec<String> {
        self.patterns
            .iter()
            .filter_map(|pattern| pattern.as_str().strip_prefix("*."))
            .filter(|ext| !ext.is_empty() && !ext.contains(['*', '?', '[', '.']))
            .map(str::to_owned)
            .collect()
    }
}

/// Names of the regular files directly inside `directory`, sorted. Entries
/// that cannot be read are logged and skipped.
fn file_names(directory: &Path) -> Vec<String> {
    let mut names = Vec::new();
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
            Ok(_) => {}
            Err(err) => {
                warn!(path = %directory.display(), error = %err, "could not list directory");
            }
        }
    }
    names
}

/// List of the file names in one directory that match a set of patterns.
#[derive(Debug, Default)]
pub struct ImageList {
    directory: Option<PathBuf>,
    items: Vec<String>,
    selected: Option<usize>,
}

impl ImageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with the files in `directory` matching `patterns`.
    ///
    /// Names are grouped by pattern in pattern order, so a file matching two
    /// patterns is listed twice. Returns `false`, leaving the list as it was,
    /// when `directory` is not an existing directory.
    pub fn show_list(&mut self, directory: &Path, patterns: &FilePatterns) -> bool {
        let directory = match paths::full_path(directory) {
            Ok(directory) => directory,
            Err(err) => {
                warn!(path = %directory.display(), error = %err, "could not resolve directory");
                return false;
            }
        };
        if !directory.is_dir() {
            debug!(path = %directory.display(), "not a directory");
            return false;
        }

        self.items.clear();
        self.selected = None;

        let names = file_names(&directory);
        for pattern in patterns.iter() {
            self.items.extend(
                names
                    .iter()
                    .filter(|name| pattern.matches_with(name, MATCH_OPTIONS))
                    .cloned(),
            );
        }

        debug!(path = %directory.display(), count = self.items.len(), "listed files");
        self.directory = Some(directory);
        true
    }

    pub fn clear(&mut self) {
        self.directory = None;
        self.items.clear();
        self.selected = None;
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.and_then(|index| self.items.get(index)).map(String::as_str)
    }

    /// Select the item at `index`. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let mut clicked = None;
                for (index, name) in self.items.iter().enumerate() {
                    if ui
                        .selectable_label(self.selected == Some(index), name.as_str())
                        .clicked()
                    {
                        clicked = Some(index);
                    }
                }
                if let Some(index) = clicked {
                    self.select(index);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_skip_complex_patterns() {
        let patterns = FilePatterns::new(&["*.png", "*.tar.gz", "photo*", "*.j?g", "*.BMP"]).unwrap();
        assert_eq!(patterns.extensions(), vec!["png".to_string(), "BMP".to_string()]);
    }
}
