use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::paths::{self, display_name, same_name};
use crate::{ExplorerError, Result};

/// Load state of a directory node's subdirectories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Children {
    /// No subdirectories, or the directory could not be read.
    Leaf,
    /// At least one subdirectory exists but none have been loaded yet.
    Placeholder,
    Loaded(Vec<DirNode>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirNode {
    pub name: String,
    pub path: PathBuf,
    pub children: Children,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    SelectionChanged(PathBuf),
}

/// Every filesystem root the tree starts from: the logical drives on Windows.
#[cfg(windows)]
pub fn filesystem_roots() -> Vec<PathBuf> {
    (b'A'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .filter(|drive| drive.exists())
        .collect()
}

#[cfg(not(windows))]
pub fn filesystem_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("/")]
}

fn subdirectory_walker(path: &Path) -> WalkDir {
    WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
}

fn has_subdirectory(path: &Path) -> bool {
    for entry in subdirectory_walker(path) {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => return true,
            Ok(_) => {}
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read directory");
                // depth 0 means the directory itself is unreadable
                if err.depth() == 0 {
                    return false;
                }
            }
        }
    }
    false
}

impl DirNode {
    /// Create an unexpanded node for `path`, marking it expandable when it has
    /// at least one subdirectory.
    pub fn probe(path: &Path) -> Self {
        let children = if has_subdirectory(path) {
            Children::Placeholder
        } else {
            Children::Leaf
        };

        Self {
            name: display_name(path),
            path: path.to_path_buf(),
            children,
            expanded: false,
        }
    }

    pub fn is_expandable(&self) -> bool {
        match &self.children {
            Children::Leaf => false,
            Children::Placeholder => true,
            Children::Loaded(children) => !children.is_empty(),
        }
    }

    /// Re-read the directory and replace whatever children were there with a
    /// probed node per subdirectory, sorted by name.
    pub fn load_children(&mut self) {
        self.children = Children::Leaf;

        if !self.path.is_dir() {
            debug!(path = %self.path.display(), "directory no longer exists");
            return;
        }

        let mut loaded = Vec::new();
        for entry in subdirectory_walker(&self.path).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => loaded.push(DirNode::probe(entry.path())),
                Ok(_) => {}
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "could not read directory");
                }
            }
        }

        debug!(path = %self.path.display(), count = loaded.len(), "loaded subdirectories");
        if !loaded.is_empty() {
            self.children = Children::Loaded(loaded);
        }
    }

    /// Expanding always reloads, so directories created since the last
    /// expansion show up.
    pub fn expand(&mut self) {
        self.load_children();
        self.expanded = true;
    }

    /// Expand without reloading a node that is already open, so loaded
    /// branches below it keep their state.
    pub fn ensure_expanded(&mut self) {
        if !self.expanded {
            self.expand();
        }
    }

    pub fn collapse(&mut self) {
        self.expanded = false;
    }

    pub fn children(&self) -> &[DirNode] {
        match &self.children {
            Children::Loaded(children) => children,
            _ => &[],
        }
    }

    pub fn child(&self, name: &str) -> Option<&DirNode> {
        self.children().iter().find(|child| same_name(&child.name, name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut DirNode> {
        match &mut self.children {
            Children::Loaded(children) => children.iter_mut().find(|child| same_name(&child.name, name)),
            _ => None,
        }
    }
}

/// Explorer-style directory tree. Subdirectories are only read when a node is
/// expanded; selection changes are queued as [`TreeEvent`]s.
#[derive(Debug, Default)]
pub struct DirectoryTree {
    roots: Vec<DirNode>,
    selected: Option<PathBuf>,
    events: Vec<TreeEvent>,
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self::with_roots(filesystem_roots())
    }

    pub fn with_roots<I>(roots: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut tree = Self::default();
        tree.load_roots(roots);
        tree
    }

    pub fn load_roots<I>(&mut self, roots: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.roots.clear();
        self.selected = None;
        self.roots.extend(roots.into_iter().map(|root| DirNode::probe(&root)));
        debug!(count = self.roots.len(), "loaded tree roots");
    }

    pub fn roots(&self) -> &[DirNode] {
        &self.roots
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    /// Select `path`, queueing a selection-changed event if it differs from
    /// the current selection. Returns whether the selection changed.
    pub fn select(&mut self, path: &Path) -> bool {
        if self.selected.as_deref() == Some(path) {
            return false;
        }
        self.selected = Some(path.to_path_buf());
        self.events.push(TreeEvent::SelectionChanged(path.to_path_buf()));
        true
    }

    pub fn take_events(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Index of the root that contains `target` along with the names leading
    /// from it to `target`. Nested roots resolve to the deepest one.
    fn locate(&self, target: &Path) -> Option<(usize, Vec<String>)> {
        self.roots
            .iter()
            .enumerate()
            .filter_map(|(index, root)| paths::strip_root(target, &root.path).map(|names| (index, names)))
            .min_by_key(|(_, names)| names.len())
    }

    /// Look up the loaded node for `path` without expanding anything.
    pub fn find(&self, path: &Path) -> Option<&DirNode> {
        let (index, names) = self.locate(path)?;
        names
            .iter()
            .try_fold(&self.roots[index], |node, name| node.child(name))
    }

    /// Expand the tree down to the directory holding `path` and select it.
    ///
    /// A file selects its parent directory. The path must exist; otherwise
    /// nothing changes. Nodes expanded before a lookup failure stay expanded.
    pub fn select_directory(&mut self, path: &str) -> Result<PathBuf> {
        let full = paths::full_path(Path::new(path))?;
        if !full.exists() {
            return Err(ExplorerError::PathNotFound(full));
        }

        let target = if full.is_dir() {
            full
        } else {
            full.parent().map(Path::to_path_buf).unwrap_or(full)
        };

        let (index, names) = self.locate(&target).ok_or_else(|| ExplorerError::NodeNotFound {
            path: target.clone(),
            component: target
                .components()
                .next()
                .map(|root| root.as_os_str().to_string_lossy().into_owned())
                .unwrap_or_default(),
        })?;

        let mut node = &mut self.roots[index];
        let mut walked = node.path.clone();
        node.ensure_expanded();

        for name in &names {
            walked.push(name);
            // an open node may predate the directory; re-read it once
            if node.child(name).is_none() && node.expanded {
                node.load_children();
            }
            node = node.child_mut(name).ok_or_else(|| ExplorerError::NodeNotFound {
                path: walked.clone(),
                component: name.clone(),
            })?;
            node.ensure_expanded();
        }

        let selected = node.path.clone();
        self.select(&selected);
        debug!(path = %selected.display(), "selected directory");
        Ok(selected)
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        let mut clicked = None;
        let selected = self.selected.clone();
        for root in &mut self.roots {
            show_node(ui, root, selected.as_deref(), &mut clicked);
        }

        if let Some(path) = clicked {
            self.select(&path);
        }
    }
}

fn show_node(ui: &mut egui::Ui, node: &mut DirNode, selected: Option<&Path>, clicked: &mut Option<PathBuf>) {
    ui.horizontal(|ui| {
        if node.is_expandable() {
            let toggle = if node.expanded { "▼" } else { "▶" };
            if ui.small_button(toggle).clicked() {
                if node.expanded {
                    node.collapse();
                } else {
                    node.expand();
                }
            }
        } else {
            ui.add_space(ui.spacing().interact_size.y);
        }

        let is_selected = selected == Some(node.path.as_path());
        if ui.selectable_label(is_selected, node.name.as_str()).clicked() {
            *clicked = Some(node.path.clone());
        }
    });

    if !node.expanded {
        return;
    }

    let id = node.path.clone();
    if let Children::Loaded(children) = &mut node.children {
        ui.indent(id, |ui| {
            for child in children.iter_mut() {
                show_node(ui, child, selected, clicked);
            }
        });
    }
}
