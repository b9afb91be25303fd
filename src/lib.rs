use clap::{Parser, ValueEnum};
use eframe::egui;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod listing;
pub mod paths;
pub mod tree;

pub use listing::{FilePatterns, ImageList};
pub use tree::{filesystem_roots, Children, DirNode, DirectoryTree, TreeEvent};

#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("No directory named {component:?} under {path}")]
    NodeNotFound {
        path: PathBuf,
        component: String,
    },

    #[error("Invalid file pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Failed to resolve path against the current directory: {0}")]
    CurrentDirectory(std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

pub const DEFAULT_IMAGE_PATTERNS: [&str; 3] = ["*.bmp", "*.gif", "*.png"];
const PATH_INPUT_RESERVED_WIDTH: f32 = 48.0;
const TREE_PANEL_WIDTH: f32 = 280.0;

/// What refreshes the file list after navigating to a path.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefreshMode {
    /// The form refreshes the list itself right after navigating.
    Navigate,
    /// The list follows the tree's selection-changed events.
    #[default]
    Selection,
}

#[derive(Parser, Clone, Debug)]
#[command(name = "image-explorer")]
#[command(about = "Browse directories and list the image files they contain")]
pub struct Args {
    #[arg(short, long, help = "Directory or file to open on start-up")]
    pub path: Option<String>,

    #[arg(short, long = "root", help = "Tree root (repeatable, defaults to the filesystem roots)")]
    pub roots: Vec<PathBuf>,

    #[arg(
        short = 'e',
        long = "pattern",
        default_values = DEFAULT_IMAGE_PATTERNS,
        help = "File name pattern to list (repeatable)"
    )]
    pub patterns: Vec<String>,

    #[arg(short = 'm', long, value_enum, default_value_t = RefreshMode::Selection)]
    pub refresh: RefreshMode,

    #[arg(long, help = "Enable debug output")]
    pub debug: bool,
}

pub struct ExplorerApp {
    pub args: Args,
    pub tree: DirectoryTree,
    pub list: ImageList,
    pub patterns: FilePatterns,
    pub path_input: String,
    pub status: Option<String>,
}

impl ExplorerApp {
    pub fn new(args: Args) -> Result<Self> {
        let patterns = FilePatterns::new(args.patterns.as_slice())?;

        let tree = if args.roots.is_empty() {
            DirectoryTree::new()
        } else {
            let roots = args
                .roots
                .iter()
                .map(|root| paths::full_path(root))
                .collect::<Result<Vec<_>>>()?;
            DirectoryTree::with_roots(roots)
        };

        let mut app = Self {
            args,
            tree,
            list: ImageList::new(),
            patterns,
            path_input: String::new(),
            status: None,
        };

        if let Some(path) = app.args.path.clone() {
            app.path_input = path.clone();
            app.navigate(&path);
        }

        Ok(app)
    }

    /// Expand and select the directory for `path` in the tree, then refresh
    /// the list according to the configured [`RefreshMode`]. Failures are
    /// reported in the status line.
    pub fn navigate(&mut self, path: &str) -> bool {
        let selected = match self.tree.select_directory(path) {
            Ok(selected) => selected,
            Err(err) => {
                warn!(path, error = %err, "navigation failed");
                self.status = Some(err.to_string());
                return false;
            }
        };

        info!(path = %selected.display(), "navigated");
        self.status = None;

        let events = self.tree.take_events();
        match self.args.refresh {
            RefreshMode::Navigate => self.refresh_list(),
            RefreshMode::Selection => {
                for event in events {
                    self.on_tree_event(event);
                }
            }
        }
        true
    }

    pub fn on_tree_event(&mut self, event: TreeEvent) {
        match event {
            TreeEvent::SelectionChanged(path) => {
                self.path_input = path.display().to_string();
                self.show_directory(&path);
            }
        }
    }

    pub fn process_tree_events(&mut self) {
        for event in self.tree.take_events() {
            self.on_tree_event(event);
        }
    }

    pub fn refresh_list(&mut self) {
        if let Some(directory) = self.tree.selected_path().map(Path::to_path_buf) {
            self.show_directory(&directory);
        }
    }

    fn show_directory(&mut self, directory: &Path) {
        if self.list.show_list(directory, &self.patterns) {
            self.status = None;
        } else {
            self.status = Some(format!("Directory not found: {}", directory.display()));
        }
    }

    pub fn open_file_dialog(&mut self) {
        let mut dialog = rfd::FileDialog::new().set_title("Open Image");

        let extensions = self.patterns.extensions();
        if !extensions.is_empty() {
            dialog = dialog.add_filter("Images", extensions.as_slice());
        }

        let start = self
            .tree
            .selected_path()
            .map(Path::to_path_buf)
            .or_else(dirs::picture_dir)
            .or_else(dirs::home_dir);
        if let Some(start) = start {
            dialog = dialog.set_directory(start);
        }

        if let Some(path) = dialog.pick_file() {
            let path = path.display().to_string();
            self.path_input = path.clone();
            self.navigate(&path);
        }
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open…").clicked() {
                self.open_file_dialog();
            }

            let response = ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .hint_text("Path")
                    .desired_width(ui.available_width() - PATH_INPUT_RESERVED_WIDTH),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if ui.button("Go").clicked() || submitted {
                let path = self.path_input.trim().to_owned();
                if !path.is_empty() {
                    self.navigate(&path);
                }
            }
        });
    }

    fn render_status(&self, ui: &mut egui::Ui) {
        match (&self.status, self.list.directory()) {
            (Some(message), _) => {
                ui.colored_label(egui::Color32::RED, message.as_str());
            }
            (None, Some(directory)) => match self.list.selected() {
                Some(name) => {
                    ui.label(directory.join(name).display().to_string());
                }
                None => {
                    ui.label(format!("{} ({} files)", directory.display(), self.list.len()));
                }
            },
            (None, None) => {
                ui.label("Select a directory");
            }
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.render_toolbar(ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.render_status(ui));

        egui::SidePanel::left("directory_tree")
            .resizable(true)
            .default_width(TREE_PANEL_WIDTH)
            .show(ctx, |ui| {
                egui::ScrollArea::both()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| self.tree.ui(ui));
            });
        self.process_tree_events();

        egui::CentralPanel::default().show(ctx, |ui| self.list.ui(ui));
    }
}
