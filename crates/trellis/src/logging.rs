//! Logging and debugging facilities.
//!
//! This module provides:
//! - Target and span names for filtering `tracing` output by subsystem
//! - [`PerfSpan`], a guard that times an operation inside an `info` span
//! - [`WidgetTreeDebug`], a text dump of a widget tree
//!
//! # Tracing Integration
//!
//! Trellis never installs a subscriber. To see its logs, install one in
//! your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("trellis::router=debug")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use trellis::logging::{TreeFormatOptions, TreeStyle, WidgetTreeDebug};
//! use trellis::{Rect, WidgetTree};
//!
//! let tree = WidgetTree::new(Rect::from_size(0, 0, 64, 64));
//! let options = TreeFormatOptions {
//!     style: TreeStyle::Ascii,
//!     ..TreeFormatOptions::minimal()
//! };
//! let dump = WidgetTreeDebug::with_options(options).format_tree(&tree);
//! assert_eq!(dump, "(unnamed)\n");
//! ```

use std::fmt::Write as FmtWrite;

use crate::error::{WidgetError, WidgetResult};
use crate::widget::{WidgetId, WidgetTree};

/// Span names used for tracing.
pub mod span_names {
    /// Routing of one window event.
    pub const ROUTE: &str = "trellis::route";
    /// Dirty-region redraw pass.
    pub const REDRAW: &str = "trellis::redraw";
    /// Full-surface draw pass.
    pub const DRAW_ALL: &str = "trellis::draw_all";
}

/// Target names for log filtering.
pub mod targets {
    /// Surface coordinator target.
    pub const SURFACE: &str = "trellis::surface";
    /// Event router target.
    pub const ROUTER: &str = "trellis::router";
    /// Draw walker target.
    pub const DRAW: &str = "trellis::draw";
    /// Widget tree structure target.
    pub const TREE: &str = "trellis::tree";
    /// Performance spans.
    pub const PERF: &str = "trellis::perf";
}

/// Branch drawing style for [`WidgetTreeDebug`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Dashes only, no vertical guides.
    Compact,
}

/// Configuration for widget tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Show widget ids.
    pub show_ids: bool,
    /// Show widget type names.
    pub show_types: bool,
    /// Show parent-relative rectangles and hidden flags.
    pub show_geometry: bool,
    /// Maximum depth to descend (None for unlimited).
    pub max_depth: Option<usize>,
    /// Width of each indentation level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_types: true,
            show_geometry: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Everything on.
    pub fn detailed() -> Self {
        Self {
            show_geometry: true,
            ..Default::default()
        }
    }

    /// Names only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_types: false,
            show_geometry: false,
            ..Default::default()
        }
    }
}

/// Renders a [`WidgetTree`] as indented text, one widget per line.
#[derive(Debug, Clone, Default)]
pub struct WidgetTreeDebug {
    options: TreeFormatOptions,
}

impl WidgetTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole tree from its root.
    pub fn format_tree(&self, tree: &WidgetTree) -> String {
        let mut output = String::new();
        self.format_into(tree, tree.root(), &mut Vec::new(), &mut output);
        output
    }

    /// Format the subtree below `id`.
    pub fn format_subtree(&self, tree: &WidgetTree, id: WidgetId) -> WidgetResult<String> {
        if !tree.contains(id) {
            return Err(WidgetError::InvalidWidget);
        }
        let mut output = String::new();
        self.format_into(tree, id, &mut Vec::new(), &mut output);
        Ok(output)
    }

    /// `lasts` holds, per ancestor level below the subtree root, whether
    /// that ancestor was the last of its siblings.
    fn format_into(&self, tree: &WidgetTree, id: WidgetId, lasts: &mut Vec<bool>, output: &mut String) {
        if self.options.max_depth.is_some_and(|max| lasts.len() > max) {
            return;
        }

        output.push_str(&self.build_prefix(lasts));
        let name = tree.name(id).unwrap_or_default();
        output.push_str(if name.is_empty() { "(unnamed)" } else { name });

        if self.options.show_ids {
            let _ = write!(output, " [{:?}]", id);
        }
        if self.options.show_types {
            if let Some(widget) = tree.widget(id) {
                let type_name = widget.type_name();
                let short = type_name.rsplit("::").next().unwrap_or(type_name);
                let _ = write!(output, " ({short})");
            }
        }
        if self.options.show_geometry {
            if let Some(r) = tree.rect(id) {
                let _ = write!(
                    output,
                    " @ ({}, {}) {}x{}",
                    r.left,
                    r.top,
                    r.width().max(0),
                    r.height().max(0)
                );
            }
            if !tree.is_visible(id) {
                output.push_str(" hidden");
            }
        }
        output.push('\n');

        let children = tree.children(id);
        for (i, &child) in children.iter().enumerate() {
            lasts.push(i + 1 == children.len());
            self.format_into(tree, child, lasts, output);
            lasts.pop();
        }
    }

    fn build_prefix(&self, lasts: &[bool]) -> String {
        let Some((&is_last, ancestors)) = lasts.split_last() else {
            return String::new();
        };

        let (guide, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };
        let pad = " ".repeat(self.options.indent_size);

        let mut prefix = String::new();
        for &ancestor_last in ancestors {
            if ancestor_last || guide.is_empty() {
                prefix.push(' ');
            } else {
                prefix.push_str(guide);
            }
            prefix.push_str(&pad);
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps an `info` span entered until dropped.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a span named `name` under the [`targets::PERF`] target.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
