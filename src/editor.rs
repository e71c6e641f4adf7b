//! Rich-text toolbar state and the adapter it drives.
//!
//! The toolbar never touches the text itself. It sends [`Command`]s to an
//! [`EditorAdapter`] and then re-reads which formats are active at the
//! selection, so button state always reflects what the adapter reports.

use std::collections::BTreeSet;

use crate::error::{GroveError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Format {
    Bold,
    Italic,
    Underline,
    Heading(u8),
    BulletList,
    Quote,
}

impl Format {
    /// Formats the toolbar shows buttons for.
    pub const TOOLBAR: [Format; 7] = [
        Format::Bold,
        Format::Italic,
        Format::Underline,
        Format::Heading(1),
        Format::Heading(2),
        Format::BulletList,
        Format::Quote,
    ];
}

/// Byte range into the document. `start == end` is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Toggle(Format),
    /// Turn the selection into a link to the given URL.
    Link(String),
}

/// What the toolbar currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    pub active: BTreeSet<Format>,
    pub selection: Option<Selection>,
}

impl EditorState {
    pub fn is_active(&self, format: Format) -> bool {
        self.active.contains(&format)
    }
}

/// The editing surface behind the toolbar.
pub trait EditorAdapter {
    fn apply(&mut self, command: &Command) -> Result<()>;
    fn select(&mut self, selection: Selection) -> Result<()>;
    fn selection(&self) -> Option<Selection>;
    fn is_active(&self, format: Format) -> bool;
}

pub struct Toolbar<A: EditorAdapter> {
    adapter: A,
    state: EditorState,
}

impl<A: EditorAdapter> Toolbar<A> {
    pub fn new(adapter: A) -> Self {
        let mut toolbar = Self {
            adapter,
            state: EditorState::default(),
        };
        toolbar.refresh();
        toolbar
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    pub fn select(&mut self, start: usize, end: usize) -> Result<&EditorState> {
        self.adapter.select(Selection::new(start, end))?;
        self.refresh();
        Ok(&self.state)
    }

    pub fn run(&mut self, command: Command) -> Result<&EditorState> {
        self.adapter.apply(&command)?;
        self.refresh();
        Ok(&self.state)
    }

    fn refresh(&mut self) {
        self.state.selection = self.adapter.selection();
        self.state.active = Format::TOOLBAR
            .into_iter()
            .filter(|f| self.adapter.is_active(*f))
            .collect();
    }
}

/// In-memory adapter that formats a Markdown buffer.
#[derive(Debug, Clone, Default)]
pub struct MarkdownAdapter {
    text: String,
    selection: Option<Selection>,
}

impl MarkdownAdapter {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn require_selection(&self) -> Result<Selection> {
        self.selection
            .ok_or_else(|| GroveError::validation("selection", "Place the cursor in the text first"))
    }

    fn line_start(&self, at: usize) -> usize {
        self.text[..at].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn wrapped_in(&self, sel: Selection, open: &str, close: &str) -> bool {
        sel.start >= open.len()
            && self.text[..sel.start].ends_with(open)
            && self.text[sel.end..].starts_with(close)
    }

    fn toggle_inline(&mut self, open: &str, close: &str) -> Result<()> {
        let sel = self.require_selection()?;
        if sel.is_collapsed() {
            return Err(GroveError::validation("selection", "Select some text first"));
        }

        if self.wrapped_in(sel, open, close) {
            self.text.replace_range(sel.end..sel.end + close.len(), "");
            self.text.replace_range(sel.start - open.len()..sel.start, "");
            self.selection = Some(Selection::new(sel.start - open.len(), sel.end - open.len()));
        } else {
            self.text.insert_str(sel.end, close);
            self.text.insert_str(sel.start, open);
            self.selection = Some(Selection::new(sel.start + open.len(), sel.end + open.len()));
        }
        Ok(())
    }

    fn line_prefix(&self, sel: Selection) -> &str {
        let start = self.line_start(sel.start);
        let line = &self.text[start..];
        let line = &line[..line.find('\n').unwrap_or(line.len())];
        let hashes = line.len() - line.trim_start_matches('#').len();
        if hashes > 0 && line[hashes..].starts_with(' ') {
            &line[..hashes + 1]
        } else if line.starts_with("- ") || line.starts_with("> ") {
            &line[..2]
        } else {
            ""
        }
    }

    fn toggle_line(&mut self, prefix: &str) -> Result<()> {
        let sel = self.require_selection()?;
        let start = self.line_start(sel.start);
        let existing = self.line_prefix(sel).to_string();

        self.text.replace_range(start..start + existing.len(), "");
        let mut shift = -(existing.len() as isize);
        if existing != prefix {
            self.text.insert_str(start, prefix);
            shift += prefix.len() as isize;
        }

        let moved = |at: usize| (at as isize + shift).max(start as isize) as usize;
        self.selection = Some(Selection::new(moved(sel.start), moved(sel.end)));
        Ok(())
    }

    fn markers(format: Format) -> Option<(&'static str, &'static str)> {
        match format {
            Format::Bold => Some(("**", "**")),
            Format::Italic => Some(("_", "_")),
            Format::Underline => Some(("<u>", "</u>")),
            _ => None,
        }
    }

    fn prefix(format: Format) -> String {
        match format {
            Format::Heading(level) => format!("{} ", "#".repeat(level.clamp(1, 6) as usize)),
            Format::BulletList => "- ".to_string(),
            Format::Quote => "> ".to_string(),
            _ => String::new(),
        }
    }
}

impl EditorAdapter for MarkdownAdapter {
    fn apply(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::Toggle(format) => match Self::markers(*format) {
                Some((open, close)) => self.toggle_inline(open, close),
                None => self.toggle_line(&Self::prefix(*format)),
            },
            Command::Link(url) => {
                if url.trim().is_empty() {
                    return Err(GroveError::validation("url", "Link URL is required"));
                }
                let sel = self.require_selection()?;
                let label = self.text[sel.start..sel.end].to_string();
                let link = format!("[{}]({})", label, url.trim());
                self.text.replace_range(sel.start..sel.end, &link);
                self.selection = Some(Selection::new(sel.start, sel.start + link.len()));
                Ok(())
            }
        }
    }

    fn select(&mut self, selection: Selection) -> Result<()> {
        if selection.end > self.text.len()
            || !self.text.is_char_boundary(selection.start)
            || !self.text.is_char_boundary(selection.end)
        {
            return Err(GroveError::validation(
                "selection",
                format!("{}..{} is not a valid range", selection.start, selection.end),
            ));
        }
        self.selection = Some(selection);
        Ok(())
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn is_active(&self, format: Format) -> bool {
        let Some(sel) = self.selection else {
            return false;
        };
        match Self::markers(format) {
            Some((open, close)) => !sel.is_collapsed() && self.wrapped_in(sel, open, close),
            None => self.line_prefix(sel) == Self::prefix(format),
        }
    }
}
