//! Serde-backed document model: runs, paragraphs, tables, sections
//!
//! The engine owns this lightweight representation; parsing a real binary
//! container into it (and back) is the concern of an external document
//! library. The JSON serialization of [`Document`] doubles as the template
//! file format the host reads and writes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default rendered-asset width, 1.2 inches in EMU
pub const DEFAULT_ASSET_WIDTH_EMU: u64 = 1_097_280;
/// Default rendered-asset height, 0.4 inches in EMU
pub const DEFAULT_ASSET_HEIGHT_EMU: u64 = 365_760;

/// Rendered asset payload carried by an appended run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssetImage {
    /// Encoded image bytes, opaque to the engine
    pub bytes: Vec<u8>,
    /// Display width in EMU
    pub width_emu: u64,
    /// Display height in EMU
    pub height_emu: u64,
}

impl AssetImage {
    /// Wrap image bytes with the default display size.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            width_emu: DEFAULT_ASSET_WIDTH_EMU,
            height_emu: DEFAULT_ASSET_HEIGHT_EMU,
        }
    }
}

/// Contiguous span of paragraph text sharing one formatting style.
///
/// The style map is opaque: the engine mutates `text` only, and never
/// reorders, drops, or rewrites styles.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Run {
    /// Run text
    #[serde(default)]
    pub text: String,
    /// Opaque formatting attributes, owned by the paragraph
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub style: Map<String, Value>,
    /// Rendered asset attached to this run, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<AssetImage>,
}

impl Run {
    /// Create an unstyled text run
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Map::new(),
            image: None,
        }
    }

    /// Create a styled text run
    pub fn styled(text: impl Into<String>, style: Map<String, Value>) -> Self {
        Self {
            text: text.into(),
            style,
            image: None,
        }
    }
}

/// Ordered sequence of runs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Paragraph {
    /// Runs in document order
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Build a paragraph from run texts, one unstyled run per piece
    pub fn from_texts<I, S>(pieces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            runs: pieces.into_iter().map(Run::text).collect(),
        }
    }

    /// Full paragraph text: the in-order concatenation of run texts
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.runs.iter().map(|r| r.text.len()).sum());
        for run in &self.runs {
            out.push_str(&run.text);
        }
        out
    }

    /// Append an unstyled text run at the end of the paragraph
    pub fn append_text_run(&mut self, text: impl Into<String>) {
        self.runs.push(Run::text(text));
    }

    /// Append a run carrying a rendered asset at the end of the paragraph
    pub fn append_image_run(&mut self, image: AssetImage) {
        self.runs.push(Run {
            text: String::new(),
            style: Map::new(),
            image: Some(image),
        });
    }
}

/// Single table cell
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cell {
    /// Cell paragraphs in order
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

impl Cell {
    /// Combined cell text, paragraphs joined with a newline
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace the whole cell content with a single unstyled run.
    ///
    /// This mirrors the document libraries' whole-cell text setters:
    /// existing per-run formatting inside the cell is not preserved.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.paragraphs = vec![Paragraph {
            runs: vec![Run::text(text)],
        }];
    }
}

/// Table row
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Row {
    /// Cells in order
    #[serde(default)]
    pub cells: Vec<Cell>,
}

/// Table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Table {
    /// Rows in order
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// Document section carrying header and footer paragraphs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Section {
    /// Header paragraphs
    #[serde(default)]
    pub header: Vec<Paragraph>,
    /// Footer paragraphs
    #[serde(default)]
    pub footer: Vec<Paragraph>,
}

/// Whole document: body paragraphs, tables, and sections
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Body paragraphs in document order
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    /// Tables in document order
    #[serde(default)]
    pub tables: Vec<Table>,
    /// Sections in document order
    #[serde(default)]
    pub sections: Vec<Section>,
}
