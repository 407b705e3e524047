//! Structured document types
//!
//! A task description is held in memory as a tree: a sequence of top-level
//! blocks, each holding either child blocks or inline content (text runs and
//! links). Every leaf is a [`TextRun`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index path from the document root to a node.
pub type Path = Vec<usize>;

// ─────────────────────────────────────────────────────────────────────────────
// Heading Level
// ─────────────────────────────────────────────────────────────────────────────

/// Heading level (H1-H6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeadingLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
    H4 = 4,
    H5 = 5,
    H6 = 6,
}

impl HeadingLevel {
    /// Build a level from a number, rejecting anything outside 1..=6.
    pub fn new(level: u8) -> Option<Self> {
        match level {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            4 => Some(HeadingLevel::H4),
            5 => Some(HeadingLevel::H5),
            6 => Some(HeadingLevel::H6),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<u8> for HeadingLevel {
    fn from(level: u8) -> Self {
        HeadingLevel::new(level).unwrap_or(HeadingLevel::H6)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Alignment
// ─────────────────────────────────────────────────────────────────────────────

/// Horizontal text alignment carried by a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
            Align::Justify => "justify",
        }
    }

    /// Parse a CSS `text-align` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" | "end" => Some(Align::Right),
            "justify" => Some(Align::Justify),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Marks
// ─────────────────────────────────────────────────────────────────────────────

/// A single formatting mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Code,
    Strikethrough,
}

impl Mark {
    /// All marks, in the order they nest when serialized to HTML.
    pub const ALL: [Mark; 5] = [
        Mark::Bold,
        Mark::Italic,
        Mark::Underline,
        Mark::Strikethrough,
        Mark::Code,
    ];
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// The set of independent marks applied to a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
}

impl Marks {
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Code => self.code,
            Mark::Strikethrough => self.strikethrough,
        }
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
            Mark::Code => self.code = on,
            Mark::Strikethrough => self.strikethrough = on,
        }
    }

    pub fn with(mut self, mark: Mark) -> Self {
        self.set(mark, true);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Marks::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Runs and Links
// ─────────────────────────────────────────────────────────────────────────────

/// A leaf node: literal text plus its marks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }
}

/// Target of an inline link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkTarget {
    pub href: String,
    pub new_tab: bool,
}

impl LinkTarget {
    pub fn new(href: impl Into<String>, new_tab: bool) -> Self {
        Self {
            href: href.into(),
            new_tab,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Blocks
// ─────────────────────────────────────────────────────────────────────────────

/// The structural type of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(HeadingLevel),
    BulletedList,
    NumberedList,
    ListItem,
    BlockQuote,
    Code,
    /// Inline-level block wrapping text runs
    Link(LinkTarget),
    ChecklistItem { checked: bool },
}

impl BlockKind {
    /// The `type` tag used in the JSON representation.
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading(HeadingLevel::H1) => "heading-1",
            BlockKind::Heading(HeadingLevel::H2) => "heading-2",
            BlockKind::Heading(HeadingLevel::H3) => "heading-3",
            BlockKind::Heading(HeadingLevel::H4) => "heading-4",
            BlockKind::Heading(HeadingLevel::H5) => "heading-5",
            BlockKind::Heading(HeadingLevel::H6) => "heading-6",
            BlockKind::BulletedList => "bulleted-list",
            BlockKind::NumberedList => "numbered-list",
            BlockKind::ListItem => "list-item",
            BlockKind::BlockQuote => "blockquote",
            BlockKind::Code => "code",
            BlockKind::Link(_) => "link",
            BlockKind::ChecklistItem { .. } => "checklist-item",
        }
    }

    /// Lists hold child blocks rather than inline content.
    pub fn is_list(&self) -> bool {
        matches!(self, BlockKind::BulletedList | BlockKind::NumberedList)
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, BlockKind::Link(_))
    }

    /// Blocks whose children are inline content (runs and links).
    pub fn is_text_block(&self) -> bool {
        !self.is_list() && !self.is_inline()
    }

    /// Blocks that may sit directly inside a list.
    pub fn is_list_entry(&self) -> bool {
        matches!(
            self,
            BlockKind::ListItem | BlockKind::ChecklistItem { .. }
        ) || self.is_list()
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A structural node in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub align: Option<Align>,
    pub children: Vec<Node>,
}

impl Block {
    pub fn new(kind: BlockKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            align: None,
            children,
        }
    }

    /// A text block holding a single plain run.
    pub fn with_text(kind: BlockKind, text: impl Into<String>) -> Self {
        Self::new(kind, vec![Node::Text(TextRun::plain(text))])
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::with_text(BlockKind::Paragraph, text)
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    /// Concatenated text of every run below this block.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(run) => out.push_str(&run.text),
            Node::Block(block) => collect_text(&block.children, out),
        }
    }
}

/// Either a block or a text run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Block(Block),
    Text(TextRun),
}

impl Node {
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(block) => Some(block),
            Node::Text(_) => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match self {
            Node::Block(block) => Some(block),
            Node::Text(_) => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        match self {
            Node::Text(_) => true,
            Node::Block(block) => block.kind.is_inline(),
        }
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Node::Block(block)
    }
}

impl From<TextRun> for Node {
    fn from(run: TextRun) -> Self {
        Node::Text(run)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// The in-memory structured document of one task description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Document {
    pub(crate) children: Vec<Node>,
}

/// Rewrite CRLF and lone CR line endings as `\n`.
pub fn unix_line_endings(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_string()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// An empty document: a single empty paragraph.
    pub fn empty() -> Self {
        Self {
            children: vec![Node::Block(Block::paragraph(""))],
        }
    }

    /// A document holding `text` as one paragraph with one plain run.
    /// CRLF and lone CR line endings become `\n`.
    pub fn plain_text(text: &str) -> Self {
        Self {
            children: vec![Node::Block(Block::paragraph(unix_line_endings(text)))],
        }
    }

    /// Build a document from arbitrary nodes, enforcing the tree invariants.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            children: super::normalize::normalize_top_level(nodes),
        }
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self::from_nodes(blocks.into_iter().map(Node::Block).collect())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// Top-level blocks in order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.children.iter().filter_map(Node::as_block)
    }

    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for index in rest {
            node = node.as_block()?.children.get(*index)?;
        }
        Some(node)
    }

    pub fn node_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get_mut(*first)?;
        for index in rest {
            node = node.as_block_mut()?.children.get_mut(*index)?;
        }
        Some(node)
    }

    pub fn block(&self, path: &[usize]) -> Option<&Block> {
        self.node(path).and_then(Node::as_block)
    }

    pub fn block_mut(&mut self, path: &[usize]) -> Option<&mut Block> {
        self.node_mut(path).and_then(Node::as_block_mut)
    }

    /// Children of the node at `parent`; the empty path addresses the root.
    pub fn children_at_mut(&mut self, parent: &[usize]) -> Option<&mut Vec<Node>> {
        if parent.is_empty() {
            return Some(&mut self.children);
        }
        self.block_mut(parent).map(|block| &mut block.children)
    }

    pub fn children_at(&self, parent: &[usize]) -> Option<&[Node]> {
        if parent.is_empty() {
            return Some(&self.children);
        }
        self.block(parent).map(|block| block.children.as_slice())
    }

    /// Paths of every text block, in document order.
    pub fn text_block_paths(&self) -> Vec<Path> {
        let mut paths = Vec::new();
        collect_text_blocks(&self.children, &mut Vec::new(), &mut paths);
        paths
    }

    /// Block types in pre-order, including lists and links.
    pub fn block_kinds(&self) -> Vec<&BlockKind> {
        let mut kinds = Vec::new();
        collect_kinds(&self.children, &mut kinds);
        kinds
    }

    /// Text content of the document, one line per text block.
    pub fn text(&self) -> String {
        self.text_block_paths()
            .iter()
            .filter_map(|path| self.block(path))
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True for the canonical empty document.
    pub fn is_empty(&self) -> bool {
        *self == Document::empty()
    }
}

fn collect_text_blocks(nodes: &[Node], prefix: &mut Path, out: &mut Vec<Path>) {
    for (index, node) in nodes.iter().enumerate() {
        if let Node::Block(block) = node {
            prefix.push(index);
            if block.kind.is_list() {
                collect_text_blocks(&block.children, prefix, out);
            } else if block.kind.is_text_block() {
                out.push(prefix.clone());
            }
            prefix.pop();
        }
    }
}

fn collect_kinds<'a>(nodes: &'a [Node], out: &mut Vec<&'a BlockKind>) {
    for node in nodes {
        if let Node::Block(block) = node {
            out.push(&block.kind);
            collect_kinds(&block.children, out);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
