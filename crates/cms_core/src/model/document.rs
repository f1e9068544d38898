//! Rich-text document tree.
//!
//! # Responsibility
//! - Define the legal node shapes of an article body (blocks, links, text).
//! - Provide the `validate` predicate consumed by normalization and tests.
//! - Own the JSON wire shape used for storage and host hand-off.
//!
//! # Invariants
//! - A document is never an empty sequence of blocks.
//! - Every block has at least one child.
//! - Lists hold only list items; list items hold inline runs only.
//! - Code blocks hold plain, unmarked text runs.
//! - Only paragraph, headings and block quotes carry `align`.
//! - Link urls are stored verbatim; sanitization belongs to rendering.
//!
//! # See also
//! - crate::editor::normalize

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One character-level formatting flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Code,
}

impl Mark {
    /// All marks in rendering order, innermost first.
    pub const ALL: [Mark; 4] = [Mark::Code, Mark::Bold, Mark::Italic, Mark::Underline];

    /// Stable lowercase name, matching the JSON field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Code => "code",
        }
    }
}

/// Independent boolean marks carried by a text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Marks {
    pub fn get(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Code => self.code,
        }
    }

    pub fn set(&mut self, mark: Mark, enabled: bool) {
        match mark {
            Mark::Bold => self.bold = enabled,
            Mark::Italic => self.italic = enabled,
            Mark::Underline => self.underline = enabled,
            Mark::Code => self.code = enabled,
        }
    }

    /// Returns a copy with `mark` set to `enabled`.
    pub fn with(mut self, mark: Mark, enabled: bool) -> Self {
        self.set(mark, enabled);
        self
    }

    /// Returns whether no mark is set.
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// Text leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    pub text: String,
    pub marks: Marks,
}

impl Text {
    /// Creates an unmarked run.
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

    /// Length in chars (Unicode scalar values).
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Inline hyperlink element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    /// Free-form url as typed by the author.
    pub url: String,
    pub children: Vec<Text>,
}

impl Link {
    pub fn new(url: impl Into<String>, children: Vec<Text>) -> Self {
        Self {
            url: url.into(),
            children,
        }
    }

    /// Concatenated text of all child runs.
    pub fn text(&self) -> String {
        self.children.iter().map(|child| child.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.children.iter().map(Text::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.iter().all(Text::is_empty)
    }
}

/// Paragraph-level text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    /// Articles are written right-to-left, so right is the resting state.
    #[default]
    Right,
}

/// List container flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Bulleted,
    Numbered,
}

impl ListKind {
    pub fn block_kind(self) -> BlockKind {
        match self {
            Self::Bulleted => BlockKind::BulletedList,
            Self::Numbered => BlockKind::NumberedList,
        }
    }
}

/// Block element discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    HeadingTwo,
    HeadingThree,
    BlockQuote,
    BulletedList,
    NumberedList,
    ListItem,
    CodeBlock,
}

impl BlockKind {
    /// Name used in the `type` field of the JSON shape.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::HeadingTwo => "heading-two",
            Self::HeadingThree => "heading-three",
            Self::BlockQuote => "block-quote",
            Self::BulletedList => "bulleted-list",
            Self::NumberedList => "numbered-list",
            Self::ListItem => "list-item",
            Self::CodeBlock => "code-block",
        }
    }

    /// Parses a JSON `type` name. `heading-one` is read as a level-two heading.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "paragraph" => Some(Self::Paragraph),
            "heading-one" | "heading-two" => Some(Self::HeadingTwo),
            "heading-three" => Some(Self::HeadingThree),
            "block-quote" => Some(Self::BlockQuote),
            "bulleted-list" => Some(Self::BulletedList),
            "numbered-list" => Some(Self::NumberedList),
            "list-item" => Some(Self::ListItem),
            "code-block" => Some(Self::CodeBlock),
            _ => None,
        }
    }

    pub fn list_kind(self) -> Option<ListKind> {
        match self {
            Self::BulletedList => Some(ListKind::Bulleted),
            Self::NumberedList => Some(ListKind::Numbered),
            _ => None,
        }
    }

    pub fn is_list(self) -> bool {
        self.list_kind().is_some()
    }

    /// Returns whether blocks of this kind carry an `align` attribute.
    pub fn is_alignable(self) -> bool {
        matches!(
            self,
            Self::Paragraph | Self::HeadingTwo | Self::HeadingThree | Self::BlockQuote
        )
    }
}

/// Structural element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// `None` renders as the default alignment.
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

    /// Creates a block holding a single empty text run.
    pub fn empty(kind: BlockKind) -> Self {
        Self::new(kind, vec![Node::Text(Text::default())])
    }

    /// Creates a block holding a single plain text run.
    pub fn with_text(kind: BlockKind, text: impl Into<String>) -> Self {
        Self::new(kind, vec![Node::Text(Text::plain(text))])
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    /// Returns whether this block holds inline runs (everything but lists).
    pub fn is_text_block(&self) -> bool {
        !self.kind.is_list()
    }

    /// Concatenated text of every descendant leaf.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

/// Any document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(Text),
    Link(Link),
    Block(Block),
}

impl Node {
    pub fn is_inline(&self) -> bool {
        !matches!(self, Self::Block(_))
    }

    /// Number of chars contributed to the flattened text.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Link(link) => link.len(),
            Self::Block(block) => block.children.iter().map(Node::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&text.text),
            Self::Link(link) => {
                for child in &link.children {
                    out.push_str(&child.text);
                }
            }
            Self::Block(block) => {
                for child in &block.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<Text> for Node {
    fn from(value: Text) -> Self {
        Self::Text(value)
    }
}

impl From<Link> for Node {
    fn from(value: Link) -> Self {
        Self::Link(value)
    }
}

impl From<Block> for Node {
    fn from(value: Block) -> Self {
        Self::Block(value)
    }
}

/// Article body: ordered top-level blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub(crate) blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates the new-article document: one empty right-aligned paragraph.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::empty(BlockKind::Paragraph).aligned(Align::Right)],
        }
    }

    /// Builds a document and normalizes it, so the result is always valid.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut document = Self { blocks };
        crate::editor::normalize::normalize(&mut document);
        document
    }

    /// Builds a document as-is, without repairing invariant violations.
    ///
    /// Used by import paths that validate separately, and by tests.
    pub fn from_unchecked(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Returns whether every invariant holds. Total and side-effect free.
    pub fn is_valid(&self) -> bool {
        validate(self)
    }

    /// Parses the JSON shape, falling back to the default document when the
    /// value is absent, undecodable or violates an invariant.
    ///
    /// A stale `align` on a non-alignable block and marks inside a code block
    /// are dropped before validation; stored bodies carry both.
    pub fn load_or_default(value: Option<serde_json::Value>) -> Self {
        let Some(value) = value else {
            return Self::new();
        };
        match serde_json::from_value::<Document>(value) {
            Ok(mut document) => {
                document.blocks.iter_mut().for_each(drop_stale_attributes);
                if validate(&document) {
                    return document;
                }
                log::warn!(
                    "event=document_load module=model status=fallback reason=invalid_document"
                );
                Self::new()
            }
            Err(err) => {
                log::warn!(
                    "event=document_load module=model status=fallback reason=decode_failed error={}",
                    err
                );
                Self::new()
            }
        }
    }
}

fn drop_stale_attributes(block: &mut Block) {
    if !block.kind.is_alignable() {
        block.align = None;
    }
    let in_code = block.kind == BlockKind::CodeBlock;
    for child in &mut block.children {
        match child {
            Node::Text(text) if in_code => text.marks = Marks::default(),
            Node::Block(inner) => drop_stale_attributes(inner),
            _ => {}
        }
    }
}

/// Returns whether `document` satisfies every structural invariant.
pub fn validate(document: &Document) -> bool {
    !document.blocks.is_empty()
        && document
            .blocks
            .iter()
            .all(|block| block.kind != BlockKind::ListItem && block_is_valid(block))
}

fn block_is_valid(block: &Block) -> bool {
    if block.children.is_empty() {
        return false;
    }
    if block.align.is_some() && !block.kind.is_alignable() {
        return false;
    }

    if block.kind.is_list() {
        return block.children.iter().all(|child| match child {
            Node::Block(item) => item.kind == BlockKind::ListItem && block_is_valid(item),
            _ => false,
        });
    }

    if block.kind == BlockKind::CodeBlock {
        return block.children.iter().all(|child| match child {
            Node::Text(text) => text.marks.is_plain(),
            _ => false,
        });
    }

    block.children.iter().all(|child| match child {
        Node::Text(_) => true,
        Node::Link(link) => !link.children.is_empty() && !link.is_empty(),
        Node::Block(_) => false,
    })
}

/// Error raised when a JSON node does not match any known shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDecodeError(String);

impl Display for NodeDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid document node: {}", self.0)
    }
}

impl Error for NodeDecodeError {}

/// Flat JSON shape shared by every node kind.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(flatten)]
    marks: Marks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    align: Option<Align>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<RawNode>>,
}

impl From<&Node> for RawNode {
    fn from(node: &Node) -> Self {
        match node {
            Node::Text(text) => RawNode::from(text),
            Node::Link(link) => RawNode {
                kind: Some("link".to_string()),
                url: Some(link.url.clone()),
                children: Some(link.children.iter().map(RawNode::from).collect()),
                ..RawNode::default()
            },
            Node::Block(block) => RawNode::from(block),
        }
    }
}

impl From<&Text> for RawNode {
    fn from(text: &Text) -> Self {
        RawNode {
            text: Some(text.text.clone()),
            marks: text.marks,
            ..RawNode::default()
        }
    }
}

impl From<&Block> for RawNode {
    fn from(block: &Block) -> Self {
        RawNode {
            kind: Some(block.kind.type_name().to_string()),
            align: block.align,
            children: Some(block.children.iter().map(RawNode::from).collect()),
            ..RawNode::default()
        }
    }
}

impl TryFrom<RawNode> for Node {
    type Error = NodeDecodeError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let Some(kind) = raw.kind else {
            return match raw.text {
                Some(text) => Ok(Node::Text(Text::marked(text, raw.marks))),
                None => Err(NodeDecodeError(
                    "node has neither `text` nor `type`".to_string(),
                )),
            };
        };

        let children = raw
            .children
            .unwrap_or_default()
            .into_iter()
            .map(Node::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        if kind == "link" {
            // Nested elements inside a link collapse to their text runs.
            let mut texts = Vec::new();
            collect_leaves(children, &mut texts);
            return Ok(Node::Link(Link::new(raw.url.unwrap_or_default(), texts)));
        }

        let block_kind = BlockKind::from_type_name(&kind)
            .ok_or_else(|| NodeDecodeError(format!("unknown element type `{kind}`")))?;
        Ok(Node::Block(Block {
            kind: block_kind,
            align: raw.align,
            children,
        }))
    }
}

fn collect_leaves(nodes: Vec<Node>, out: &mut Vec<Text>) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push(text),
            Node::Link(link) => out.extend(link.children),
            Node::Block(block) => collect_leaves(block.children, out),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawNode::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawNode::deserialize(deserializer)?;
        Node::try_from(raw).map_err(D::Error::custom)
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawNode::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Node::deserialize(deserializer)? {
            Node::Block(block) => Ok(block),
            _ => Err(D::Error::custom(
                "invalid document node: top-level nodes must be blocks",
            )),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.blocks.iter())
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let blocks = Vec::<Block>::deserialize(deserializer)?;
        Ok(Self { blocks })
    }
}

#[cfg(test)]
mod tests {
    use super::{validate, Align, Block, BlockKind, Document, Link, Marks, Node, Text};
    use serde_json::json;

    #[test]
    fn default_document_is_single_empty_right_aligned_paragraph() {
        let document = Document::new();
        assert_eq!(document.blocks().len(), 1);
        let block = &document.blocks()[0];
        assert_eq!(block.kind, BlockKind::Paragraph);
        assert_eq!(block.align, Some(Align::Right));
        assert_eq!(block.children, vec![Node::Text(Text::default())]);
        assert!(validate(&document));
    }

    #[test]
    fn validate_rejects_empty_document_and_empty_blocks() {
        assert!(!validate(&Document::from_unchecked(Vec::new())));
        let empty_block = Block::new(BlockKind::Paragraph, Vec::new());
        assert!(!validate(&Document::from_unchecked(vec![empty_block])));
    }

    #[test]
    fn validate_rejects_list_with_paragraph_child() {
        let list = Block::new(
            BlockKind::BulletedList,
            vec![Node::Block(Block::with_text(BlockKind::Paragraph, "x"))],
        );
        assert!(!validate(&Document::from_unchecked(vec![list])));
    }

    #[test]
    fn validate_rejects_align_on_list_item_and_marks_in_code() {
        let item = Block::with_text(BlockKind::ListItem, "x").aligned(Align::Left);
        let list = Block::new(BlockKind::NumberedList, vec![Node::Block(item)]);
        assert!(!validate(&Document::from_unchecked(vec![list])));

        let bold = Marks {
            bold: true,
            ..Marks::default()
        };
        let code = Block::new(
            BlockKind::CodeBlock,
            vec![Node::Text(Text::marked("let x = 1;", bold))],
        );
        assert!(!validate(&Document::from_unchecked(vec![code])));
    }

    #[test]
    fn validate_rejects_empty_link_and_top_level_item() {
        let empty_link = Block::new(
            BlockKind::Paragraph,
            vec![Node::Link(Link::new("https://a.b", Vec::new()))],
        );
        assert!(!validate(&Document::from_unchecked(vec![empty_link])));

        let stray_item = Block::with_text(BlockKind::ListItem, "orphan");
        assert!(!validate(&Document::from_unchecked(vec![stray_item])));
    }

    #[test]
    fn json_shape_omits_false_marks_and_reads_legacy_heading() {
        let value = json!([
            {"type": "heading-one", "children": [{"text": "T"}]},
            {"type": "paragraph", "align": "center", "children": [
                {"text": "a", "bold": true},
                {"type": "link", "url": "https://x.y", "children": [{"text": "x"}]},
                {"text": ""}
            ]}
        ]);
        let document: Document = serde_json::from_value(value).unwrap();
        assert_eq!(document.blocks()[0].kind, BlockKind::HeadingTwo);
        assert_eq!(document.blocks()[1].align, Some(Align::Center));

        let encoded = serde_json::to_value(&document).unwrap();
        assert_eq!(encoded[0]["type"], "heading-two");
        assert_eq!(encoded[1]["children"][0], json!({"text": "a", "bold": true}));
        assert_eq!(encoded[1]["children"][1]["type"], "link");
        assert_eq!(encoded[1]["children"][2], json!({"text": ""}));
    }

    #[test]
    fn unknown_element_type_fails_decoding() {
        let value = json!([{"type": "image", "url": "a.png", "children": [{"text": ""}]}]);
        let err = serde_json::from_value::<Document>(value).unwrap_err();
        assert!(err.to_string().contains("unknown element type `image`"));
    }

    #[test]
    fn load_or_default_falls_back_on_absent_or_invalid_input() {
        assert_eq!(Document::load_or_default(None), Document::new());
        assert_eq!(
            Document::load_or_default(Some(json!({"not": "a list"}))),
            Document::new()
        );
        assert_eq!(Document::load_or_default(Some(json!([]))), Document::new());

        let stored = json!([{"type": "paragraph", "children": [{"text": "kept"}]}]);
        let loaded = Document::load_or_default(Some(stored));
        assert_eq!(loaded.blocks()[0].text(), "kept");
    }
}
