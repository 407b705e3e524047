//! JSON representation of the structured document
//!
//! Block nodes serialize as `{"type": ..., "children": [...]}` objects with
//! optional `align`, `href`/`newTab` (links) and `checked` (checklist items);
//! text nodes serialize as `{"text": ..., "bold": true, ...}`.

use super::model::{Align, Block, BlockKind, Document, HeadingLevel, LinkTarget, Node};
use crate::error::Result;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockOut<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    align: Option<Align>,
    #[serde(skip_serializing_if = "Option::is_none")]
    href: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_tab: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checked: Option<bool>,
    children: &'a [Node],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockIn {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    align: Option<Align>,
    #[serde(default)]
    href: Option<String>,
    #[serde(default, alias = "target_blank")]
    new_tab: Option<bool>,
    #[serde(default)]
    checked: Option<bool>,
    children: Vec<Node>,
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let (href, new_tab) = match &self.kind {
            BlockKind::Link(target) => (Some(target.href.as_str()), Some(target.new_tab)),
            _ => (None, None),
        };
        let checked = match self.kind {
            BlockKind::ChecklistItem { checked } => Some(checked),
            _ => None,
        };
        BlockOut {
            kind: self.kind.type_name(),
            align: self.align,
            href,
            new_tab,
            checked,
            children: &self.children,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BlockIn::deserialize(deserializer)?;
        let kind = parse_kind(&raw).map_err(de::Error::custom)?;
        Ok(Block {
            kind,
            align: raw.align,
            children: raw.children,
        })
    }
}

/// Resolve a `type` tag, accepting the long-form aliases older editors wrote.
fn parse_kind(raw: &BlockIn) -> std::result::Result<BlockKind, String> {
    let kind = match raw.kind.as_str() {
        "paragraph" => BlockKind::Paragraph,
        "heading-1" | "heading-one" => BlockKind::Heading(HeadingLevel::H1),
        "heading-2" | "heading-two" => BlockKind::Heading(HeadingLevel::H2),
        "heading-3" | "heading-three" => BlockKind::Heading(HeadingLevel::H3),
        "heading-4" | "heading-four" => BlockKind::Heading(HeadingLevel::H4),
        "heading-5" | "heading-five" => BlockKind::Heading(HeadingLevel::H5),
        "heading-6" | "heading-six" => BlockKind::Heading(HeadingLevel::H6),
        "bulleted-list" | "list" => BlockKind::BulletedList,
        "numbered-list" => BlockKind::NumberedList,
        "list-item" => BlockKind::ListItem,
        "blockquote" | "block-quote" => BlockKind::BlockQuote,
        "code" => BlockKind::Code,
        "checklist-item" | "check-list-item" => BlockKind::ChecklistItem {
            checked: raw.checked.unwrap_or(false),
        },
        "link" => {
            let href = raw
                .href
                .clone()
                .ok_or_else(|| "link node without href".to_string())?;
            BlockKind::Link(LinkTarget::new(href, raw.new_tab.unwrap_or(false)))
        }
        other => return Err(format!("unknown block type '{}'", other)),
    };
    Ok(kind)
}

impl Document {
    /// Parse a JSON array of nodes and normalize it into a document.
    pub fn from_json(json: &str) -> Result<Self> {
        let nodes: Vec<Node> = serde_json::from_str(json)?;
        Ok(Document::from_nodes(nodes))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Marks, TextRun};

    #[test]
    fn test_serialize_paragraph_with_marks() {
        let doc = Document::from_blocks(vec![Block::new(
            BlockKind::Paragraph,
            vec![
                TextRun::plain("Hello ").into(),
                TextRun::marked(
                    "world",
                    Marks {
                        bold: true,
                        ..Marks::default()
                    },
                )
                .into(),
            ],
        )]);
        let json = doc.to_json().unwrap();
        assert_eq!(
            json,
            r#"[{"type":"paragraph","children":[{"text":"Hello "},{"text":"world","bold":true}]}]"#
        );
    }

    #[test]
    fn test_serialize_link_and_checklist_attributes() {
        let doc = Document::from_blocks(vec![
            Block::new(
                BlockKind::Paragraph,
                vec![Block::with_text(
                    BlockKind::Link(LinkTarget::new("https://gauzy.co", true)),
                    "site",
                )
                .into()],
            ),
            Block::with_text(BlockKind::ChecklistItem { checked: true }, "done"),
        ]);
        let json = doc.to_json().unwrap();
        assert!(json.contains(r#""type":"link","href":"https://gauzy.co","newTab":true"#));
        assert!(json.contains(r#""type":"checklist-item","checked":true"#));
    }

    #[test]
    fn test_parse_accepts_aliases() {
        let json = r#"[
            {"type": "heading-one", "children": [{"text": "T"}]},
            {"type": "block-quote", "align": "right", "children": [{"text": "q", "italic": true}]}
        ]"#;
        let doc = Document::from_json(json).unwrap();
        let blocks: Vec<&Block> = doc.blocks().collect();
        assert_eq!(blocks[0].kind, BlockKind::Heading(HeadingLevel::H1));
        assert_eq!(blocks[1].kind, BlockKind::BlockQuote);
        assert_eq!(blocks[1].align, Some(Align::Right));
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let json = r#"[{"type": "table", "children": [{"text": "x"}]}]"#;
        assert!(Document::from_json(json).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_children() {
        let json = r#"[{"type": "paragraph"}]"#;
        assert!(Document::from_json(json).is_err());
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let json = r#"[{"type": "paragraph", "id": "abc", "children": [{"text": "x", "color": "red"}]}]"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.text(), "x");
    }

    #[test]
    fn test_json_round_trip_is_stable() {
        let json = r#"[{"type":"numbered-list","children":[{"type":"list-item","children":[{"text":"a"}]}]}]"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.to_json().unwrap(), json);
    }
}
