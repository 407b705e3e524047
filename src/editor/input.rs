//! Keyboard and paste handling
//!
//! Routes trigger keys through the shortcut transformer before falling back
//! to ordinary editing, and converts Markdown-like pasted text.

use super::document_editor::DocumentEditor;
use super::shortcuts::Shortcut;
use crate::config::EditorSettings;
use crate::document::{unix_line_endings, BlockKind};
use crate::error::Result;
use crate::format::{detect, markdown_to_document, DescriptionFormat};
use log::debug;

/// A key press the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Space,
    Enter,
    Backspace,
}

/// What a key press did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Inserted,
    /// A shortcut fired; the trigger was consumed
    Transformed(Shortcut),
    SplitBlock,
    ExitedList,
    Deleted,
    /// Nothing changed
    Ignored,
}

/// How pasted text was inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteOutcome {
    /// Converted from the detected format and inserted as blocks
    Structured(DescriptionFormat),
    Verbatim,
    Ignored,
}

impl DocumentEditor {
    /// Handle one key press.
    ///
    /// Space and Enter first try a block shortcut. Enter then exits the list
    /// from an empty list entry, adds a line inside a code block, or splits
    /// the block.
    pub fn handle_key(&mut self, key: Key, settings: &EditorSettings) -> Result<KeyOutcome> {
        let key = match key {
            Key::Char(' ') => Key::Space,
            Key::Char('\n') | Key::Char('\r') => Key::Enter,
            other => other,
        };

        if matches!(key, Key::Space | Key::Enter) && settings.shortcuts_enabled {
            if let Some(shortcut) = self.try_shortcut()? {
                return Ok(KeyOutcome::Transformed(shortcut));
            }
        }

        match key {
            Key::Char(c) => {
                let mut buf = [0u8; 4];
                self.insert_text(c.encode_utf8(&mut buf))?;
                Ok(KeyOutcome::Inserted)
            }
            Key::Space => {
                self.insert_text(" ")?;
                Ok(KeyOutcome::Inserted)
            }
            Key::Enter => self.handle_enter(),
            Key::Backspace => Ok(if self.delete_backward()? {
                KeyOutcome::Deleted
            } else {
                KeyOutcome::Ignored
            }),
        }
    }

    fn handle_enter(&mut self) -> Result<KeyOutcome> {
        let caret_block_empty = self.selection().is_collapsed()
            && self.current_block().is_some_and(|block| block.text().is_empty());
        if caret_block_empty && self.in_list(&self.caret().block) {
            self.exit_list()?;
            return Ok(KeyOutcome::ExitedList);
        }
        if self
            .current_block()
            .is_some_and(|block| block.kind == BlockKind::Code)
        {
            self.insert_text("\n")?;
            return Ok(KeyOutcome::Inserted);
        }
        self.split_block()?;
        Ok(KeyOutcome::SplitBlock)
    }

    /// Type a string key by key.
    pub fn type_text(&mut self, text: &str, settings: &EditorSettings) -> Result<()> {
        for c in text.chars() {
            self.handle_key(Key::Char(c), settings)?;
        }
        Ok(())
    }

    /// Paste plain text. Text the detector reads as Markdown is converted and
    /// inserted as structured content when enabled; anything else, and any
    /// paste into a code block, goes in verbatim.
    pub fn paste_text(&mut self, text: &str, settings: &EditorSettings) -> Result<PasteOutcome> {
        if text.is_empty() {
            return Ok(PasteOutcome::Ignored);
        }
        let in_code = self
            .current_block()
            .is_some_and(|block| block.kind == BlockKind::Code);

        if settings.convert_markdown_paste && !in_code && detect(text) == DescriptionFormat::Markdown {
            debug!("Converting pasted Markdown ({} bytes)", text.len());
            let fragment = markdown_to_document(text, &settings.markdown);
            self.insert_fragment(fragment)?;
            return Ok(PasteOutcome::Structured(DescriptionFormat::Markdown));
        }

        self.insert_text(&unix_line_endings(text))?;
        Ok(PasteOutcome::Verbatim)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, Document, HeadingLevel, Node};
    use crate::editor::Point;

    fn settings() -> EditorSettings {
        EditorSettings::default()
    }

    fn empty_editor() -> DocumentEditor {
        DocumentEditor::new(Document::empty())
    }

    fn only_block(editor: &DocumentEditor) -> &Block {
        let blocks: Vec<&Block> = editor.document().blocks().collect();
        assert_eq!(blocks.len(), 1, "expected one top-level block");
        blocks[0]
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Shortcuts
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_typing_hash_hash_space_makes_empty_heading() {
        let mut editor = empty_editor();
        editor.type_text("## ", &settings()).unwrap();
        let block = only_block(&editor);
        assert_eq!(block.kind, BlockKind::Heading(HeadingLevel::H2));
        assert_eq!(block.text(), "");
    }

    #[test]
    fn test_space_after_heading_prefix_with_content() {
        let mut editor = empty_editor();
        editor.insert_text("## Hello").unwrap();
        let outcome = editor.handle_key(Key::Space, &settings()).unwrap();
        assert_eq!(outcome, KeyOutcome::Transformed(Shortcut::Heading(HeadingLevel::H2)));
        let block = only_block(&editor);
        assert_eq!(block.kind, BlockKind::Heading(HeadingLevel::H2));
        assert_eq!(block.text(), "Hello");
        assert_eq!(editor.caret(), &Point::new(vec![0], 5));
    }

    #[test]
    fn test_typing_dash_space_makes_empty_list() {
        let mut editor = empty_editor();
        editor.type_text("- ", &settings()).unwrap();
        let list = only_block(&editor);
        assert_eq!(list.kind, BlockKind::BulletedList);
        assert_eq!(list.children.len(), 1);
        let item = list.children[0].as_block().unwrap();
        assert_eq!(item.kind, BlockKind::ListItem);
        assert_eq!(item.text(), "");
        assert_eq!(editor.caret(), &Point::new(vec![0, 0], 0));
    }

    #[test]
    fn test_space_after_bullet_with_content() {
        let mut editor = empty_editor();
        editor.insert_text("- Buy milk").unwrap();
        editor.handle_key(Key::Space, &settings()).unwrap();
        let list = only_block(&editor);
        assert_eq!(list.kind, BlockKind::BulletedList);
        assert_eq!(list.children.len(), 1);
        assert_eq!(list.text(), "Buy milk");
    }

    #[test]
    fn test_typing_into_list_after_shortcut() {
        let mut editor = empty_editor();
        editor.type_text("- Buy milk", &settings()).unwrap();
        let list = only_block(&editor);
        assert_eq!(list.kind, BlockKind::BulletedList);
        assert_eq!(list.text(), "Buy milk");
    }

    #[test]
    fn test_quote_shortcut() {
        let mut editor = empty_editor();
        editor.type_text("> wise", &settings()).unwrap();
        let block = only_block(&editor);
        assert_eq!(block.kind, BlockKind::BlockQuote);
        assert_eq!(block.text(), "wise");
    }

    #[test]
    fn test_enter_triggers_shortcut_without_splitting() {
        let mut editor = empty_editor();
        editor.insert_text("### Notes").unwrap();
        let outcome = editor.handle_key(Key::Enter, &settings()).unwrap();
        assert_eq!(outcome, KeyOutcome::Transformed(Shortcut::Heading(HeadingLevel::H3)));
        assert_eq!(editor.document().children().len(), 1);
    }

    #[test]
    fn test_shortcut_only_in_paragraphs() {
        let mut editor = DocumentEditor::new(Document::from_blocks(vec![Block::with_text(
            BlockKind::BlockQuote,
            "#",
        )]));
        editor.move_to_end();
        assert_eq!(
            editor.handle_key(Key::Space, &settings()).unwrap(),
            KeyOutcome::Inserted
        );
        assert_eq!(editor.document().text(), "# ");
    }

    #[test]
    fn test_shortcuts_can_be_disabled() {
        let disabled = EditorSettings {
            shortcuts_enabled: false,
            ..EditorSettings::default()
        };
        let mut editor = empty_editor();
        editor.type_text("## x", &disabled).unwrap();
        assert_eq!(editor.document(), &Document::plain_text("## x"));
    }

    #[test]
    fn test_no_match_inserts_space() {
        let mut editor = empty_editor();
        editor.type_text("hi there", &settings()).unwrap();
        assert_eq!(editor.document(), &Document::plain_text("hi there"));
    }

    #[test]
    fn test_shortcut_is_one_version_step() {
        let mut editor = empty_editor();
        editor.insert_text("##").unwrap();
        let before = editor.version();
        editor.handle_key(Key::Space, &settings()).unwrap();
        assert_eq!(editor.version(), before + 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Enter and Backspace
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_enter_on_empty_item_exits_list() {
        let mut editor = empty_editor();
        editor.type_text("- milk", &settings()).unwrap();
        assert_eq!(editor.handle_key(Key::Enter, &settings()).unwrap(), KeyOutcome::SplitBlock);
        assert_eq!(editor.handle_key(Key::Enter, &settings()).unwrap(), KeyOutcome::ExitedList);
        assert_eq!(
            editor.document().block_kinds(),
            vec![&BlockKind::BulletedList, &BlockKind::ListItem, &BlockKind::Paragraph]
        );
    }

    #[test]
    fn test_enter_in_code_block_adds_line() {
        let mut editor = DocumentEditor::new(Document::from_blocks(vec![Block::with_text(
            BlockKind::Code,
            "a",
        )]));
        editor.move_to_end();
        editor.handle_key(Key::Enter, &settings()).unwrap();
        editor.handle_key(Key::Char('b'), &settings()).unwrap();
        assert_eq!(only_block(&editor).text(), "a\nb");
    }

    #[test]
    fn test_backspace_on_empty_heading_reverts_to_paragraph() {
        let mut editor = empty_editor();
        editor.type_text("# ", &settings()).unwrap();
        assert_eq!(
            editor.handle_key(Key::Backspace, &settings()).unwrap(),
            KeyOutcome::Deleted
        );
        assert!(editor.document().is_empty());
        assert_eq!(
            editor.handle_key(Key::Backspace, &settings()).unwrap(),
            KeyOutcome::Ignored
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Paste
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_paste_markdown_is_structured() {
        let mut editor = empty_editor();
        let outcome = editor
            .paste_text("## Steps\n\n- one\n- two", &settings())
            .unwrap();
        assert_eq!(outcome, PasteOutcome::Structured(DescriptionFormat::Markdown));
        assert_eq!(
            editor.document().block_kinds(),
            vec![
                &BlockKind::Heading(HeadingLevel::H2),
                &BlockKind::BulletedList,
                &BlockKind::ListItem,
                &BlockKind::ListItem,
            ]
        );
    }

    #[test]
    fn test_paste_inline_markdown_keeps_paragraph() {
        let mut editor = DocumentEditor::new(Document::plain_text("Say "));
        editor.move_to_end();
        editor.paste_text("**hi**", &settings()).unwrap();
        let block = only_block(&editor);
        assert_eq!(block.text(), "Say hi");
        match &block.children[1] {
            Node::Text(run) => assert!(run.marks.bold),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_paste_plain_text_is_verbatim() {
        let mut editor = empty_editor();
        let outcome = editor.paste_text("just words", &settings()).unwrap();
        assert_eq!(outcome, PasteOutcome::Verbatim);
        assert_eq!(editor.document(), &Document::plain_text("just words"));
    }

    #[test]
    fn test_paste_html_is_verbatim() {
        let mut editor = empty_editor();
        editor.paste_text("<b>x</b>", &settings()).unwrap();
        assert_eq!(editor.document().text(), "<b>x</b>");
    }

    #[test]
    fn test_paste_markdown_conversion_disabled() {
        let no_convert = EditorSettings {
            convert_markdown_paste: false,
            ..EditorSettings::default()
        };
        let mut editor = empty_editor();
        assert_eq!(
            editor.paste_text("# raw", &no_convert).unwrap(),
            PasteOutcome::Verbatim
        );
        assert_eq!(editor.document().text(), "# raw");
    }
}
