//! Minimal HTML reader
//!
//! A forgiving tokenizer and tree builder for description markup. It is not a
//! conforming HTML parser: it understands tags, attributes, void elements,
//! comments and character references, tolerates unclosed and stray tags, and
//! drops `script`/`style` content.

/// A node of the parsed markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    Element(Element),
    Text(String),
}

/// An element with a lowercase tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<HtmlNode>,
}

impl Element {
    fn new(name: String, attrs: Vec<(String, String)>) -> Self {
        Self {
            name,
            attrs,
            children: Vec::new(),
        }
    }

    /// Value of the attribute `name` (attribute names are lowercase).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(key, _)| key == name)
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokenizer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Token {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End(String),
    Text(String),
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Advance past the next occurrence of `needle`, or to the end.
    fn skip_past(&mut self, needle: &str) {
        match self.rest().find(needle) {
            Some(index) => self.pos += index + needle.len(),
            None => self.pos = self.input.len(),
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return None;
            }

            if rest.starts_with("<!--") {
                self.pos += 4;
                self.skip_past("-->");
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_past(">");
                continue;
            }
            if let Some(after) = rest.strip_prefix("</") {
                if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    self.pos += 2;
                    let name = self.read_name();
                    self.skip_past(">");
                    return Some(Token::End(name));
                }
            }
            if let Some(after) = rest.strip_prefix('<') {
                if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    self.pos += 1;
                    return Some(self.read_start_tag());
                }
            }
            return Some(Token::Text(self.read_text()));
        }
    }

    fn read_name(&mut self) -> String {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'))
            .unwrap_or(rest.len());
        self.pos += end;
        rest[..end].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    fn read_start_tag(&mut self) -> Token {
        let name = self.read_name();
        let mut attrs = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                break;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }

            let key_end = rest
                .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
                .unwrap_or(rest.len());
            let key = rest[..key_end].to_ascii_lowercase();
            self.pos += key_end.max(1);

            self.skip_whitespace();
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                self.read_attr_value()
            } else {
                String::new()
            };
            if !key.is_empty() {
                attrs.push((key, decode_entities(&value)));
            }
        }

        Token::Start {
            name,
            attrs,
            self_closing,
        }
    }

    fn read_attr_value(&mut self) -> String {
        let rest = self.rest();
        if let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') {
            let body = &rest[1..];
            let end = body.find(quote).unwrap_or(body.len());
            self.pos += 1 + end + usize::from(end < body.len());
            return body[..end].to_string();
        }
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>')
            .unwrap_or(rest.len());
        self.pos += end;
        rest[..end].to_string()
    }

    /// Read text up to the next `<` that could start markup.
    fn read_text(&mut self) -> String {
        let rest = self.rest();
        // A lone '<' that starts no markup is literal text.
        let search_from = usize::from(rest.starts_with('<'));
        let end = rest[search_from..]
            .find('<')
            .map(|i| i + search_from)
            .unwrap_or(rest.len());
        self.pos += end;
        decode_entities(&rest[..end])
    }

    /// Skip the body of a raw-text element up to its closing tag.
    fn skip_raw_text(&mut self, name: &str) {
        let closing = format!("</{}", name);
        let lower = self.rest().to_ascii_lowercase();
        match lower.find(&closing) {
            Some(index) => {
                self.pos += index;
                self.skip_past(">");
            }
            None => self.pos = self.input.len(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tree Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a markup fragment into a forest of nodes.
pub fn parse_html(input: &str) -> Vec<HtmlNode> {
    let mut tokenizer = Tokenizer::new(input);
    let mut root: Vec<HtmlNode> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    while let Some(token) = tokenizer.next_token() {
        match token {
            Token::Text(text) => {
                if !text.is_empty() {
                    append(&mut root, &mut stack, HtmlNode::Text(text));
                }
            }
            Token::Start {
                name,
                attrs,
                self_closing,
            } => {
                if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                    if !self_closing {
                        tokenizer.skip_raw_text(&name);
                    }
                    continue;
                }
                close_implied(&mut root, &mut stack, &name);
                let element = Element::new(name, attrs);
                if self_closing || is_void(&element.name) {
                    append(&mut root, &mut stack, HtmlNode::Element(element));
                } else {
                    stack.push(element);
                }
            }
            Token::End(name) => {
                if let Some(index) = stack.iter().rposition(|el| el.name == name) {
                    while stack.len() > index {
                        pop(&mut root, &mut stack);
                    }
                }
            }
        }
    }

    while !stack.is_empty() {
        pop(&mut root, &mut stack);
    }
    root
}

fn append(root: &mut Vec<HtmlNode>, stack: &mut [Element], node: HtmlNode) {
    let siblings = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => root,
    };
    if let (HtmlNode::Text(text), Some(HtmlNode::Text(prev))) = (&node, siblings.last_mut()) {
        prev.push_str(text);
        return;
    }
    siblings.push(node);
}

fn pop(root: &mut Vec<HtmlNode>, stack: &mut Vec<Element>) {
    if let Some(element) = stack.pop() {
        append(root, stack, HtmlNode::Element(element));
    }
}

/// Close elements that an opening `name` tag ends implicitly.
fn close_implied(root: &mut Vec<HtmlNode>, stack: &mut Vec<Element>, name: &str) {
    let closes_paragraph = matches!(
        name,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "blockquote" | "pre" | "div"
    );
    if closes_paragraph && stack.last().is_some_and(|el| el.name == "p") {
        pop(root, stack);
    }

    if name == "li" {
        // Close an open item of the same list, including anything opened inside it.
        let list_index = stack
            .iter()
            .rposition(|el| el.name == "ul" || el.name == "ol");
        let item_index = stack.iter().rposition(|el| el.name == "li");
        if let Some(item_index) = item_index {
            if list_index.map_or(true, |list| item_index > list) {
                while stack.len() > item_index {
                    pop(root, stack);
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Character References
// ─────────────────────────────────────────────────────────────────────────────

/// Decode named and numeric character references. Unknown references are
/// left as written.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp + 1..];
        let decoded = candidate
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_reference(&candidate[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = candidate;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        "hellip" => Some('\u{2026}'),
        "copy" => Some('\u{a9}'),
        _ => None,
    }
}

/// Escape text for use in element content or a double-quoted attribute.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
