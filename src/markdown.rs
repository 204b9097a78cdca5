//! HTML fragment to Markdown conversion for the rich-text recipe fields.

use scraper::{ElementRef, Html, Node};

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "th",
    "thead", "tr", "ul",
];

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements that carry meaning even without text
const MEANINGFUL_WHEN_BLANK: &[&str] = &["a", "table", "th", "td", "iframe", "audio", "video"];

const ESCAPED_CHARS: &[char] = &['\\', '*', '_', '`', '[', ']', '#', '>'];

/// Formatting knobs for [`MarkdownConverter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Backslash-escape Markdown control characters found in text
    pub escape_text: bool,
    /// Wraps `<strong>` and `<b>`
    pub strong_delimiter: String,
    /// Wraps `<em>` and `<i>`
    pub em_delimiter: String,
    /// Marker for `<ul>` items, followed by three spaces
    pub bullet_marker: String,
    /// Written before the newline produced by `<br>`
    pub line_break: String,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            escape_text: true,
            strong_delimiter: "**".to_string(),
            em_delimiter: "_".to_string(),
            bullet_marker: "*".to_string(),
            line_break: "  ".to_string(),
        }
    }
}

impl MarkdownOptions {
    /// Settings matching Paprika's plain-text recipe fields: text passes
    /// through unescaped and bold uses single asterisks.
    pub fn paprika() -> Self {
        Self {
            escape_text: false,
            strong_delimiter: "*".to_string(),
            ..Self::default()
        }
    }
}

/// Replacement strategy for a block element, chosen by tag name.
///
/// `content` is the element's converted children with surrounding
/// whitespace trimmed.
pub trait BlockRule {
    fn matches(&self, tag: &str) -> bool;
    fn replacement(&self, content: &str) -> String;
}

/// Paragraphs end with a single newline instead of a blank line. A
/// paragraph ending in a colon is a section header ("For the sauce:") and
/// gets two leading newlines, so it sits after a blank line once joined.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphSpacing;

impl BlockRule for ParagraphSpacing {
    fn matches(&self, tag: &str) -> bool {
        tag == "p"
    }

    fn replacement(&self, content: &str) -> String {
        if content.ends_with(':') {
            format!("\n\n{content}\n")
        } else {
            format!("{content}\n")
        }
    }
}

pub struct MarkdownConverter {
    options: MarkdownOptions,
    rules: Vec<Box<dyn BlockRule>>,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new(MarkdownOptions::default())
    }
}

impl MarkdownConverter {
    pub fn new(options: MarkdownOptions) -> Self {
        Self {
            options,
            rules: Vec::new(),
        }
    }

    /// The converter used for notes, ingredients and directions.
    pub fn paprika() -> Self {
        Self::new(MarkdownOptions::paprika()).with_rule(ParagraphSpacing)
    }

    /// Registers a block rule. Rules added later take precedence.
    pub fn with_rule(mut self, rule: impl BlockRule + 'static) -> Self {
        self.rules.insert(0, Box::new(rule));
        self
    }

    /// Converts an HTML fragment (an element's inner HTML) to Markdown.
    pub fn convert(&self, html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let output = self.children(fragment.root_element());

        output
            .trim_start_matches(['\t', '\r', '\n'])
            .trim_end()
            .to_string()
    }

    fn children(&self, element: ElementRef) -> String {
        let children: Vec<_> = element.children().collect();
        let is_block_at = |index: Option<usize>| {
            index
                .and_then(|i| children.get(i))
                .and_then(|node| node.value().as_element())
                .map_or(true, |el| is_block(el.name()))
        };

        let mut output = String::new();
        for (index, child) in children.iter().enumerate() {
            match child.value() {
                Node::Text(text) => {
                    let text: &str = text;
                    if text.trim_matches(|c: char| c.is_ascii_whitespace()).is_empty()
                        && (is_block_at(index.checked_sub(1)) || is_block_at(Some(index + 1)))
                    {
                        continue;
                    }
                    join(&mut output, &self.text(text));
                }
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(*child) {
                        join(&mut output, &self.element(child));
                    }
                }
                _ => {}
            }
        }
        output
    }

    fn text(&self, text: &str) -> String {
        let collapsed = collapse_whitespace(text);
        if self.options.escape_text {
            escape(&collapsed)
        } else {
            collapsed
        }
    }

    fn element(&self, element: ElementRef) -> String {
        let tag = element.value().name();
        if SKIPPED_ELEMENTS.contains(&tag) {
            return String::new();
        }

        if is_blank(element) {
            return if is_block(tag) {
                "\n\n".to_string()
            } else {
                String::new()
            };
        }

        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(tag)) {
            let content = self.children(element);
            return rule.replacement(content.trim());
        }

        let opts = &self.options;
        match tag {
            "p" => format!("\n\n{}\n\n", self.children(element).trim()),
            "br" => format!("{}\n", opts.line_break),
            "h1" | "h2" => {
                let content = self.children(element);
                let content = content.trim();
                let underline = if tag == "h1" { "=" } else { "-" };
                let width = content.chars().count();
                format!("\n\n{content}\n{}\n\n", underline.repeat(width))
            }
            "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(3);
                format!("\n\n{} {}\n\n", "#".repeat(level), self.children(element).trim())
            }
            "ul" | "ol" => format!("\n\n{}\n\n", self.list(element, tag == "ol")),
            "strong" | "b" => wrap(&self.children(element), &opts.strong_delimiter),
            "em" | "i" => wrap(&self.children(element), &opts.em_delimiter),
            "code" => {
                let code: String = element.text().collect();
                if code.is_empty() {
                    code
                } else {
                    format!("`{code}`")
                }
            }
            "a" => {
                let content = self.children(element);
                match element.value().attr("href") {
                    Some(href) if !href.is_empty() => format!("[{content}]({href})"),
                    _ => content,
                }
            }
            "img" => match element.value().attr("src") {
                Some(src) if !src.is_empty() => {
                    format!("![{}]({src})", element.value().attr("alt").unwrap_or(""))
                }
                _ => String::new(),
            },
            _ if is_block(tag) => format!("\n\n{}\n\n", self.children(element)),
            _ => self.children(element),
        }
    }

    fn list(&self, list: ElementRef, ordered: bool) -> String {
        let mut output = String::new();
        let start = list
            .value()
            .attr("start")
            .and_then(|start| start.trim().parse::<usize>().ok())
            .unwrap_or(1);
        let items = list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li");

        for (index, item) in items.enumerate() {
            let marker = if ordered {
                format!("{}.  ", start + index)
            } else {
                format!("{}   ", self.options.bullet_marker)
            };
            let content = self.children(item);
            let content = content
                .trim_matches(|c: char| c.is_ascii_whitespace())
                .replace('\n', "\n    ");
            output.push_str(&format!("{marker}{content}\n"));
        }
        output.trim_end().to_string()
    }
}

fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag)
}

/// An element with no text and nothing inside that renders without text.
fn is_blank(element: ElementRef) -> bool {
    let renders_alone = |tag: &str| VOID_ELEMENTS.contains(&tag) || MEANINGFUL_WHEN_BLANK.contains(&tag);

    if renders_alone(element.value().name()) {
        return false;
    }
    if !element.text().all(|t| t.chars().all(|c| c.is_ascii_whitespace())) {
        return false;
    }
    !element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|child| renders_alone(child.value().name()))
}

/// Appends `piece`, collapsing the newlines where the two meet to at most
/// one blank line.
fn join(output: &mut String, piece: &str) {
    let kept = output.trim_end_matches('\n').len();
    let trailing = output.len() - kept;
    let body = piece.trim_start_matches('\n');
    let leading = piece.len() - body.len();

    output.truncate(kept);
    output.push_str(&"\n".repeat(trailing.max(leading).min(2)));
    output.push_str(body);
}

fn wrap(content: &str, delimiter: &str) -> String {
    if content.trim().is_empty() {
        return content.to_string();
    }
    format!("{delimiter}{}{delimiter}", content.trim())
}

fn collapse_whitespace(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                output.push(' ');
            }
            in_space = true;
        } else {
            output.push(c);
            in_space = false;
        }
    }
    output
}

fn escape(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        if ESCAPED_CHARS.contains(&c) {
            output.push('\\');
        }
        output.push(c);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_end_with_single_newline() {
        let converter = MarkdownConverter::paprika();
        let markdown = converter.convert("<p>1 cup flour</p>\n<p>2 eggs</p>");
        assert_eq!(markdown, "1 cup flour\n2 eggs");
    }

    #[test]
    fn test_header_paragraph_rule() {
        assert_eq!(
            ParagraphSpacing.replacement("For the sauce:"),
            "\n\nFor the sauce:\n"
        );
        assert_eq!(ParagraphSpacing.replacement("1 tbsp butter"), "1 tbsp butter\n");
    }

    #[test]
    fn test_header_paragraph_spacing_in_document() {
        let converter = MarkdownConverter::paprika();
        let markdown =
            converter.convert("<p>500 g pasta</p><p>For the sauce:</p><p>2 tomatoes</p>");
        assert_eq!(markdown, "500 g pasta\n\nFor the sauce:\n2 tomatoes");
    }

    #[test]
    fn test_join_caps_newlines_at_one_blank_line() {
        let mut output = "a\n".to_string();
        join(&mut output, "\n\n\nb\n");
        assert_eq!(output, "a\n\nb\n");

        join(&mut output, "c");
        assert_eq!(output, "a\n\nb\nc");

        let mut output = "x".to_string();
        join(&mut output, " y");
        assert_eq!(output, "x y");
    }

    #[test]
    fn test_blank_paragraph_becomes_blank_line() {
        let converter = MarkdownConverter::paprika();
        assert_eq!(converter.convert("<p>a</p><p> </p><p>b</p>"), "a\n\nb");
        assert_eq!(converter.convert("<p>a</p><p><br></p><p>b</p>"), "a\nb");
    }

    #[test]
    fn test_leading_header_is_trimmed() {
        let converter = MarkdownConverter::paprika();
        let markdown = converter.convert("<p>For the dough:</p><p>flour</p>");
        assert_eq!(markdown, "For the dough:\nflour");
    }

    #[test]
    fn test_text_is_not_escaped() {
        let converter = MarkdownConverter::paprika();
        let markdown = converter.convert("<p>*optional* salt_and_pepper #1</p>");
        assert_eq!(markdown, "*optional* salt_and_pepper #1");
    }

    #[test]
    fn test_default_options_escape_text() {
        let converter = MarkdownConverter::default();
        assert_eq!(converter.convert("a*b_c"), "a\\*b\\_c");
    }

    #[test]
    fn test_strong_uses_single_asterisk() {
        let converter = MarkdownConverter::paprika();
        let markdown = converter.convert("<p><strong>Tip</strong> rest the <b>dough</b></p>");
        assert_eq!(markdown, "*Tip* rest the *dough*");

        let converter = MarkdownConverter::default();
        assert_eq!(converter.convert("<strong>Tip</strong>"), "**Tip**");
    }

    #[test]
    fn test_entities_are_decoded() {
        let converter = MarkdownConverter::paprika();
        assert_eq!(converter.convert("<p>Salt &amp; pepper</p>"), "Salt & pepper");
    }

    #[test]
    fn test_line_breaks_and_whitespace() {
        let converter = MarkdownConverter::paprika();
        let markdown = converter.convert("Preheat   the\n oven<br>Bake");
        assert_eq!(markdown, "Preheat the oven  \nBake");
    }

    #[test]
    fn test_lists_and_links() {
        let converter = MarkdownConverter::paprika();
        let markdown = converter.convert(
            "<ol><li>Mix</li><li>See <a href=\"https://example.com\">notes</a></li></ol>",
        );
        assert_eq!(markdown, "1.  Mix\n2.  See [notes](https://example.com)");

        let markdown = converter.convert("<ul>\n<li>a</li>\n<li><em>b</em></li>\n</ul>");
        assert_eq!(markdown, "*   a\n*   _b_");

        let markdown = converter.convert("<ol start=\"3\"><li>Rest</li><li>Serve</li></ol>");
        assert_eq!(markdown, "3.  Rest\n4.  Serve");
    }

    #[test]
    fn test_headings() {
        let converter = MarkdownConverter::paprika();
        let markdown = converter.convert("<h1>Soup</h1><h2>Base</h2><h3>Stock</h3><p>Simmer.</p>");
        assert_eq!(markdown, "Soup\n====\n\nBase\n----\n\n### Stock\n\nSimmer.");
    }

    #[test]
    fn test_custom_rule_overrides_default() {
        struct Quote;
        impl BlockRule for Quote {
            fn matches(&self, tag: &str) -> bool {
                tag == "blockquote"
            }
            fn replacement(&self, content: &str) -> String {
                format!("> {content}\n")
            }
        }

        let converter = MarkdownConverter::paprika().with_rule(Quote);
        assert_eq!(
            converter.convert("<blockquote>Grandma says</blockquote><p>hi</p>"),
            "> Grandma says\nhi"
        );
    }

    #[test]
    fn test_empty_fragment() {
        assert_eq!(MarkdownConverter::paprika().convert(""), "");
        assert_eq!(MarkdownConverter::paprika().convert("  \n "), "");
    }
}
