//! Text-to-markup rendering for multi-line free-text fields.
//!
//! The first line becomes a paragraph; each following non-empty line becomes
//! a bullet with one leading `•` stripped.

use crate::preview::document::{Element, Node};

const BULLET_GLYPH: char = '•';

/// Placeholder written instead of an empty string so preview elements keep
/// their height.
pub const BLANK: &str = " ";

/// Escapes `& < > "` for insertion into markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    pub paragraph: Option<String>,
    pub bullets: Vec<String>,
}

impl RichText {
    pub fn parse(text: &str) -> Self {
        let mut lines = text.split('\n');
        let paragraph = lines
            .next()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from);
        let bullets = lines
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| strip_bullet(l).to_string())
            .collect();
        Self { paragraph, bullets }
    }

    pub fn is_empty(&self) -> bool {
        self.paragraph.is_none() && self.bullets.is_empty()
    }

    /// Preview nodes: `<p>` then `<ul><li>..</li></ul>`, each omitted when empty.
    pub fn to_nodes(&self) -> Vec<Node> {
        let mut nodes = Vec::new();
        if let Some(p) = &self.paragraph {
            nodes.push(Element::new("p").with_text(p.clone()).into());
        }
        if !self.bullets.is_empty() {
            let list = self.bullets.iter().fold(Element::new("ul"), |ul, b| {
                ul.with_child(Element::new("li").with_text(b.clone()))
            });
            nodes.push(list.into());
        }
        nodes
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        if let Some(p) = &self.paragraph {
            html.push_str(&format!("<p>{}</p>", escape_html(p)));
        }
        if !self.bullets.is_empty() {
            html.push_str("<ul>");
            for b in &self.bullets {
                html.push_str(&format!("<li>{}</li>", escape_html(b)));
            }
            html.push_str("</ul>");
        }
        html
    }
}

fn strip_bullet(line: &str) -> &str {
    line.strip_prefix(BULLET_GLYPH)
        .map(str::trim_start)
        .unwrap_or(line)
}

/// Renders `text` into `target`, or a single blank when there is nothing to show.
pub fn write_rich_text(target: &mut Element, text: &str) {
    let rich = RichText::parse(text);
    if rich.is_empty() {
        target.set_text(BLANK);
    } else {
        target.replace_children(rich.to_nodes());
    }
}

/// Writes plain text, substituting the blank placeholder for empty values.
pub fn write_plain_text(target: &mut Element, text: &str) {
    if text.is_empty() {
        target.set_text(BLANK);
    } else {
        target.set_text(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_and_bullets() {
        let rich = RichText::parse("  Led the platform team  \n• Cut costs 30%\n\n   Hired 5 engineers \n");
        assert_eq!(rich.paragraph.as_deref(), Some("Led the platform team"));
        assert_eq!(rich.bullets, vec!["Cut costs 30%", "Hired 5 engineers"]);
    }

    #[test]
    fn test_blank_first_line_has_no_paragraph() {
        let rich = RichText::parse("\n- one\ntwo");
        assert_eq!(rich.paragraph, None);
        assert_eq!(rich.bullets, vec!["- one", "two"]);
    }

    #[test]
    fn test_only_one_glyph_stripped() {
        let rich = RichText::parse("intro\n•• double");
        assert_eq!(rich.bullets, vec!["• double"]);
    }

    #[test]
    fn test_crlf_lines() {
        let rich = RichText::parse("intro\r\n• a\r\n");
        assert_eq!(rich.paragraph.as_deref(), Some("intro"));
        assert_eq!(rich.bullets, vec!["a"]);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&lt;/a&gt;"
        );
    }

    #[test]
    fn test_to_html_escapes() {
        let html = RichText::parse("<script>alert(1)</script>\n<b>x</b>").to_html();
        assert_eq!(
            html,
            "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p><ul><li>&lt;b&gt;x&lt;/b&gt;</li></ul>"
        );
    }

    #[test]
    fn test_script_never_becomes_element() {
        let mut target = Element::new("div");
        write_rich_text(&mut target, "<script>evil()</script>\n<script>more()</script>");
        let mut scripts = Vec::new();
        target.descendants_by_tag("script", &mut scripts);
        assert!(scripts.is_empty());
        assert_eq!(target.text_content(), "<script>evil()</script><script>more()</script>");
    }

    #[test]
    fn test_whitespace_only_writes_blank() {
        let mut target = Element::new("div").with_text("old");
        write_rich_text(&mut target, "  \n \n");
        assert_eq!(target.text_content(), BLANK);
    }

    #[test]
    fn test_paragraph_without_bullets_omits_list() {
        let mut target = Element::new("div");
        write_rich_text(&mut target, "Just one line");
        assert_eq!(target.child_elements().count(), 1);
        assert_eq!(target.child_elements().next().unwrap().tag, "p");
    }
}
