use pulldown_cmark::{Options, Parser, html};
use serde_json::Value;

pub fn render_markdown_to_html(md: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(md, options);
    let mut html_out = String::new();
    html::push_html(&mut html_out, parser);
    html_out
}

/// HTML for a content field holding either Markdown text or a rich text
/// document. Other value shapes render nothing.
pub fn render_content_html(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(render_markdown_to_html(text)),
        Value::Object(_) if node_type(value) == Some("document") => {
            let mut out = String::new();
            push_children(value, &mut out);
            Some(out)
        }
        _ => None,
    }
}

fn node_type(node: &Value) -> Option<&str> {
    node.get("nodeType").and_then(Value::as_str)
}

fn push_children(node: &Value, out: &mut String) {
    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            push_node(child, out);
        }
    }
}

fn push_wrapped(tag: &str, node: &Value, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    push_children(node, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn push_node(node: &Value, out: &mut String) {
    let kind = node_type(node).unwrap_or_default();
    match kind {
        "text" => push_text(node, out),
        "paragraph" => push_wrapped("p", node, out),
        "unordered-list" => push_wrapped("ul", node, out),
        "ordered-list" => push_wrapped("ol", node, out),
        "list-item" => push_wrapped("li", node, out),
        "blockquote" => push_wrapped("blockquote", node, out),
        "hr" => out.push_str("<hr />"),
        "hyperlink" => {
            let uri = node
                .get("data")
                .and_then(|data| data.get("uri"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            out.push_str("<a href=\"");
            out.push_str(&escape_html_text(uri));
            out.push_str("\">");
            push_children(node, out);
            out.push_str("</a>");
        }
        _ => match heading_level(kind) {
            Some(level) => push_wrapped(&format!("h{level}"), node, out),
            None => push_children(node, out),
        },
    }
}

fn heading_level(kind: &str) -> Option<u8> {
    let level = kind.strip_prefix("heading-")?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn push_text(node: &Value, out: &mut String) {
    let text = node.get("value").and_then(Value::as_str).unwrap_or_default();
    let tags: Vec<&str> = node
        .get("marks")
        .and_then(Value::as_array)
        .map(|marks| {
            marks
                .iter()
                .filter_map(|mark| mark.get("type").and_then(Value::as_str))
                .filter_map(mark_tag)
                .collect()
        })
        .unwrap_or_default();
    for tag in &tags {
        out.push_str(&format!("<{tag}>"));
    }
    out.push_str(&escape_html_text(text));
    for tag in tags.iter().rev() {
        out.push_str(&format!("</{tag}>"));
    }
}

fn mark_tag(mark: &str) -> Option<&'static str> {
    match mark {
        "bold" => Some("strong"),
        "italic" => Some("em"),
        "underline" => Some("u"),
        "code" => Some("code"),
        _ => None,
    }
}

fn escape_html_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
