// HTML sanitization for post bodies

use std::collections::{HashMap, HashSet};

use ammonia::Builder;

/// Tags a post body may contain
const ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "b", "strong", "i", "em", "u", "s", "strike", "del", "p",
    "ul", "ol", "li", "blockquote", "a", "img",
];

/// URL schemes allowed in href/src
const ALLOWED_SCHEMES: &[&str] = &["http", "data"];

/// List excerpts are cut to this many characters
pub const EXCERPT_CHARS: usize = 200;

fn allow_list() -> Builder<'static> {
    let mut tag_attributes: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
    tag_attributes.insert("a", ["href", "name", "target"].into_iter().collect());
    tag_attributes.insert("img", ["src"].into_iter().collect());
    tag_attributes.insert("li", ["class"].into_iter().collect());

    let mut builder = Builder::default();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect())
        .generic_attributes(HashSet::new())
        .tag_attributes(tag_attributes)
        .url_schemes(ALLOWED_SCHEMES.iter().copied().collect());
    builder
}

/// Clean `html` against the post body allow-list.
/// Disallowed tags are dropped (script/style with their content).
pub fn sanitize_body(html: &str) -> String {
    allow_list().clean(html).to_string()
}

/// Plain-text excerpt: all markup removed, cut to `max_chars` characters
/// with a trailing `...` when anything was cut.
/// Characters are counted on the unescaped text; the result is escaped again.
pub fn excerpt(html: &str, max_chars: usize) -> String {
    let text = unescape_text(&Builder::empty().clean(html).to_string());
    if text.chars().count() <= max_chars {
        return escape_text(&text);
    }
    let cut: String = text.chars().take(max_chars).collect();
    let mut short = escape_text(&cut);
    short.push_str("...");
    short
}

/// Entities ammonia's serializer emits in text nodes
const TEXT_ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&nbsp;", '\u{a0}'),
];

fn unescape_text(escaped: &str) -> String {
    let mut text = String::with_capacity(escaped.len());
    let mut rest = escaped;
    while let Some(pos) = rest.find('&') {
        text.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match TEXT_ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
        {
            Some((entity, ch)) => {
                text.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                text.push('&');
                rest = &rest[1..];
            }
        }
    }
    text.push_str(rest);
    text
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match TEXT_ENTITIES.iter().find(|(_, c)| *c == ch) {
            Some((entity, _)) => escaped.push_str(entity),
            None => escaped.push(ch),
        }
    }
    escaped
}
