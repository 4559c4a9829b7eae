//! Minimal XML helpers for the callback envelope.
//!
//! The envelope is flat: one `<xml>` root with simple text children, values
//! either plain or CDATA-wrapped. A tag scan covers that; a full XML parser
//! is not pulled in for it.

/// Extract the text content of `<tag>...</tag>`, unwrapping CDATA.
///
/// Returns `None` when the tag is absent. Entity decoding covers the five
/// predefined XML entities, which is all the platform emits outside CDATA.
pub fn text_of(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = start + xml[start..].find(&close)?;
    let body = &xml[start..end];

    let body = body.trim();
    if let Some(inner) = body
        .strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
    {
        return Some(inner.to_string());
    }
    Some(unescape(body))
}

/// Extract a tag and parse it, falling back to the type default when the tag
/// is missing or malformed. Numeric envelope fields are optional or lenient
/// on the wire, so parse failures degrade instead of erroring.
pub fn number_of<T>(xml: &str, tag: &str) -> T
where
    T: std::str::FromStr + Default,
{
    text_of(xml, tag)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_default()
}

/// Write `<tag><![CDATA[value]]></tag>` into `out`.
pub fn push_cdata(out: &mut String, tag: &str, value: &str) {
    out.push('<');
    out.push_str(tag);
    out.push_str("><![CDATA[");
    out.push_str(value);
    out.push_str("]]></");
    out.push_str(tag);
    out.push('>');
}

/// Write `<tag>value</tag>` into `out` (numbers and other raw values).
pub fn push_text(out: &mut String, tag: &str, value: impl std::fmt::Display) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&value.to_string());
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
