//! Fragment extraction
//!
//! Pure string helpers that turn a raw address into a normalized route
//! fragment. Normalization removes exactly one leading `#` or `/` plus
//! any trailing whitespace.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Normalize a raw fragment: trim trailing whitespace, strip a single
/// leading `#` or `/`.
pub(crate) fn strip(fragment: &str) -> String {
    let fragment = fragment.trim_end();
    fragment
        .strip_prefix('#')
        .or_else(|| fragment.strip_prefix('/'))
        .unwrap_or(fragment)
        .to_string()
}

/// Everything after the first `#` of the full address, or empty.
pub(crate) fn hash(href: &str) -> String {
    match href.split_once('#') {
        Some((_, fragment)) => fragment.to_string(),
        None => String::new(),
    }
}

/// Path plus query string, percent-decoded, with the root prefix and a
/// single leading `/` stripped.
pub(crate) fn path(pathname: &str, search: &str, root: &str) -> String {
    let raw = format!("{}{}", pathname, search);
    let decoded: Cow<'_, str> = percent_decode_str(&raw).decode_utf8_lossy();
    let mut path = decoded.as_ref();

    // Root prefix comparison uses the root without its trailing slash,
    // so root "/app/" strips "/app" and leaves the separator for the
    // leading-slash strip below.
    let root = root.strip_suffix('/').unwrap_or(root);
    if let Some(rest) = path.strip_prefix(root) {
        path = rest;
    }

    path.strip_prefix('/').unwrap_or(path).to_string()
}

/// The first `?...` substring of the address with the fragment removed,
/// or empty when there is no query (a bare trailing `?` does not count).
pub(crate) fn search(href: &str) -> String {
    let head = match href.split_once('#') {
        Some((head, _)) => head,
        None => href,
    };

    match head.find('?') {
        Some(index) if index + 1 < head.len() => head[index..].to_string(),
        _ => String::new(),
    }
}

/// Truncate an address at the first `javascript:` scheme prefix or `#`
/// fragment marker, whichever comes first.
pub(crate) fn strip_hash_or_js(href: &str) -> &str {
    let js = href.find("javascript:");
    let hash = href.find('#');

    match (js, hash) {
        (Some(a), Some(b)) => &href[..a.min(b)],
        (Some(a), None) => &href[..a],
        (None, Some(b)) => &href[..b],
        (None, None) => href,
    }
}
