//! Archive path arithmetic.
//!
//! Documents refer to each other with relative, possibly percent-encoded
//! references such as `../Images/cover%20art.png#top`. Everything in the
//! store is keyed by a canonical archive path (`OEBPS/Images/cover art.png`),
//! so references are resolved to that form before comparison and relativized
//! again before they are written back.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

/// Bytes escaped inside a single path segment when writing an href.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Bytes escaped inside a fragment identifier.
const FRAGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// A reference resolved against the document that contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: String,
    pub fragment: Option<String>,
}

impl Resolved {
    /// True when the resolved path addresses `path` exactly.
    pub fn targets(&self, path: &str) -> bool {
        self.path == path
    }
}

/// Split `reference` at the first `#`.
pub fn split_fragment(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (reference, None),
    }
}

/// True for references carrying a URL scheme (`http:`, `mailto:`) or a
/// network path (`//host/...`). These never address an archive entry.
pub fn is_external(reference: &str) -> bool {
    if reference.starts_with("//") {
        return true;
    }
    let Some((scheme, _)) = reference.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// True for references that only carry a fragment (`#note-1`) and therefore
/// point back into the containing document.
pub fn is_fragment_only(reference: &str) -> bool {
    split_fragment(reference).0.is_empty()
}

/// Resolve `reference` against the document at `base_path`.
///
/// The path part is percent-decoded and joined to the directory of
/// `base_path`, with `.` and `..` segments collapsed. A leading `/` anchors
/// the reference at the archive root. External references are returned
/// unchanged apart from the split-off fragment.
pub fn resolve(reference: &str, base_path: &str) -> Resolved {
    let (raw_path, raw_fragment) = split_fragment(reference);
    let fragment = raw_fragment.map(decode);

    if is_external(reference) {
        return Resolved {
            path: raw_path.to_string(),
            fragment,
        };
    }

    let raw_path = raw_path.split_once('?').map_or(raw_path, |(path, _)| path);
    let decoded = decode(raw_path);

    let path = if decoded.is_empty() {
        normalize(base_path)
    } else if let Some(absolute) = decoded.strip_prefix('/') {
        normalize(absolute)
    } else {
        let dir = directory(base_path);
        if dir.is_empty() {
            normalize(&decoded)
        } else {
            normalize(&format!("{dir}/{decoded}"))
        }
    };

    Resolved { path, fragment }
}

/// Collapse empty, `.` and `..` segments. `..` above the root is dropped.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Directory part of an archive path, without a trailing slash.
pub fn directory(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

/// Last segment of an archive path.
pub fn file_name(path: &str) -> &str {
    path.rfind('/').map_or(path, |idx| &path[idx + 1..])
}

/// File name without its extension. Dot-files keep their leading dot.
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Extension without the dot, or `""` when the file name has none.
pub fn extension(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx + 1..],
        _ => "",
    }
}

/// Replace the last segment of `path` with `name`.
pub fn with_file_name(path: &str, name: &str) -> String {
    match directory(path) {
        "" => name.to_string(),
        dir => format!("{dir}/{name}"),
    }
}

/// Shortest relative reference from the document at `base_path` to
/// `target_path`, percent-encoded for use in an href or src attribute.
pub fn relativize(target_path: &str, base_path: &str) -> String {
    let base_dir: Vec<&str> = directory(base_path)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let target: Vec<&str> = target_path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((_, target_dir)) = target.split_last() else {
        return String::new();
    };

    let common = base_dir
        .iter()
        .zip(target_dir.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); base_dir.len() - common];
    parts.extend(target[common..].iter().map(|s| encode_segment(s)));
    parts.join("/")
}

/// Relative reference to `target_path` carrying an optional fragment.
pub fn relativize_with_fragment(
    target_path: &str,
    base_path: &str,
    fragment: Option<&str>,
) -> String {
    let relative = relativize(target_path, base_path);
    match fragment {
        Some(fragment) => format!("{relative}#{}", encode_fragment(fragment)),
        None => relative,
    }
}

/// Swap the fragment of `reference`, keeping its path part byte-for-byte.
pub fn replace_fragment(reference: &str, fragment: &str) -> String {
    let (path, _) = split_fragment(reference);
    format!("{path}#{}", encode_fragment(fragment))
}

pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

fn encode_fragment(fragment: &str) -> String {
    utf8_percent_encode(fragment, FRAGMENT).to_string()
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
