/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with("boundary="))
        .map(|s| s["boundary=".len()..].trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

/// One part of a multipart/form-data body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part<'a> {
    pub name:     String,
    pub filename: Option<String>,
    pub data:     &'a [u8],
}

/// Splits a multipart/form-data body into its named parts.
///
/// Parts without a `Content-Disposition` name (the preamble, the closing
/// `--` epilogue) are skipped.
pub fn parse_parts<'a>(body: &'a [u8], boundary: &str) -> Vec<Part<'a>> {
    let delimiter = format!("--{}", boundary);
    let sep = b"\r\n\r\n";

    split_on(body, delimiter.as_bytes())
        .into_iter()
        .filter_map(|part| {
            let sep_pos = find_subsequence(part, sep)?;
            let headers = String::from_utf8_lossy(&part[..sep_pos]);
            let disposition = headers
                .lines()
                .find(|line| line.to_ascii_lowercase().starts_with("content-disposition:"))?;
            let name = disposition_param(disposition, "name")?;
            let filename = disposition_param(disposition, "filename");

            let raw = &part[sep_pos + sep.len()..];
            let data = raw.strip_suffix(b"\r\n").unwrap_or(raw);
            Some(Part { name, filename, data })
        })
        .collect()
}

/// Reads `key="value"` (or an unquoted value) from a Content-Disposition
/// header line. `name` does not match inside `filename`.
fn disposition_param(line: &str, key: &str) -> Option<String> {
    line.split(';').skip(1).find_map(|param| {
        let (k, v) = param.trim().split_once('=')?;
        if k.trim().eq_ignore_ascii_case(key) {
            Some(v.trim().trim_matches('"').to_owned())
        } else {
            None
        }
    })
}

/// Raw bytes of the first part named `field_name`.
pub fn field_bytes<'a>(parts: &[Part<'a>], field_name: &str) -> Option<&'a [u8]> {
    parts.iter().find(|p| p.name == field_name).map(|p| p.data)
}

/// The first part named `field_name` as trimmed UTF-8 text.
pub fn text_field(parts: &[Part<'_>], field_name: &str) -> Option<String> {
    let bytes = field_bytes(parts, field_name)?;
    std::str::from_utf8(bytes).ok().map(|s| s.trim().to_owned())
}
