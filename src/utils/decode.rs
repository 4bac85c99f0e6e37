// src/utils/decode.rs

//! Charset detection for fetched HTML.
//!
//! Order: byte order mark, `Content-Type` charset, `<meta>` charset in the
//! head of the document, then UTF-8.

use encoding_rs::{Encoding, UTF_8};

/// How far into the document a `<meta>` charset declaration is looked for.
const META_SCAN_LIMIT: usize = 1024;

/// Decode raw HTML bytes into a string.
///
/// Malformed sequences are replaced rather than rejected.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_encoding(bytes, content_type);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::debug!("Malformed {} sequences replaced", encoding.name());
    }
    text.into_owned()
}

/// Pick the encoding for `bytes`.
pub fn detect_encoding(bytes: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    let lookup = |label: String| Encoding::for_label(label.as_bytes());
    content_type
        .and_then(header_charset)
        .and_then(lookup)
        .or_else(|| meta_charset(bytes).and_then(lookup))
        .unwrap_or(UTF_8)
}

fn header_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Find `charset=` inside the document head, covering both
/// `<meta charset="...">` and the `http-equiv` form.
fn meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SCAN_LIMIT)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(pos) = rest.find("<meta") {
        rest = &rest[pos..];
        let tag = &rest[..rest.find('>').unwrap_or(rest.len())];
        if let Some(at) = tag.find("charset=") {
            let value = tag[at + "charset=".len()..].trim_start_matches(['"', '\'', ' ']);
            let label: String = value
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
                .collect();
            if !label.is_empty() {
                return Some(label);
            }
        }
        rest = &rest["<meta".len()..];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{EUC_JP, SHIFT_JIS};

    fn sjis(text: &str) -> Vec<u8> {
        SHIFT_JIS.encode(text).0.into_owned()
    }

    #[test]
    fn header_charset_wins() {
        let bytes = sjis("<html><meta charset=\"euc-jp\">達人</html>");
        assert_eq!(
            detect_encoding(&bytes, Some("text/html; charset=Shift_JIS")),
            SHIFT_JIS
        );
    }

    #[test]
    fn meta_charset_used_without_header_charset() {
        let html = r#"<html><head><meta charset="Shift_JIS"></head><body>公開のお知らせ</body></html>"#;
        let bytes = sjis(html);
        assert_eq!(decode_html(&bytes, Some("text/html")), html);
    }

    #[test]
    fn http_equiv_meta_is_recognised() {
        let bytes = br#"<HTML><HEAD><META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=EUC-JP"></HEAD>"#;
        assert_eq!(detect_encoding(bytes, None), EUC_JP);
    }

    #[test]
    fn falls_back_to_utf8() {
        assert_eq!(detect_encoding("<p>達人</p>".as_bytes(), None), UTF_8);
        assert_eq!(detect_encoding(b"<p>x</p>", Some("text/html; charset=bogus")), UTF_8);
    }

    #[test]
    fn bom_overrides_everything() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("達人".as_bytes());
        assert_eq!(
            detect_encoding(&bytes, Some("text/html; charset=Shift_JIS")),
            UTF_8
        );
    }
}
