use anyhow::{anyhow, Result};

/// Replaces every character outside 7-bit ASCII with a decimal numeric
/// character reference, e.g. `é` becomes `&#233;`.
pub(crate) fn to_ascii_charrefs(s: &str) -> String {
    if s.is_ascii() {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            out.push_str(&format!("&#{};", u32::from(c)));
        }
    }
    out
}

pub(crate) fn ascii_opt(s: Option<&str>) -> Option<String> {
    s.map(to_ascii_charrefs)
}

pub(crate) fn single_byte(s: &str) -> Result<u8> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(anyhow!("Delimiter must be a single ASCII character, got {:?}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        assert_eq!(to_ascii_charrefs("Called Strike"), "Called Strike");
    }

    #[test]
    fn non_ascii_becomes_charref() {
        assert_eq!(
            to_ascii_charrefs("Jos\u{e9} Reyes singles"),
            "Jos&#233; Reyes singles"
        );
        assert_eq!(to_ascii_charrefs("\u{1F600}"), "&#128512;");
    }

    #[test]
    fn delimiter_parsing() {
        assert_eq!(single_byte(",").unwrap(), b',');
        assert_eq!(single_byte("tab").unwrap(), b'\t');
        assert!(single_byte(";;").is_err());
        assert!(single_byte("\u{e9}").is_err());
    }
}
