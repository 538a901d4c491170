//! Filename slugification: lowercase ASCII, `[a-z0-9._-]+`, no leading
//! or trailing dots. Non-ASCII characters are transliterated where a
//! plain ASCII fold exists, else stripped.

pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_dash = false;

    for ch in input.trim().chars() {
        let folded = transliterate(ch);
        for c in folded.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_lowercase());
                last_was_dash = false;
            } else if matches!(c, '.' | '_') {
                out.push(c);
                last_was_dash = false;
            } else if !last_was_dash {
                out.push('-');
                last_was_dash = true;
            }
        }
    }

    let trimmed = out.trim_matches(|c| c == '-' || c == '.');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Best-effort ASCII transliteration for a handful of common Latin
/// diacritics; anything else passes through unchanged and is stripped
/// by the caller if it isn't ASCII alphanumeric.
fn transliterate(ch: char) -> String {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a".to_string(),
        'è' | 'é' | 'ê' | 'ë' => "e".to_string(),
        'ì' | 'í' | 'î' | 'ï' => "i".to_string(),
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => "o".to_string(),
        'ù' | 'ú' | 'û' | 'ü' => "u".to_string(),
        'ñ' => "n".to_string(),
        'ç' => "c".to_string(),
        other if other.is_ascii() => other.to_string(),
        _ => String::new(),
    }
}

/// Appends a numeric suffix before the extension, used to disambiguate
/// multiple recipes from the same page that would otherwise collide on
/// slug.
pub fn with_numeric_suffix(stem: &str, extension: &str, n: usize) -> String {
    if n <= 1 {
        format!("{stem}.{extension}")
    } else {
        format!("{stem}-{n}.{extension}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_dashes_whitespace() {
        assert_eq!(slugify("Chocolate Chip Cookies"), "chocolate-chip-cookies");
    }

    #[test]
    fn transliterates_common_diacritics() {
        assert_eq!(slugify("Crème Brûlée"), "creme-brulee");
    }

    #[test]
    fn strips_leading_trailing_punctuation() {
        assert_eq!(slugify("  ...Soup!!!  "), "soup");
    }

    #[test]
    fn empty_input_is_untitled() {
        assert_eq!(slugify("   "), "untitled");
    }

    #[test]
    fn numeric_suffix_only_applied_past_first() {
        assert_eq!(with_numeric_suffix("soup", "yaml", 1), "soup.yaml");
        assert_eq!(with_numeric_suffix("soup", "yaml", 2), "soup-2.yaml");
    }
}
