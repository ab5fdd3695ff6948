//! Validated request payloads and the helpers shared by them.

use chrono::NaiveTime;

pub mod cart;
pub mod checkout;
pub mod menu;
pub mod orders;
pub mod staff;
pub mod tables;
pub mod tenants;
pub mod waiter;

/// Collapses whitespace runs and strips control characters.
pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Sanitizes each line and squeezes consecutive blank lines.
pub(crate) fn sanitize_multiline_text(input: &str) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut previous_empty = true;

    for line in input.lines().map(sanitize_inline_text) {
        if line.is_empty() {
            if !previous_empty {
                result.push(String::new());
            }
            previous_empty = true;
        } else {
            result.push(line);
            previous_empty = false;
        }
    }

    while matches!(result.last(), Some(line) if line.is_empty()) {
        result.pop();
    }

    result.join("\n")
}

/// Sanitized optional text, `None` when blank.
pub(crate) fn optional_inline(value: Option<&str>) -> Option<String> {
    value
        .map(sanitize_inline_text)
        .filter(|value| !value.is_empty())
}

pub(crate) fn optional_multiline(value: Option<&str>) -> Option<String> {
    value
        .map(sanitize_multiline_text)
        .filter(|value| !value.is_empty())
}

/// URL-safe identifier derived from `input`, e.g. `Café con leche` →
/// `cafe-con-leche`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.trim().chars().flat_map(char::to_lowercase) {
        let ch = match ch {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        };

        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Parses `HH:MM` or `HH:MM:SS`; blank input yields `None`.
pub(crate) fn parse_optional_time(value: Option<&str>) -> Result<Option<NaiveTime>, String> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map(Some)
        .map_err(|_| raw.to_string())
}

/// Removes non-positive and duplicate identifiers, keeping the first
/// occurrence order.
pub(crate) fn unique_ids(ids: Vec<i32>) -> Vec<i32> {
    let mut normalized: Vec<i32> = Vec::with_capacity(ids.len());
    for id in ids {
        if id > 0 && !normalized.contains(&id) {
            normalized.push(id);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_text_collapses_whitespace() {
        assert_eq!(sanitize_inline_text("  Lomo \t saltado\u{0007} "), "Lomo saltado");
    }

    #[test]
    fn multiline_text_squeezes_blank_lines() {
        let input = "\n\nPrimera  línea\n\n\n  segunda\n\n";
        assert_eq!(sanitize_multiline_text(input), "Primera línea\n\nsegunda");
    }

    #[test]
    fn slugify_strips_accents_and_symbols() {
        assert_eq!(slugify("Café con Leche!"), "cafe-con-leche");
        assert_eq!(slugify("  Piña   Colada  "), "pina-colada");
        assert_eq!(slugify("¡¡¡"), "");
    }

    #[test]
    fn optional_time_accepts_short_and_long_forms() {
        assert_eq!(
            parse_optional_time(Some("07:30")),
            Ok(NaiveTime::from_hms_opt(7, 30, 0))
        );
        assert_eq!(
            parse_optional_time(Some("22:15:00")),
            Ok(NaiveTime::from_hms_opt(22, 15, 0))
        );
        assert_eq!(parse_optional_time(Some(" ")), Ok(None));
        assert!(parse_optional_time(Some("25:00")).is_err());
    }

    #[test]
    fn unique_ids_drops_duplicates_and_invalid() {
        assert_eq!(unique_ids(vec![3, 0, 3, -1, 2]), vec![3, 2]);
    }
}
