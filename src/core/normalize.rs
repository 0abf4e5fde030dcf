/// Width of a full district code.
pub const CODE_WIDTH: usize = 6;
/// Width of each department/province/district segment.
pub const PART_WIDTH: usize = 2;

/// Canonical display form of a place name.
///
/// Whitespace runs collapse to one space, the ends are trimmed and every
/// word is title-cased (first character upper, rest lower). There is no
/// exception list for particles: `"SAN JUAN DE LA FRONTERA"` becomes
/// `"San Juan De La Frontera"`.
pub fn normalize_name(value: &str) -> String {
    value
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        // ß -> "SS" would not survive a second pass; keep such letters lowercase
        Some(first) if first.to_uppercase().len() > 1 => {
            std::iter::once(first).chain(chars).collect()
        }
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Coerce a loosely formatted code into a six digit identifier.
///
/// Non-digits are stripped and the rest is left-padded with `'0'`. A residue
/// longer than six digits is returned as is.
pub fn normalize_code(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    format!("{:0>width$}", digits, width = CODE_WIDTH)
}

/// Left-pad one code segment to two characters. Longer input is kept.
pub fn pad_part(part: &str) -> String {
    format!("{:0>width$}", part, width = PART_WIDTH)
}

/// `true` for the all-zero sentinel meaning "no code assigned".
pub fn is_unassigned(code: &str) -> bool {
    code.chars().all(|c| c == '0')
}

/// Normalize an optional code, treating the all-zero sentinel as absent.
pub fn normalize_optional_code(value: Option<&str>) -> Option<String> {
    value
        .map(normalize_code)
        .filter(|code| !is_unassigned(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  SAN   JUAN de   lurigancho "), "San Juan De Lurigancho");
        assert_eq!(normalize_name("ÑAHUIMPUQUIO"), "Ñahuimpuquio");
        assert_eq!(normalize_name("santa\trosa\nde quives"), "Santa Rosa De Quives");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn test_normalize_name_is_idempotent() {
        for input in [
            "ANCÓN",
            "  la   victoria",
            "Huánuco",
            "VILLA MARÍA DEL TRIUNFO",
            "ßa",
            "ŉ STRASSE",
        ] {
            let once = normalize_name(input);
            assert_eq!(normalize_name(&once), once);
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("150122"), "150122");
        assert_eq!(normalize_code("15-01-22"), "150122");
        assert_eq!(normalize_code("10101"), "010101");
        assert_eq!(normalize_code(" 01 01 01 "), "010101");
        assert_eq!(normalize_code(""), "000000");
        assert_eq!(normalize_code("abc"), "000000");
        assert_eq!(normalize_code("12345678"), "12345678");
    }

    #[test]
    fn test_normalize_code_is_idempotent() {
        for input in ["1-5-0-1-2-2", "7", "12345678"] {
            let once = normalize_code(input);
            assert_eq!(normalize_code(&once), once);
        }
    }

    #[test]
    fn test_pad_part() {
        assert_eq!(pad_part("1"), "01");
        assert_eq!(pad_part("15"), "15");
        assert_eq!(pad_part(""), "00");
        assert_eq!(pad_part("150"), "150");
    }

    #[test]
    fn test_optional_code_drops_sentinel() {
        assert_eq!(normalize_optional_code(Some("150140")), Some("150140".to_string()));
        assert_eq!(normalize_optional_code(Some("000000")), None);
        assert_eq!(normalize_optional_code(Some("")), None);
        assert_eq!(normalize_optional_code(None), None);
    }
}
