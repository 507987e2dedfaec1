//! Geometry-agnostic line-offset scanner plus small text post-processing
//! helpers shared by the field pipelines.

/// Case-insensitive substring test against a keyword set.
pub fn contains_any(line: &str, keywords: &[&str]) -> bool {
    let lower = line.to_lowercase();
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}

/// Case-insensitive prefix test against a stop-keyword set.
pub fn starts_with_any(line: &str, stops: &[&str]) -> bool {
    let lower = line.to_lowercase();
    stops.iter().any(|s| lower.starts_with(&s.to_lowercase()))
}

/// Locate the first line containing any label keyword and return the next
/// `count` non-blank lines joined by a space, stopping early at a line
/// beginning with a stop keyword. Returns `""` when no label line exists.
pub fn scan_after(keywords: &[&str], lines: &[String], count: usize, stops: &[&str]) -> String {
    let Some(label_idx) = lines.iter().position(|l| contains_any(l, keywords)) else {
        return String::new();
    };

    let mut collected = Vec::new();
    for line in lines.iter().skip(label_idx + 1) {
        if starts_with_any(line, stops) {
            break;
        }
        collected.push(line.as_str());
        if collected.len() >= count {
            break;
        }
    }

    collected.join(" ")
}

/// Truncate at the first occurrence of any delimiter character.
pub fn truncate_before(value: &str, delimiters: &[char]) -> String {
    value
        .split(|c| delimiters.contains(&c))
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Leading run of uppercase letters, slashes, spaces, and hyphens — the
/// shape of an airport name or code on an AWB form.
pub fn leading_upper_run(value: &str) -> String {
    value
        .chars()
        .take_while(|c| c.is_ascii_uppercase() || matches!(c, '/' | ' ' | '-'))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scan_returns_following_lines_joined() {
        let lines = lines(&["3. CONSIGNED TO", "GLOBAL IMPORTS LLC", "45 HARBOR WAY"]);
        assert_eq!(
            scan_after(&["CONSIGNED TO"], &lines, 2, &[]),
            "GLOBAL IMPORTS LLC 45 HARBOR WAY"
        );
    }

    #[test]
    fn scan_stops_at_stop_keyword() {
        let lines = lines(&["CONSIGNEE", "GLOBAL IMPORTS LLC", "ATTN: JOHN", "45 HARBOR WAY"]);
        assert_eq!(
            scan_after(&["CONSIGNEE"], &lines, 3, &["C/O", "ATTN", "ADDRESS", "TEL", "FAX"]),
            "GLOBAL IMPORTS LLC"
        );
    }

    #[test]
    fn scan_without_label_is_empty() {
        let lines = lines(&["NOTHING RELEVANT"]);
        assert_eq!(scan_after(&["SHIPPER"], &lines, 1, &[]), "");
    }

    #[test]
    fn scan_keyword_match_is_case_insensitive() {
        let lines = lines(&["port of loading", "SHANGHAI, CHINA"]);
        assert_eq!(scan_after(&["PORT OF LOADING"], &lines, 1, &[]), "SHANGHAI, CHINA");
    }

    #[test]
    fn truncate_cuts_at_first_delimiter() {
        assert_eq!(truncate_before("Acme Trading Co., Unit 4", &[',', '(']), "Acme Trading Co.");
        assert_eq!(truncate_before("Acme (HK) Ltd", &[',', '(']), "Acme");
        assert_eq!(truncate_before("SHANGHAI, CHINA", &[',']), "SHANGHAI");
    }

    #[test]
    fn leading_upper_run_trims_trailing_noise() {
        assert_eq!(leading_upper_run("HONG KONG 14 Jun"), "HONG KONG");
        assert_eq!(leading_upper_run("LAX/ORD via"), "LAX/ORD");
        assert_eq!(leading_upper_run("lowercase"), "");
    }
}
