//! Text normalization helpers shared by the analyzer, agents and cache.
//!
//! The regulation tables mix accented and unaccented spellings, so every
//! lookup works over a folded form: lowercase, accents stripped,
//! whitespace collapsed.

/// Strip Portuguese diacritics, mapping each accented letter to its base.
pub fn strip_accents(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            'ñ' => 'n',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

/// Canonical form used for cache keys and keyword matching: lowercase,
/// unaccented, single-spaced.
pub fn normalize_query(input: &str) -> String {
    let folded = strip_accents(&input.to_lowercase());
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// FNV-1a 64-bit hash of the normalized query, rendered in lowercase hex.
///
/// Stable across processes, unlike the standard library's hasher, so keys
/// persisted in the cache table survive restarts.
pub fn cache_key(query: &str) -> String {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in normalize_query(query).as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{hash:016x}")
}

/// Whitespace token count of the raw query.
pub fn token_count(input: &str) -> usize {
    input.split_whitespace().count()
}

/// Whether the phrase looks like a place name: letters, spaces and a few
/// separators only, no digits.
pub fn looks_like_place_name(input: &str) -> bool {
    let trimmed = input.trim().trim_end_matches(['?', '.', '!']);
    !trimmed.is_empty()
        && trimmed.chars().all(|c| {
            c.is_alphabetic() || c.is_whitespace() || c == '\'' || c == '-' || c == '.'
        })
}

/// Spelling variants to try against the relational store: the canonical
/// uppercase form plus its unaccented sibling.
pub fn search_patterns(name: &str) -> Vec<String> {
    let upper = name.trim().to_uppercase();
    let unaccented = strip_accents(&upper);
    let mut patterns = vec![upper];
    if !patterns.contains(&unaccented) {
        patterns.push(unaccented);
    }
    patterns
}

/// Normalize a zone mention to canonical `ZOT NN[.N][A|B|C]` form.
///
/// Accepts `zot 7`, `ZOT07`, `zona 7`, `zot 8.3`, `zot 8.3b` and the like.
/// Returns `None` when the text does not carry a zone number.
pub fn normalize_zone(input: &str) -> Option<String> {
    let folded = normalize_query(input);
    let rest = folded
        .strip_prefix("zot")
        .or_else(|| folded.strip_prefix("zona"))?
        .trim_start();

    let mut digits = String::new();
    let mut subdivision = String::new();
    let mut letter = None;
    let mut chars = rest.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            digits.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if digits.is_empty() {
        return None;
    }

    if chars.peek() == Some(&'.') {
        chars.next();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                subdivision.push(c);
                chars.next();
            } else {
                break;
            }
        }
    }

    // Optional letter suffix, with or without separator: "8.3b", "8.3-b".
    while let Some(&c) = chars.peek() {
        if c == '-' || c == ' ' {
            chars.next();
        } else {
            break;
        }
    }
    if let Some(&c) = chars.peek() {
        if matches!(c, 'a' | 'b' | 'c') {
            letter = Some(c.to_ascii_uppercase());
        }
    }

    let number: u32 = digits.parse().ok()?;
    let mut canonical = format!("ZOT {number:02}");
    if !subdivision.is_empty() {
        canonical.push('.');
        canonical.push_str(&subdivision);
    }
    if let Some(l) = letter {
        canonical.push(l);
    }
    Some(canonical)
}

/// Extract every canonical zone code mentioned in a query.
pub fn extract_zones(query: &str) -> Vec<String> {
    let folded = normalize_query(query);
    let mut zones = Vec::new();
    let bytes = folded.as_bytes();

    for (idx, _) in folded.match_indices("zot").chain(folded.match_indices("zona")) {
        // Skip matches inside a longer word ("zonas" is fine, "amazot" not).
        if idx > 0 && bytes[idx - 1].is_ascii_alphanumeric() {
            continue;
        }
        if let Some(zone) = normalize_zone(&folded[idx..]) {
            if !zones.contains(&zone) {
                zones.push(zone);
            }
        }
    }
    zones
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_query_folds_accents_and_whitespace() {
        assert_eq!(
            normalize_query("  Três   FIGUEIRAS\t"),
            "tres figueiras"
        );
        assert_eq!(normalize_query("Petrópolis"), "petropolis");
    }

    #[test]
    fn cache_key_is_stable_for_spelling_variants() {
        assert_eq!(cache_key("Três Figueiras"), cache_key("tres  figueiras"));
        assert_ne!(cache_key("boa vista"), cache_key("boa vista do sul"));
    }

    #[test]
    fn zone_normalization_pads_and_uppercases() {
        assert_eq!(normalize_zone("zot 7").as_deref(), Some("ZOT 07"));
        assert_eq!(normalize_zone("ZONA 12").as_deref(), Some("ZOT 12"));
        assert_eq!(normalize_zone("zot07").as_deref(), Some("ZOT 07"));
        assert_eq!(normalize_zone("zot 8.3").as_deref(), Some("ZOT 08.3"));
        assert_eq!(normalize_zone("zot 8.3b").as_deref(), Some("ZOT 08.3B"));
        assert_eq!(normalize_zone("zot 8.3-c").as_deref(), Some("ZOT 08.3C"));
        assert_eq!(normalize_zone("zoneamento"), None);
    }

    #[test]
    fn extract_zones_finds_all_mentions() {
        let zones = extract_zones("diferença entre a ZOT 7 e a zona 8.3b");
        assert_eq!(zones, vec!["ZOT 07".to_string(), "ZOT 08.3B".to_string()]);
    }

    #[test]
    fn place_name_detection_rejects_digits() {
        assert!(looks_like_place_name("três figueiras"));
        assert!(looks_like_place_name("Boa Vista do Sul?"));
        assert!(!looks_like_place_name("zot 12"));
        assert!(!looks_like_place_name(""));
    }

    #[test]
    fn search_patterns_include_unaccented_variant() {
        let patterns = search_patterns("Três Figueiras");
        assert_eq!(patterns[0], "TRÊS FIGUEIRAS");
        assert!(patterns.contains(&"TRES FIGUEIRAS".to_string()));

        // Already-unaccented names produce a single pattern.
        assert_eq!(search_patterns("CRISTAL").len(), 1);
    }
}
