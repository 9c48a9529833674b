//! Fixed gazetteer of the municipality's 94 neighborhoods.
//!
//! Matching is accent-insensitive and longest-match-first: a name that is a
//! strict prefix of another ("BOA VISTA" vs "BOA VISTA DO SUL") is only
//! matched when the longer phrase is absent from the query.

use crate::services::text::normalize_query;

/// Canonical neighborhood names, uppercase with accents preserved.
pub const NEIGHBORHOODS: &[&str] = &[
    "ABERTA DOS MORROS",
    "AGRONOMIA",
    "ANCHIETA",
    "ARQUIPÉLAGO",
    "AUXILIADORA",
    "AZENHA",
    "BELA VISTA",
    "BELÉM NOVO",
    "BELÉM VELHO",
    "BOA VISTA",
    "BOA VISTA DO SUL",
    "BOM FIM",
    "BOM JESUS",
    "CAMAQUÃ",
    "CAMPO NOVO",
    "CASCATA",
    "CAVALHADA",
    "CEL. APARICIO BORGES",
    "CENTRO HISTÓRICO",
    "CHAPÉU DO SOL",
    "CHÁCARA DAS PEDRAS",
    "CIDADE BAIXA",
    "COSTA E SILVA",
    "CRISTAL",
    "CRISTO REDENTOR",
    "ESPÍRITO SANTO",
    "EXTREMA",
    "FARRAPOS",
    "FARROUPILHA",
    "FLORESTA",
    "GLÓRIA",
    "GUARUJÁ",
    "HIGIENÓPOLIS",
    "HUMAITÁ",
    "HÍPICA",
    "INDEPENDÊNCIA",
    "IPANEMA",
    "JARDIM BOTÂNICO",
    "JARDIM CARVALHO",
    "JARDIM DO SALSO",
    "JARDIM EUROPA",
    "JARDIM FLORESTA",
    "JARDIM ISABEL",
    "JARDIM ITU",
    "JARDIM LEOPOLDINA",
    "JARDIM LINDÓIA",
    "JARDIM SABARÁ",
    "JARDIM SÃO PEDRO",
    "LAGEADO",
    "LAMI",
    "LOMBA DO PINHEIRO",
    "MEDIANEIRA",
    "MENINO DEUS",
    "MOINHOS DE VENTO",
    "MONT SERRAT",
    "MORRO SANTANA",
    "MÁRIO QUINTANA",
    "NAVEGANTES",
    "NONOAI",
    "PARQUE SANTA FÉ",
    "PARTENON",
    "PASSO DA AREIA",
    "PASSO DAS PEDRAS",
    "PEDRA REDONDA",
    "PETRÓPOLIS",
    "PITINGA",
    "PONTA GROSSA",
    "PRAIA DE BELAS",
    "RESTINGA",
    "RIO BRANCO",
    "RUBEM BERTA",
    "SANTA CECÍLIA",
    "SANTA MARIA GORETTI",
    "SANTA ROSA DE LIMA",
    "SANTA TEREZA",
    "SANTANA",
    "SANTO ANTÔNIO",
    "SARANDI",
    "SERRARIA",
    "SÃO CAETANO",
    "SÃO GERALDO",
    "SÃO JOÃO",
    "SÃO SEBASTIÃO",
    "SÉTIMO CÉU",
    "TERESÓPOLIS",
    "TRISTEZA",
    "TRÊS FIGUEIRAS",
    "VILA ASSUNÇÃO",
    "VILA CONCEIÇÃO",
    "VILA IPIRANGA",
    "VILA JARDIM",
    "VILA JOÃO PESSOA",
    "VILA NOVA",
    "VILA SÃO JOSÉ",
];

/// Alternative spellings mapped to their canonical entry.
const ALIASES: &[(&str, &str)] = &[("montserrat", "MONT SERRAT")];

/// The city itself is never a neighborhood entity.
const CITY_NAME: &str = "porto alegre";

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before_ok = start == 0
        || text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
    let after_ok = end == text.len()
        || text[end..].chars().next().is_none_or(|c| !c.is_alphanumeric());
    before_ok && after_ok
}

/// Extract every neighborhood named in the query, canonical form.
///
/// Longest names are matched first and claim their span of the query, so a
/// shorter name that only occurs inside an already-matched span (the
/// "BOA VISTA" inside "BOA VISTA DO SUL") is never reported.
pub fn find_neighborhoods(query: &str) -> Vec<String> {
    let folded = normalize_query(query);
    if folded.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<(String, String)> = NEIGHBORHOODS
        .iter()
        .map(|name| (normalize_query(name), (*name).to_string()))
        .chain(
            ALIASES
                .iter()
                .map(|(alias, canonical)| ((*alias).to_string(), (*canonical).to_string())),
        )
        .collect();
    candidates.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut found = Vec::new();

    for (needle, canonical) in candidates {
        let mut search_from = 0;
        while let Some(rel) = folded[search_from..].find(&needle) {
            let start = search_from + rel;
            let end = start + needle.len();
            search_from = start + 1;

            if !is_word_boundary(&folded, start, end) {
                continue;
            }
            if claimed.iter().any(|&(s, e)| start < e && s < end) {
                continue;
            }
            claimed.push((start, end));
            if !found.contains(&canonical) {
                found.push(canonical.clone());
            }
        }
    }
    found
}

/// Whether the whole (short) query is itself a known neighborhood name.
pub fn is_neighborhood(phrase: &str) -> bool {
    let folded = normalize_query(phrase.trim().trim_end_matches(['?', '.', '!']));
    if folded == CITY_NAME {
        return false;
    }
    NEIGHBORHOODS
        .iter()
        .any(|name| normalize_query(name) == folded)
        || ALIASES.iter().any(|(alias, _)| *alias == folded)
}

/// Whether the query mentions the city name itself.
pub fn mentions_city(query: &str) -> bool {
    normalize_query(query).contains(CITY_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longer_name_wins_over_strict_prefix() {
        let found = find_neighborhoods("o que posso construir em boa vista do sul?");
        assert_eq!(found, vec!["BOA VISTA DO SUL".to_string()]);
    }

    #[test]
    fn prefix_name_matches_when_longer_is_absent() {
        let found = find_neighborhoods("qual a altura máxima na boa vista");
        assert_eq!(found, vec!["BOA VISTA".to_string()]);
    }

    #[test]
    fn both_names_found_when_both_present() {
        let found =
            find_neighborhoods("compare boa vista do sul com boa vista");
        assert!(found.contains(&"BOA VISTA DO SUL".to_string()));
        assert!(found.contains(&"BOA VISTA".to_string()));
    }

    #[test]
    fn accent_insensitive_matching() {
        let found = find_neighborhoods("indices do petropolis");
        assert_eq!(found, vec!["PETRÓPOLIS".to_string()]);

        let found = find_neighborhoods("três figueiras");
        assert_eq!(found, vec!["TRÊS FIGUEIRAS".to_string()]);
    }

    #[test]
    fn alias_resolves_to_canonical() {
        let found = find_neighborhoods("regime urbanístico do montserrat");
        assert_eq!(found, vec!["MONT SERRAT".to_string()]);
    }

    #[test]
    fn word_boundaries_prevent_partial_matches() {
        // "lami" must not match inside "lamina".
        assert!(find_neighborhoods("lamina de vidro").is_empty());
    }

    #[test]
    fn city_name_is_not_a_neighborhood() {
        assert!(!is_neighborhood("porto alegre"));
        assert!(is_neighborhood("cristal"));
        assert!(is_neighborhood("Três Figueiras"));
    }
}
