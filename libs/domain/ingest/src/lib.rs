// [libs/domain/ingest/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOCUMENT TOKENIZATION ENGINE (V2.5 - DETERMINISTIC)
 * CLASIFICACIÓN: DOMAIN SCIENCE (ESTRATO L2)
 * RESPONSABILIDAD: LIMPIEZA Y DEDUPLICACIÓN DE TÉRMINOS DE DOCUMENTO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DETERMINISM LAW: Mismo texto → mismo conjunto ordenado de
 *    términos. La salida alimenta la síntesis de alias y su
 *    estabilidad es la base de la idempotencia del Ledger.
 * 2. NOISE ERADICATION: Stopwords de clase cerrada, artefactos
 *    bibliográficos, URLs, correos, cadenas puramente numéricas y
 *    tokens no-ASCII (emojis) se erradican antes de la síntesis.
 *
 * # Logic:
 * División sobre [^A-Za-z0-9+_.\-]+, minúsculas, longitud 2–40,
 * filtros semánticos, deduplicación por BTreeSet (orden total).
 * =================================================================
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

/// Longitud mínima de un término útil.
const TERM_MIN_LENGTH: usize = 2;
/// Longitud máxima de un término útil.
const TERM_MAX_LENGTH: usize = 40;

/// Separador de tokens: cualquier corrida fuera de [A-Za-z0-9+_.-].
static TOKEN_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9+_.\-]+").expect("FATAL: separator pattern malformed"));

/// Tokens compuestos solo de puntuación permitida.
static PUNCTUATION_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+_.\-]+$").expect("FATAL: punctuation pattern malformed"));

/// Cadenas puramente numéricas (años, teléfonos: "2017", "608-4210314").
static NUMERIC_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d+_.\-]+$").expect("FATAL: numeric pattern malformed"));

/// Correos electrónicos.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w\.\-]+@[\w\.\-]+\.\w+$").expect("FATAL: email pattern malformed"));

/// Prefijos de URL.
static URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?://|www\.|ftp://)").expect("FATAL: url pattern malformed"));

/// Stopwords: clase cerrada del inglés, artefactos de OCR y
/// bibliográficos, numerales escritos y verbos de altísima frecuencia.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
        "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
        "both", "but", "by", "can", "did", "do", "does", "doing", "down", "during", "each",
        "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
        "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it",
        "its", "itself", "just", "me", "might", "more", "most", "must", "my", "myself", "no",
        "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
        "ourselves", "out", "over", "own", "s", "same", "she", "should", "so", "some", "such",
        "t", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
        "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
        "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
        "why", "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
        // Artefactos de OCR y relleno
        "page", "pages", "figure", "fig", "table", "tables", "etc", "eg", "ie", "www", "com",
        // Numerales escritos
        "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        // Ruido de documentos escaneados y metadatos
        "copyright", "rights", "reserved", "inc", "ltd", "corp", "co", "company", "llc",
        "isbn", "doi", "vol", "edition", "chapter", "section", "article",
        // Verbos y rellenos de altísima frecuencia
        "say", "says", "said", "get", "got", "make", "made", "use", "used", "using", "may",
        "shall",
    ]
    .into_iter()
    .collect()
});

/// Determina si el token es una URL.
pub fn is_url(token: &str) -> bool {
    URL_PREFIX.is_match(&token.to_lowercase())
}

/// Determina si el token es una dirección de correo.
pub fn is_email(token: &str) -> bool {
    EMAIL_PATTERN.is_match(token)
}

/// Limpia un texto y extrae su conjunto ordenado de términos únicos.
///
/// Reglas: división sobre no-alfanuméricos (se preservan + _ . -),
/// minúsculas, longitud 2–40, sin stopwords, sin URLs ni correos,
/// sin cadenas puramente numéricas o de puntuación, solo ASCII.
pub fn clean_and_tokenize(raw_text: &str) -> BTreeSet<String> {
    let mut unique_terms: BTreeSet<String> = BTreeSet::new();

    if raw_text.is_empty() {
        return unique_terms;
    }

    for raw_token in TOKEN_SEPARATOR.split(raw_text) {
        if raw_token.is_empty() {
            continue;
        }

        let token_lower = raw_token.to_lowercase();

        if token_lower.len() < TERM_MIN_LENGTH || token_lower.len() > TERM_MAX_LENGTH {
            continue;
        }

        if STOPWORDS.contains(token_lower.as_str()) {
            continue;
        }

        if is_url(&token_lower) || is_email(&token_lower) {
            continue;
        }

        if PUNCTUATION_ONLY.is_match(&token_lower) || NUMERIC_ONLY.is_match(&token_lower) {
            continue;
        }

        // Filtro de emojis y símbolos fuera de ASCII.
        if !token_lower.is_ascii() {
            continue;
        }

        unique_terms.insert(token_lower);
    }

    unique_terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms_of(text: &str) -> Vec<String> {
        clean_and_tokenize(text).into_iter().collect()
    }

    #[test]
    fn tokenization_lowercases_deduplicates_and_sorts() {
        let terms = terms_of("Amazon AMAZON amazon Kinesis");
        assert_eq!(terms, vec!["amazon", "kinesis"]);
    }

    #[test]
    fn closed_class_and_bibliographic_stopwords_are_dropped() {
        let terms = terms_of("the quick cloud is about chapter page figure");
        assert_eq!(terms, vec!["cloud", "quick"]);
    }

    #[test]
    fn url_and_email_guards_fire_on_intact_tokens() {
        // El separador ya parte ':' '/' y '@', así que las guardas
        // actúan sobre tokens que llegan intactos (www.example.org).
        assert!(is_url("www.example.org"));
        assert!(is_url("https://example.org"));
        assert!(is_email("ops@example.org"));
        assert!(!is_email("route53"));

        let terms = terms_of("visit www.example.org for lambda");
        assert!(terms.contains(&"lambda".to_string()));
        assert!(!terms.iter().any(|term| term.starts_with("www.")));
    }

    #[test]
    fn purely_numeric_tokens_are_dropped() {
        let terms = terms_of("2017 608-4210314 608.421.0314 1_000.5 kinesis");
        assert_eq!(terms, vec!["kinesis"]);
    }

    #[test]
    fn mixed_alphanumerics_survive() {
        let terms = terms_of("s3 ec2 route53");
        assert_eq!(terms, vec!["ec2", "route53", "s3"]);
    }

    #[test]
    fn length_gates_drop_fragments_and_monsters() {
        let oversized_token = "x".repeat(41);
        let text = format!("a b {} fingerspelling", oversized_token);
        let terms = terms_of(&text);
        assert_eq!(terms, vec!["fingerspelling"]);
    }

    #[test]
    fn non_ascii_runs_act_as_separators_and_never_emit_terms() {
        // Los code points fuera de la clase ASCII permitida parten el
        // texto; ningún término emitido contiene bytes no-ASCII.
        let terms = terms_of("glossary 😀😀 señal");
        assert!(terms.contains(&"glossary".to_string()));
        assert!(terms.iter().all(|term| term.is_ascii()));
        assert!(!terms.iter().any(|term| term.contains('ñ')));
    }

    #[test]
    fn empty_text_produces_empty_set() {
        assert!(clean_and_tokenize("").is_empty());
    }

    #[test]
    fn determinism_same_text_same_terms() {
        let document = "Lambda Kinesis DynamoDB lambda KINESIS stream streams";
        assert_eq!(clean_and_tokenize(document), clean_and_tokenize(document));
    }
}
