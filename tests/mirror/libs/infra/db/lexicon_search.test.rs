// [tests/mirror/libs/infra/db/lexicon_search.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DEL ÍNDICE LÉXICO (V2.2 - ZENITH)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: BÚSQUEDA ADAPTATIVA Y RANKING HÍBRIDO EN VIVO
 * =================================================================
 */

use glossa_domain_models::{LexiconEntry, SearchMethod};
use glossa_domain_resolver::{LexiconIndex, WordResolver};
use glossa_infra_db::repositories::LexiconRepository;
use glossa_infra_db::GlossaDbClient;
use std::collections::BTreeMap;
use std::sync::Arc;

fn aws_entry(user_id: &str) -> LexiconEntry {
    let mut confidence_scores = BTreeMap::new();
    confidence_scores.insert("AWS".to_string(), 1.0);
    confidence_scores.insert("AW6".to_string(), 0.7);
    confidence_scores.insert("A W S".to_string(), 0.8);

    LexiconEntry {
        surface: "AWS".into(),
        aliases: vec!["AW6".into(), "A W S".into(), "AWS".into()],
        confidence_scores,
        user_id: user_id.into(),
        source_job_id: Some("job-001".into()),
        updated_at: "2026-02-11T00:00:00Z".into(),
    }
}

async fn seeded_repository(memory_anchor: &str) -> LexiconRepository {
    let database_client = GlossaDbClient::connect(memory_anchor, None)
        .await
        .expect("CRITICAL_FAULT: Failed to anchor in-memory tactical store.");
    let lexicon_repository = LexiconRepository::new(database_client);

    lexicon_repository.upsert_entry(&aws_entry("user-1")).await.expect("UPSERT_FAULT");
    lexicon_repository
}

#[tokio::test]
async fn upsert_replaces_instead_of_duplicating() {
    let lexicon_repository =
        seeded_repository("file:mem_lexicon_upsert?mode=memory&cache=shared").await;

    // Re-materialización de la misma tupla (surface, user_id).
    let mut refreshed_entry = aws_entry("user-1");
    refreshed_entry.aliases = vec!["AW6".into()];
    refreshed_entry.confidence_scores = BTreeMap::from([("AW6".to_string(), 0.7)]);
    lexicon_repository.upsert_entry(&refreshed_entry).await.expect("UPSERT_FAULT");

    let resident = lexicon_repository
        .fetch_entry("AWS", "user-1")
        .await
        .expect("FETCH_FAULT")
        .expect("ENTRY_VANISHED");
    assert_eq!(resident.aliases, vec!["AW6".to_string()]);
    assert_eq!(resident.confidence_for("AW6"), 0.7);
    assert_eq!(resident.confidence_for("AWS"), 0.0);
}

#[tokio::test]
async fn autocomplete_search_is_user_scoped_and_prefix_tolerant() {
    println!("\n🔎 [INICIO]: Auditoría de búsqueda adaptativa...");
    let lexicon_repository =
        seeded_repository("file:mem_lexicon_autocomplete?mode=memory&cache=shared").await;

    // Consulta corta exacta sobre la superficie.
    let exact_hits = lexicon_repository
        .search_autocomplete("AWS", "user-1", 20)
        .await
        .expect("SEARCH_FAULT");
    assert_eq!(exact_hits.len(), 1);
    assert_eq!(exact_hits[0].entry.surface, "AWS");
    assert!(exact_hits[0].atlas_score > 0.0);

    // Prefijo con una edición tolerada (AW7 ~ AW6 / AWS).
    let fuzzy_prefix_hits = lexicon_repository
        .search_autocomplete("AW7", "user-1", 20)
        .await
        .expect("SEARCH_FAULT");
    assert_eq!(fuzzy_prefix_hits.len(), 1, "AUTOCOMPLETE_FAULT: 1-edit prefix rejected");

    // Aislamiento por usuario: otro usuario no ve el léxico ajeno.
    let foreign_hits = lexicon_repository
        .search_autocomplete("AWS", "user-2", 20)
        .await
        .expect("SEARCH_FAULT");
    assert!(foreign_hits.is_empty(), "ISOLATION_FAULT: cross-user leakage");
    println!("   ✅ Autocompletado tolerante y aislado por usuario.");
}

#[tokio::test]
async fn fuzzy_search_tolerates_two_edits_and_rejects_three() {
    let lexicon_repository =
        seeded_repository("file:mem_lexicon_fuzzy?mode=memory&cache=shared").await;

    let two_edit_hits = lexicon_repository
        .search_fuzzy("AWXX", "user-1", 20)
        .await
        .expect("SEARCH_FAULT");
    assert_eq!(two_edit_hits.len(), 1, "FUZZY_FAULT: 2-edit query rejected");

    let three_edit_hits = lexicon_repository
        .search_fuzzy("QXZVB", "user-1", 20)
        .await
        .expect("SEARCH_FAULT");
    assert!(three_edit_hits.is_empty(), "FUZZY_FAULT: unrelated query matched");
}

#[tokio::test]
async fn resolver_rank_scenario_over_the_live_index() {
    println!("\n🏆 [INICIO]: Escenario de ranking híbrido sobre el índice vivo...");
    let lexicon_repository = Arc::new(
        seeded_repository("file:mem_lexicon_rank?mode=memory&cache=shared").await,
    );
    let word_resolver = WordResolver::new(lexicon_repository as Arc<dyn LexiconIndex>);

    // Consulta exacta: superficie con confianza total del alias literal.
    let exact_resolution = word_resolver
        .resolve_word("sess-r", "user-1", "AWS", SearchMethod::Fuzzy, "2026-02-11T00:00:01Z")
        .await;
    let top_result = &exact_resolution.all_results[0];
    assert_eq!(top_result.surface, "AWS");
    assert_eq!(top_result.alias_confidence, 1.0);
    let expected_hybrid = 0.7 * top_result.atlas_score + 0.3;
    assert!((top_result.hybrid_score - expected_hybrid).abs() < 1e-9);

    // Consulta confundida por dígito: enlaza vía el alias AW6.
    let confused_resolution = word_resolver
        .resolve_word("sess-r", "user-1", "AW6", SearchMethod::Fuzzy, "2026-02-11T00:00:02Z")
        .await;
    let confused_top = &confused_resolution.all_results[0];
    assert_eq!(confused_top.surface, "AWS");
    assert_eq!(confused_top.matched_via.as_deref(), Some("AW6"));
    assert!((confused_top.alias_confidence - 0.7).abs() < 1e-9);

    // El orden híbrido es descendente en todo el resultado.
    assert!(confused_resolution
        .all_results
        .windows(2)
        .all(|pair| pair[0].hybrid_score >= pair[1].hybrid_score));
    println!("   ✅ Ranking híbrido certificado sobre el repositorio vivo.");
}
