// [tests/mirror/libs/infra/db/session_store_lifecycle.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE CICLO DE VIDA DE SESIÓN (V2.0 - ZENITH)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE VENTANA, BUFFER Y ARRENDAMIENTOS
 * =================================================================
 */

use glossa_domain_commit::SessionStore;
use glossa_domain_models::LetterObservation;
use glossa_infra_db::repositories::{ConnectionRepository, SessionRepository};
use glossa_infra_db::{DbError, GlossaDbClient};

fn observation(char: char, confidence: f64, timestamp: f64) -> LetterObservation {
    LetterObservation { char, confidence, timestamp }
}

#[tokio::test]
async fn window_lifecycle_preserves_order_and_prunes_a_prefix() {
    println!("\n🗄️  [INICIO]: Auditoría de la ventana durable...");

    let database_client =
        GlossaDbClient::connect("file:mem_session_window?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: Failed to anchor in-memory tactical store.");
    let session_repository = SessionRepository::new(database_client, 300);

    for (index, timestamp) in [1000.0, 1000.1, 1000.2, 1000.3].iter().enumerate() {
        session_repository
            .window_push("sess-w", observation((b'A' + index as u8) as char, 0.9, *timestamp))
            .await
            .expect("STORE_FAULT: push rejected");
    }

    let pruned = session_repository.window_prune("sess-w", 1000.15).await.expect("STORE_FAULT");
    assert_eq!(pruned, 2, "PRUNE_FAULT: expected exactly the stale prefix");

    let window = session_repository.window_get("sess-w").await.expect("STORE_FAULT");
    let symbols: Vec<char> = window.iter().map(|entry| entry.char).collect();
    assert_eq!(symbols, vec!['C', 'D']);
    assert!(window.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));

    session_repository.window_clear("sess-w").await.expect("STORE_FAULT");
    assert!(session_repository.window_get("sess-w").await.expect("STORE_FAULT").is_empty());
    println!("   ✅ Orden cronológico y poda de prefijo certificados.");
}

#[tokio::test]
async fn buffer_lifecycle_tracks_commits_and_finalization_cleanup() {
    let database_client =
        GlossaDbClient::connect("file:mem_session_buffer?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: Failed to anchor in-memory tactical store.");
    let session_repository = SessionRepository::new(database_client, 300);

    // Un peek sin buffer residente no materializa nada.
    assert!(session_repository.buffer_peek("sess-b").await.expect("STORE_FAULT").is_none());

    let created = session_repository.buffer_get("sess-b", "user-b", 2000.0).await.expect("STORE_FAULT");
    assert!(created.letters.is_empty());
    assert_eq!(created.user_id, "user-b");

    // El censo solo cuenta sesiones con palabra en construcción.
    assert!(session_repository.active_sessions().await.expect("STORE_FAULT").is_empty());

    let after_a = session_repository.buffer_append("sess-b", "user-b", 'A', 2000.5).await.expect("STORE_FAULT");
    let after_w = session_repository.buffer_append("sess-b", "user-b", 'W', 2000.9).await.expect("STORE_FAULT");
    assert_eq!(after_a.current_word(), "A");
    assert_eq!(after_w.current_word(), "AW");
    assert_eq!(after_w.last_commit_time, Some(2000.9));

    let census = session_repository.active_sessions().await.expect("STORE_FAULT");
    assert_eq!(census, vec!["sess-b".to_string()]);

    // Atomicidad de finalización: limpieza total del estado de sesión.
    session_repository.buffer_clear("sess-b").await.expect("STORE_FAULT");
    session_repository.window_clear("sess-b").await.expect("STORE_FAULT");
    assert!(session_repository.buffer_peek("sess-b").await.expect("STORE_FAULT").is_none());
    assert!(session_repository.active_sessions().await.expect("STORE_FAULT").is_empty());
}

#[tokio::test]
async fn expired_leases_are_reaped_with_their_state() {
    let database_client =
        GlossaDbClient::connect("file:mem_session_leases?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: Failed to anchor in-memory tactical store.");
    // Arrendamiento corto de 5 s para la simulación.
    let session_repository = SessionRepository::new(database_client, 5);

    session_repository
        .window_push("sess-old", observation('A', 0.9, 3000.0))
        .await
        .expect("STORE_FAULT");
    session_repository
        .window_push("sess-fresh", observation('B', 0.9, 3004.0))
        .await
        .expect("STORE_FAULT");
    session_repository
        .buffer_append("sess-old", "user-o", 'A', 3000.0)
        .await
        .expect("STORE_FAULT");

    // sess-old expira en 3005; sess-fresh en 3009.
    let reaped = session_repository.purge_expired(3006.0).await.expect("STORE_FAULT");
    assert_eq!(reaped, 1, "REAPER_FAULT: expected exactly one expired session");

    assert!(session_repository.window_get("sess-old").await.expect("STORE_FAULT").is_empty());
    assert!(session_repository.buffer_peek("sess-old").await.expect("STORE_FAULT").is_none());
    assert_eq!(session_repository.window_get("sess-fresh").await.expect("STORE_FAULT").len(), 1);
}

#[tokio::test]
async fn connection_registry_binds_sessions_with_last_writer_wins() {
    let database_client =
        GlossaDbClient::connect("file:mem_connection_registry?mode=memory&cache=shared", None)
            .await
            .expect("CRITICAL_FAULT: Failed to anchor in-memory tactical store.");
    let connection_registry = ConnectionRepository::new(database_client);

    connection_registry
        .register_pending("conn-77", "2026-02-11T10:00:00Z", 4000.0)
        .await
        .expect("REGISTRY_FAULT");

    // Primer frame: la conexión queda enlazada a su sesión declarada.
    connection_registry
        .bind_session_activity("conn-77", "sess-77", "2026-02-11T10:00:01Z")
        .await
        .expect("REGISTRY_FAULT");

    let resolved_connection = connection_registry
        .find_connection_for_session("sess-77")
        .await
        .expect("REGISTRY_FAULT");
    assert_eq!(resolved_connection.as_deref(), Some("conn-77"));

    // Last-writer-wins: una reconexión re-enlaza la misma sesión.
    connection_registry
        .register_pending("conn-78", "2026-02-11T10:05:00Z", 4300.0)
        .await
        .expect("REGISTRY_FAULT");
    connection_registry
        .bind_session_activity("conn-78", "sess-77", "2026-02-11T10:05:01Z")
        .await
        .expect("REGISTRY_FAULT");

    let rebound_connection = connection_registry
        .find_connection_for_session("sess-77")
        .await
        .expect("REGISTRY_FAULT");
    assert_eq!(rebound_connection.as_deref(), Some("conn-78"));

    // El enlace sobre una conexión inexistente es un fallo semántico.
    let ghost_fault = connection_registry
        .bind_session_activity("conn-ghost", "sess-77", "2026-02-11T10:06:00Z")
        .await
        .expect_err("REGISTRY_FAULT: ghost bind accepted");
    assert!(matches!(ghost_fault, DbError::ConnectionNotFound));

    // La desconexión remueve la fila y libera la sesión.
    connection_registry.remove("conn-78").await.expect("REGISTRY_FAULT");
    let after_removal = connection_registry
        .find_connection_for_session("sess-77")
        .await
        .expect("REGISTRY_FAULT");
    assert_eq!(after_removal.as_deref(), Some("conn-77"), "REGISTRY_FAULT: stale row survived");
}
