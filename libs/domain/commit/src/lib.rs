// [libs/domain/commit/src/lib.rs]
/*!
 * =================================================================
 * APARATO: COMMIT ENGINE FACADE (V4.0 - SINGLE WRITER LAW)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DEL ALMACÉN DE SESIÓN Y CONFIGURACIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE WRITER LAW: El motor de compromiso es el único escritor
 *    del estado ventana/buffer de cada sesión. Toda mutación pasa por
 *    el seam 'SessionStore'; los lectores concurren sin bloquearlo.
 * 2. STORE AGNOSTICISM: El adaptador libSQL satisface el contrato en
 *    producción; el almacén en RAM lo satisface en las suites.
 * 3. DEGRADED NEVER DEAD: Un fallo del almacén jamás colapsa la
 *    sesión: el camino online omite el compromiso y continúa.
 * =================================================================
 */

pub mod engine;
pub mod memory;

pub use engine::{find_top_candidate, CommitEngine};
pub use memory::InMemorySessionStore;

use async_trait::async_trait;
use glossa_domain_models::{LetterObservation, WordBuffer};
use thiserror::Error;

/// Catálogo semántico de fallos del almacén de sesión.
#[derive(Error, Debug)]
pub enum SessionStoreFault {
    /// El sustrato de persistencia no responde (reintentable).
    #[error("[L2_SESSION_FAULT]: STORE_UNAVAILABLE -> {0}")]
    Unavailable(String),

    /// La operación agotó su plazo explícito (reintentable).
    #[error("[L2_SESSION_FAULT]: STORE_DEADLINE_EXCEEDED -> {0}")]
    DeadlineExceeded(String),

    /// La fila recuperada no mapea al contrato del dominio.
    #[error("[L2_SESSION_FAULT]: STATE_MAPPING_VIOLATION -> {0}")]
    MappingViolation(String),
}

/// Bindings del almacén de sesión requeridos por el motor.
/// Cualquier almacén que los satisfaga es aceptable.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Anexa una observación a la ventana y renueva el TTL de la sesión.
    async fn window_push(
        &self,
        session_id: &str,
        observation: LetterObservation,
    ) -> Result<(), SessionStoreFault>;

    /// Remueve observaciones con timestamp < cutoff. Devuelve cuántas.
    async fn window_prune(&self, session_id: &str, cutoff_ts: f64)
        -> Result<u64, SessionStoreFault>;

    /// Ventana completa en orden cronológico (la más vieja primero).
    async fn window_get(&self, session_id: &str)
        -> Result<Vec<LetterObservation>, SessionStoreFault>;

    async fn window_clear(&self, session_id: &str) -> Result<(), SessionStoreFault>;

    /// Buffer de palabra de la sesión, creado si no existe.
    async fn buffer_get(
        &self,
        session_id: &str,
        user_id: &str,
        now: f64,
    ) -> Result<WordBuffer, SessionStoreFault>;

    /// Buffer de palabra sin efecto de creación (detección de pausa).
    async fn buffer_peek(&self, session_id: &str)
        -> Result<Option<WordBuffer>, SessionStoreFault>;

    /// Anexa una letra comprometida y sella last_commit_time = now.
    async fn buffer_append(
        &self,
        session_id: &str,
        user_id: &str,
        committed_letter: char,
        now: f64,
    ) -> Result<WordBuffer, SessionStoreFault>;

    async fn buffer_clear(&self, session_id: &str) -> Result<(), SessionStoreFault>;

    /// Sesiones con buffer no vacío (soporte del barrido de pausa).
    async fn active_sessions(&self) -> Result<Vec<String>, SessionStoreFault>;

    /// Purga sesiones cuyo arrendamiento expiró. Devuelve cuántas.
    async fn purge_expired(&self, now: f64) -> Result<u64, SessionStoreFault>;
}

/// Configuración soberana del motor de compromiso.
#[derive(Debug, Clone)]
pub struct CommitConfig {
    /// Duración de la ventana deslizante (W) en milisegundos.
    pub window_duration_ms: u64,
    /// Dominancia mínima del candidato (S) en milisegundos.
    pub stability_duration_ms: u64,
    /// Confianza mínima para que una observación vote (θ_vote).
    pub vote_min_confidence: f64,
    /// Confianza promedio mínima para comprometer (θ_commit).
    pub commit_min_confidence: f64,
    /// Silencio que finaliza una palabra (P) en milisegundos.
    pub pause_duration_ms: u64,
    /// Máximo de letras idénticas consecutivas (R_max).
    ///
    /// Con el valor 1 una segunda letra igual consecutiva se rechaza;
    /// con 2 se permite el doblete (regla "AA sí, AAA no"). El valor
    /// configurado es normativo.
    pub max_consecutive_repeats: usize,
    /// Arrendamiento de sesión en segundos (renovado en cada push).
    pub session_ttl_seconds: u64,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            window_duration_ms: 300,
            stability_duration_ms: 200,
            vote_min_confidence: 0.3,
            commit_min_confidence: 0.4,
            pause_duration_ms: 2000,
            max_consecutive_repeats: 1,
            session_ttl_seconds: 300,
        }
    }
}
