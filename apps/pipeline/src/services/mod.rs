// [apps/pipeline/src/services/mod.rs]
/*!
 * =================================================================
 * APARATO: SERVICE REGISTRY (V2.0)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: EXPOSICIÓN DE DAEMONS Y DESPACHO SALIENTE
 * =================================================================
 */

pub mod outbound;
pub mod pause_sweeper;
pub mod session_reaper;

pub use outbound::OutboundDispatcher;
pub use pause_sweeper::spawn_pause_sweeper;
pub use session_reaper::spawn_session_reaper;
