// [libs/infra/uplink/src/lib.rs]
/*!
 * =================================================================
 * APARATO: OUTBOUND UPLINK FACADE (V3.0 - HARDENED CLIENTS)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: ENLACES HTTP HACIA COLABORADORES EXTERNOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. HARDENED CLIENTS: Todos los enlaces usan timeouts estratégicos,
 *    user-agent nominal y autenticación Bearer opcional.
 * 2. FIRE AND FORGET LAW: La entrega saliente jamás bloquea el camino
 *    de compromiso; los fallos se reportan y se descartan.
 * =================================================================
 */

pub mod llm;
pub mod ocr;
pub mod push;

pub use llm::{LlmGatewayClient, SurfaceAliases, ALIAS_SYNTHESIS_SYSTEM_PROMPT};
pub use ocr::{OcrGatewayClient, OcrAnalysisStart, OcrExtractedLines};
pub use push::PushWorkerClient;

use thiserror::Error;

/// Catálogo semántico de fallos de enlace saliente.
#[derive(Error, Debug)]
pub enum UplinkError {
    /// Variable de entorno del enlace vacía o ausente.
    #[error("[L3_UPLINK_FAULT]: STRATEGIC_CONFIG_VOID -> {0}")]
    ConfigurationVoid(String),

    /// Fallo físico del enlace de red.
    #[error("[L3_UPLINK_FAULT]: PHYSICAL_LINK_FAILURE -> {0}")]
    Network(#[from] reqwest::Error),

    /// El colaborador remoto rechazó la solicitud.
    #[error("[L3_UPLINK_FAULT]: REMOTE_REJECTION -> HTTP_{0}")]
    RemoteRejection(u16),

    /// La respuesta del colaborador no respeta su contrato.
    #[error("[L3_UPLINK_FAULT]: CONTRACT_VIOLATION -> {0}")]
    ContractViolation(String),
}
