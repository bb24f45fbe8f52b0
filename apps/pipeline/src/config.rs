// [apps/pipeline/src/config.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE CONFIGURATION (V4.0 - ENV SOVEREIGN)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L1-APP)
 * RESPONSABILIDAD: ADQUISICIÓN DE COORDENADAS TÁCTICAS DEL ENTORNO
 *
 * # Logic:
 * Toda tuning viaja por variables de entorno con defaults de
 * producción. Los valores del motor de compromiso reflejan la
 * calibración vigente: ventana 300 ms, estabilidad 200 ms, pausa
 * 2000 ms, θ_vote 0.3, θ_commit 0.4, R_max 1 (una segunda letra
 * idéntica consecutiva se rechaza; subir a 2 habilita dobletes).
 * =================================================================
 */

use glossa_domain_commit::CommitConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuración soberana del proceso de la columna vertebral.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // --- FLUJOS DEL BUS ---
    pub landmarks_stream_name: String,
    pub letters_stream_name: String,
    pub stream_shard_count: usize,
    pub subscription_lease: Duration,
    pub heartbeat_interval: Duration,

    // --- SUPERFICIE DE INGRESO ---
    pub listening_port: u16,

    // --- CLASIFICADOR ---
    pub classifier_artifact_path: PathBuf,
    pub classifier_labels_path: PathBuf,

    // --- ENLACE SALIENTE ---
    pub push_worker_url: String,

    // --- MOTOR DE COMPROMISO ---
    pub commit: CommitConfig,

    // --- DAEMONS ---
    /// Cadencia del barrido de pausa (≥ 1 Hz por contrato).
    pub pause_sweep_interval: Duration,
    /// Cadencia de purga de arrendamientos expirados.
    pub session_reap_interval: Duration,
}

impl PipelineConfig {
    /// Hidrata la configuración desde el espacio de nombres del proceso.
    pub fn from_environment() -> Self {
        Self {
            landmarks_stream_name: env_string("LANDMARKS_STREAM_NAME", "asl-landmarks-stream"),
            letters_stream_name: env_string("LETTERS_STREAM_NAME", "asl-letters-stream"),
            stream_shard_count: env_parsed("STREAM_SHARD_COUNT", 4),
            subscription_lease: Duration::from_secs(env_parsed("SUBSCRIPTION_LEASE_SECONDS", 300)),
            heartbeat_interval: Duration::from_secs(env_parsed("HEARTBEAT_INTERVAL_SECONDS", 5)),

            listening_port: env_parsed("PORT", 3000),

            classifier_artifact_path: PathBuf::from(env_string(
                "CLASSIFIER_WEIGHTS_PATH",
                "model/keypoint_classifier/keypoint_classifier.json",
            )),
            classifier_labels_path: PathBuf::from(env_string(
                "CLASSIFIER_LABELS_PATH",
                "model/keypoint_classifier/keypoint_classifier_label.csv",
            )),

            push_worker_url: env_string("PUSH_WORKER_URL", "http://localhost:9701"),

            commit: CommitConfig {
                window_duration_ms: env_parsed("COMMIT_WINDOW_MS", 300),
                stability_duration_ms: env_parsed("COMMIT_STABILITY_MS", 200),
                vote_min_confidence: env_parsed("COMMIT_VOTE_MIN_CONFIDENCE", 0.3),
                commit_min_confidence: env_parsed("COMMIT_MIN_CONFIDENCE", 0.4),
                pause_duration_ms: env_parsed("COMMIT_PAUSE_MS", 2000),
                max_consecutive_repeats: env_parsed("COMMIT_MAX_CONSECUTIVE", 1),
                session_ttl_seconds: env_parsed("SESSION_TTL_SECONDS", 300),
            },

            pause_sweep_interval: Duration::from_millis(env_parsed("PAUSE_SWEEP_INTERVAL_MS", 1000)),
            session_reap_interval: Duration::from_secs(env_parsed("SESSION_REAP_INTERVAL_SECONDS", 60)),
        }
    }

    /// Nombre nominado del consumidor de una etapa (único por host).
    pub fn consumer_name_for(&self, stage_label: &str) -> String {
        let host_identifier = env::var("HOSTNAME").unwrap_or_else(|_| "local".to_string());
        format!("{stage_label}-{host_identifier}")
    }
}

fn env_string(variable_name: &str, default_value: &str) -> String {
    env::var(variable_name).unwrap_or_else(|_| default_value.to_string())
}

fn env_parsed<ValueT: std::str::FromStr + Copy>(variable_name: &str, default_value: ValueT) -> ValueT {
    env::var(variable_name)
        .ok()
        .and_then(|raw_value| raw_value.parse().ok())
        .unwrap_or(default_value)
}
