// [libs/infra/db/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY REGISTRY (V4.0 - ACCESS MATRIX)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE REPOSITORIOS TÁCTICOS
 * =================================================================
 */

pub mod connection;
pub mod jobs;
pub mod lexicon;
pub mod session;

pub use connection::ConnectionRepository;
pub use jobs::AliasJobRepository;
pub use lexicon::LexiconRepository;
pub use session::SessionRepository;
