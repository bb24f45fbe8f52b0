// [libs/domain/commit/src/memory.rs]
/*!
 * =================================================================
 * APARATO: IN-MEMORY SESSION STORE (V2.0 - PROVING GROUNDS)
 * CLASIFICACIÓN: DOMAIN ENGINE SUPPORT (ESTRATO L2)
 * RESPONSABILIDAD: ALMACÉN DE SESIÓN VOLÁTIL PARA SUITES Y DEMOS
 *
 * # Logic:
 * Satisface el contrato 'SessionStore' con semántica idéntica al
 * adaptador libSQL: ventana FIFO, arrendamiento renovado en cada
 * push/append y purga por expiración. Las suites de certificación
 * del motor corren contra este aparato sin sustrato de red.
 * =================================================================
 */

use crate::{SessionStore, SessionStoreFault};
use async_trait::async_trait;
use glossa_domain_models::{LetterObservation, WordBuffer};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

const DEFAULT_LEASE_SECONDS: f64 = 300.0;

#[derive(Debug, Default)]
struct SessionSlot {
    window: VecDeque<LetterObservation>,
    buffer: Option<WordBuffer>,
    lease_expires_at: f64,
}

/// Almacén de sesión residente en RAM (thread-safe).
pub struct InMemorySessionStore {
    slots: Mutex<HashMap<String, SessionSlot>>,
    lease_seconds: f64,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self { slots: Mutex::new(HashMap::new()), lease_seconds: DEFAULT_LEASE_SECONDS }
    }

    pub fn with_lease_seconds(lease_seconds: f64) -> Self {
        Self { slots: Mutex::new(HashMap::new()), lease_seconds }
    }

    fn lock_slots(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, SessionSlot>>, SessionStoreFault> {
        self.slots
            .lock()
            .map_err(|poison_fault| SessionStoreFault::Unavailable(poison_fault.to_string()))
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn window_push(
        &self,
        session_id: &str,
        observation: LetterObservation,
    ) -> Result<(), SessionStoreFault> {
        let mut slots = self.lock_slots()?;
        let slot = slots.entry(session_id.to_string()).or_default();
        slot.lease_expires_at = observation.timestamp + self.lease_seconds;
        slot.window.push_back(observation);
        Ok(())
    }

    async fn window_prune(
        &self,
        session_id: &str,
        cutoff_ts: f64,
    ) -> Result<u64, SessionStoreFault> {
        let mut slots = self.lock_slots()?;
        let Some(slot) = slots.get_mut(session_id) else { return Ok(0) };

        let mut pruned_count = 0;
        while slot
            .window
            .front()
            .map(|oldest| oldest.timestamp < cutoff_ts)
            .unwrap_or(false)
        {
            slot.window.pop_front();
            pruned_count += 1;
        }
        Ok(pruned_count)
    }

    async fn window_get(
        &self,
        session_id: &str,
    ) -> Result<Vec<LetterObservation>, SessionStoreFault> {
        let slots = self.lock_slots()?;
        Ok(slots
            .get(session_id)
            .map(|slot| slot.window.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn window_clear(&self, session_id: &str) -> Result<(), SessionStoreFault> {
        let mut slots = self.lock_slots()?;
        if let Some(slot) = slots.get_mut(session_id) {
            slot.window.clear();
        }
        Ok(())
    }

    async fn buffer_get(
        &self,
        session_id: &str,
        user_id: &str,
        now: f64,
    ) -> Result<WordBuffer, SessionStoreFault> {
        let mut slots = self.lock_slots()?;
        let slot = slots.entry(session_id.to_string()).or_default();
        let buffer = slot
            .buffer
            .get_or_insert_with(|| WordBuffer::new(session_id, user_id, now));
        Ok(buffer.clone())
    }

    async fn buffer_peek(
        &self,
        session_id: &str,
    ) -> Result<Option<WordBuffer>, SessionStoreFault> {
        let slots = self.lock_slots()?;
        Ok(slots.get(session_id).and_then(|slot| slot.buffer.clone()))
    }

    async fn buffer_append(
        &self,
        session_id: &str,
        user_id: &str,
        committed_letter: char,
        now: f64,
    ) -> Result<WordBuffer, SessionStoreFault> {
        let mut slots = self.lock_slots()?;
        let slot = slots.entry(session_id.to_string()).or_default();
        let buffer = slot
            .buffer
            .get_or_insert_with(|| WordBuffer::new(session_id, user_id, now));

        buffer.letters.push(committed_letter);
        buffer.last_commit_time = Some(now);
        slot.lease_expires_at = now + self.lease_seconds;

        Ok(buffer.clone())
    }

    async fn buffer_clear(&self, session_id: &str) -> Result<(), SessionStoreFault> {
        let mut slots = self.lock_slots()?;
        if let Some(slot) = slots.get_mut(session_id) {
            slot.buffer = None;
        }
        Ok(())
    }

    async fn active_sessions(&self) -> Result<Vec<String>, SessionStoreFault> {
        let slots = self.lock_slots()?;
        Ok(slots
            .iter()
            .filter(|(_, slot)| {
                slot.buffer
                    .as_ref()
                    .map(|buffer| !buffer.letters.is_empty())
                    .unwrap_or(false)
            })
            .map(|(session_id, _)| session_id.clone())
            .collect())
    }

    async fn purge_expired(&self, now: f64) -> Result<u64, SessionStoreFault> {
        let mut slots = self.lock_slots()?;
        let population_before = slots.len();
        slots.retain(|_, slot| slot.lease_expires_at >= now);
        Ok((population_before - slots.len()) as u64)
    }
}
