//! Slot único com a leitura válida mais recente.

use crate::types::Reading;
use std::sync::{Mutex, PoisonError};

/// Última leitura válida, compartilhada entre amostragem (escrita) e
/// display (leitura).
///
/// `None` é a sentinela "ainda sem dados". Nunca volta a `None` depois do
/// primeiro `set`.
#[derive(Debug, Default)]
pub struct ReadingStore {
    slot: Mutex<Option<Reading>>,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitui a leitura atual. Os três campos mudam juntos.
    pub fn set(&self, reading: Reading) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(reading);
    }

    /// Cópia da leitura atual, ou `None` se nada foi gravado ainda.
    pub fn get(&self) -> Option<Reading> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
