//! Buffer de leituras aguardando despacho.
//!
//! Só a atividade de amostragem altera o buffer. O display lê apenas a
//! ocupação. O buffer só é limpo depois que a fila de despacho aceita o
//! lote; se a entrega falha, os dados ficam e são reoferecidos no próximo
//! ciclo (crescimento sem limite enquanto o despacho estiver parado).

use crate::types::{Batch, Reading};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct BatchBuffer {
    readings: Mutex<Vec<Reading>>,
}

impl BatchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pré-aloca espaço para um lote completo.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            readings: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Reading>> {
        self.readings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adiciona ao final, preservando a ordem de aquisição.
    pub fn append(&self, reading: Reading) {
        self.lock().push(reading);
    }

    /// Ocupação atual, sem copiar o conteúdo.
    pub fn snapshot_len(&self) -> usize {
        self.lock().len()
    }

    /// Se a ocupação atingiu `threshold`, devolve uma cópia completa do
    /// conteúdo. Caso contrário devolve `None` e não toca no buffer.
    ///
    /// O buffer nunca é esvaziado aqui – veja [`BatchBuffer::clear`].
    pub fn drain_if_threshold(&self, threshold: usize) -> Option<Batch> {
        let readings = self.lock();
        if readings.len() >= threshold {
            Some(Batch::new(readings.clone()))
        } else {
            None
        }
    }

    /// Esvazia o buffer. Chamar somente após a fila aceitar o lote.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Cópia do conteúdo atual.
    pub fn to_vec(&self) -> Vec<Reading> {
        self.lock().clone()
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
