//! Fila limitada de lotes entre o domínio de amostragem e o de rede.
//!
//! A posse de cada [`Batch`] passa do produtor para a fila e da fila para o
//! consumidor exatamente uma vez. Enfileirar nunca bloqueia; com a fila
//! cheia o lote volta para o chamador.

use crate::error::EnqueueError;
use crate::types::Batch;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

/// Cria a fila de despacho com capacidade fixa.
///
/// Capacidade zero viraria um canal rendezvous; a config valida `>= 1`.
pub fn dispatch_queue(capacity: usize) -> (BatchSender, BatchReceiver) {
    let (tx, rx) = bounded::<Batch>(capacity);
    (BatchSender { tx, capacity }, BatchReceiver { rx })
}

/// Lado produtor (atividade de amostragem).
#[derive(Debug, Clone)]
pub struct BatchSender {
    tx: Sender<Batch>,
    capacity: usize,
}

impl BatchSender {
    /// Tenta entregar o lote sem bloquear.
    pub fn try_enqueue(&self, batch: Batch) -> Result<(), EnqueueError> {
        self.tx.try_send(batch).map_err(|e| match e {
            TrySendError::Full(batch) => EnqueueError::Full(batch),
            TrySendError::Disconnected(batch) => EnqueueError::Closed(batch),
        })
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Lado consumidor (atividade de despacho).
#[derive(Debug)]
pub struct BatchReceiver {
    rx: Receiver<Batch>,
}

impl BatchReceiver {
    /// Bloqueia até haver um lote. Ordem FIFO estrita.
    ///
    /// Retorna `None` só depois que todos os produtores foram dropados e a
    /// fila esvaziou.
    pub fn dequeue_blocking(&self) -> Option<Batch> {
        self.rx.recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
