//! Atividade de despacho: WaitForBatch → Transmit → Report → WaitForBatch.
//!
//! A durabilidade termina na fila: um lote que falha no transporte é
//! reportado e descartado, sem retry.

use crate::error::TransportError;
use crate::ports::Transport;
use crate::queue::BatchReceiver;
use crate::stats::PipelineStats;
use crate::types::Batch;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum DispatchOutcome {
    Sent,
    Dropped(TransportError),
}

pub struct DispatchActivity<T: ?Sized> {
    transport: Arc<T>,
    queue: BatchReceiver,
    stats: Arc<PipelineStats>,
}

impl<T: Transport + ?Sized> DispatchActivity<T> {
    pub fn new(transport: Arc<T>, queue: BatchReceiver, stats: Arc<PipelineStats>) -> Self {
        Self {
            transport,
            queue,
            stats,
        }
    }

    /// Transmite um lote e reporta. O lote é consumido em qualquer caso.
    pub fn process(&self, batch: Batch) -> DispatchOutcome {
        let readings = batch.len();
        debug!(
            "Processando lote da fila ({readings} leituras, {} ainda na fila)",
            self.queue.len()
        );

        match self.transport.send(&batch) {
            Ok(()) => {
                self.stats.record_sent();
                info!("Lote enviado com sucesso ({readings} leituras)");
                DispatchOutcome::Sent
            }
            Err(e) => {
                self.stats.record_failed(readings);
                warn!("Falha ao enviar lote, {readings} leituras descartadas: {e}");
                DispatchOutcome::Dropped(e)
            }
        }
    }

    /// Consome a fila até todos os produtores encerrarem.
    pub fn run(self) {
        while let Some(batch) = self.queue.dequeue_blocking() {
            self.process(batch);
        }
        debug!("despacho: fila fechada, encerrando");
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
