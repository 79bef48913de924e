//! Atividade de amostragem: Idle → Acquire → Update → (MaybeDispatch) → Idle.
//!
//! Política de entrega: o buffer só é limpo quando a fila aceita o lote.
//! Com a fila cheia os dados continuam no buffer e o lote inteiro (mais as
//! leituras novas) é reoferecido na próxima amostra válida.

use crate::buffer::BatchBuffer;
use crate::error::AcquisitionError;
use crate::ports::Sensor;
use crate::queue::BatchSender;
use crate::schedule::{ShutdownSignal, run_periodic};
use crate::stats::PipelineStats;
use crate::store::ReadingStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// O que aconteceu num ciclo de amostragem.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// Aquisição falhou; store e buffer intactos.
    Skipped(AcquisitionError),
    /// Leitura gravada, threshold ainda não atingido.
    Buffered { occupancy: usize },
    /// Lote aceito pela fila e buffer limpo.
    Queued { readings: usize },
    /// Fila recusou o lote; buffer mantido.
    Retained { occupancy: usize },
}

pub struct SamplingActivity<S> {
    sensor: S,
    store: Arc<ReadingStore>,
    buffer: Arc<BatchBuffer>,
    queue: BatchSender,
    stats: Arc<PipelineStats>,
    threshold: usize,
}

impl<S: Sensor> SamplingActivity<S> {
    pub fn new(
        sensor: S,
        store: Arc<ReadingStore>,
        buffer: Arc<BatchBuffer>,
        queue: BatchSender,
        stats: Arc<PipelineStats>,
        threshold: usize,
    ) -> Self {
        Self {
            sensor,
            store,
            buffer,
            queue,
            stats,
            threshold,
        }
    }

    /// Executa um ciclo completo.
    pub fn tick(&mut self) -> SampleOutcome {
        // ── Acquire ──
        let reading = match self.sensor.acquire() {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Falha na leitura do sensor: {e}");
                self.stats.record_acquisition_failure();
                return SampleOutcome::Skipped(e);
            }
        };
        self.stats.record_reading();

        // ── Update ──
        self.store.set(reading);
        self.buffer.append(reading);

        // ── MaybeDispatch ──
        let outcome = match self.buffer.drain_if_threshold(self.threshold) {
            None => SampleOutcome::Buffered {
                occupancy: self.buffer.snapshot_len(),
            },
            Some(batch) => {
                let readings = batch.len();
                match self.queue.try_enqueue(batch) {
                    Ok(()) => {
                        self.buffer.clear();
                        self.stats.record_queued();
                        info!(
                            "Lote enfileirado ({readings} leituras, fila {}/{}), buffer limpo",
                            self.queue.len(),
                            self.queue.capacity()
                        );
                        SampleOutcome::Queued { readings }
                    }
                    Err(e) => {
                        self.stats.record_queue_full();
                        if readings > self.threshold {
                            warn!(
                                "{e}; mantendo dados no buffer (backlog {readings}, threshold {})",
                                self.threshold
                            );
                        } else {
                            warn!("{e}; mantendo dados no buffer");
                        }
                        // A cópia recusada morre aqui; o buffer segue como fonte
                        SampleOutcome::Retained { occupancy: readings }
                    }
                }
            }
        };

        info!(
            "Amostra: {:.1} °C  {:.0} %RH (Buffer: {}/{})",
            reading.temperature,
            reading.humidity,
            self.buffer.snapshot_len(),
            self.threshold
        );

        outcome
    }

    /// Loop periódico até o shutdown. Ao sair, o [`BatchSender`] é dropado.
    pub fn run(mut self, period: Duration, shutdown: &ShutdownSignal) {
        run_periodic("amostragem", period, shutdown, || {
            self.tick();
        });
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
