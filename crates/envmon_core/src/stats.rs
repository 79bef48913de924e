//! Contadores do pipeline, compartilhados entre as atividades.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PipelineStats {
    readings_acquired: AtomicU64,
    acquisition_failures: AtomicU64,
    batches_queued: AtomicU64,
    queue_full: AtomicU64,
    batches_sent: AtomicU64,
    batches_failed: AtomicU64,
    readings_lost: AtomicU64,
}

/// Fotografia dos contadores num instante.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub readings_acquired: u64,
    pub acquisition_failures: u64,
    pub batches_queued: u64,
    /// Tentativas de entrega recusadas por fila cheia
    pub queue_full: u64,
    pub batches_sent: u64,
    pub batches_failed: u64,
    /// Leituras perdidas em lotes que falharam no transporte
    pub readings_lost: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_reading(&self) {
        self.readings_acquired.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_acquisition_failure(&self) {
        self.acquisition_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_queued(&self) {
        self.batches_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_queue_full(&self) {
        self.queue_full.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sent(&self) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self, readings: usize) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.readings_lost.fetch_add(readings as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            readings_acquired: self.readings_acquired.load(Ordering::Relaxed),
            acquisition_failures: self.acquisition_failures.load(Ordering::Relaxed),
            batches_queued: self.batches_queued.load(Ordering::Relaxed),
            queue_full: self.queue_full.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            readings_lost: self.readings_lost.load(Ordering::Relaxed),
        }
    }
}
