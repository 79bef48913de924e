//! Montagem do pipeline: cria os containers compartilhados, injeta os
//! handles em cada atividade e sobe uma thread por atividade.

use crate::buffer::BatchBuffer;
use crate::config::PipelineConfig;
use crate::dispatch::DispatchActivity;
use crate::display::DisplayActivity;
use crate::error::PipelineError;
use crate::ports::{Sensor, StatusDisplay, Transport};
use crate::queue::dispatch_queue;
use crate::sampling::SamplingActivity;
use crate::schedule::{ShutdownTrigger, shutdown_pair};
use crate::stats::{PipelineStats, StatsSnapshot};
use crate::store::ReadingStore;
use crate::types::Reading;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// Handle do pipeline em execução.
pub struct PipelineHandle {
    trigger: Option<ShutdownTrigger>,
    threads: Vec<JoinHandle<()>>,
    store: Arc<ReadingStore>,
    buffer: Arc<BatchBuffer>,
    stats: Arc<PipelineStats>,
}

impl PipelineHandle {
    pub fn latest_reading(&self) -> Option<Reading> {
        self.store.get()
    }

    pub fn buffered(&self) -> usize {
        self.buffer.snapshot_len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Para amostragem e display, deixa o despacho esvaziar a fila e
    /// aguarda todas as threads.
    ///
    /// Bloqueia enquanto o transporte estiver preso num envio.
    pub fn shutdown(mut self) -> StatsSnapshot {
        self.stop_and_join();
        self.stats.snapshot()
    }

    fn stop_and_join(&mut self) {
        if let Some(trigger) = self.trigger.take() {
            trigger.fire();
        }
        for handle in self.threads.drain(..) {
            let name = handle.thread().name().unwrap_or("?").to_string();
            if handle.join().is_err() {
                error!("Thread '{name}' terminou com panic");
            }
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

/// Sobe as três atividades.
///
/// Se uma thread falhar ao ser criada, as já criadas são encerradas antes
/// de retornar o erro.
pub fn start_pipeline<S, D, T>(
    config: &PipelineConfig,
    sensor: S,
    display: D,
    transport: Arc<T>,
) -> Result<PipelineHandle, PipelineError>
where
    S: Sensor + 'static,
    D: StatusDisplay + 'static,
    T: Transport + ?Sized + 'static,
{
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(PipelineError::InvalidConfig(errors));
    }

    let store = Arc::new(ReadingStore::new());
    let buffer = Arc::new(BatchBuffer::with_capacity(config.batch_threshold));
    let stats = Arc::new(PipelineStats::new());
    let (batch_tx, batch_rx) = dispatch_queue(config.queue_capacity);
    let (trigger, shutdown) = shutdown_pair();

    let mut handle = PipelineHandle {
        trigger: Some(trigger),
        threads: Vec::with_capacity(3),
        store: Arc::clone(&store),
        buffer: Arc::clone(&buffer),
        stats: Arc::clone(&stats),
    };

    let sampling = SamplingActivity::new(
        sensor,
        Arc::clone(&store),
        Arc::clone(&buffer),
        batch_tx,
        Arc::clone(&stats),
        config.batch_threshold,
    );
    let ui = DisplayActivity::new(
        display,
        store,
        buffer,
        Arc::clone(&transport),
        config.batch_threshold,
    );
    let dispatch = DispatchActivity::new(transport, batch_rx, stats);

    // O despacho sobe por último: só termina quando o BatchSender da
    // amostragem for dropado.

    // ── Amostragem ──
    let sampling_period = config.sampling_period();
    let sampling_shutdown = shutdown.clone();
    handle.threads.push(
        thread::Builder::new()
            .name("sampling".into())
            .spawn(move || sampling.run(sampling_period, &sampling_shutdown))?,
    );

    // ── Display ──
    let ui_period = config.ui_period();
    handle.threads.push(
        thread::Builder::new()
            .name("display".into())
            .spawn(move || ui.run(ui_period, &shutdown))?,
    );

    // ── Despacho ──
    handle.threads.push(
        thread::Builder::new()
            .name("dispatch".into())
            .spawn(move || dispatch.run())?,
    );

    info!(
        "Pipeline iniciado: amostragem {}ms, display {}ms, lote {}, fila {}",
        config.sampling_period_ms, config.ui_period_ms, config.batch_threshold, config.queue_capacity
    );

    Ok(handle)
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
