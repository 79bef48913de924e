//! Atividade de display: a cada período lê o estado compartilhado e
//! renderiza. Não participa da entrega de lotes.

use crate::buffer::BatchBuffer;
use crate::ports::{StatusDisplay, Transport};
use crate::schedule::{ShutdownSignal, run_periodic};
use crate::store::ReadingStore;
use crate::types::NodeStatus;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Mensagem exibida enquanto não há leitura válida.
pub const SENSOR_ERROR_MESSAGE: &str = "Sensor error";

pub struct DisplayActivity<D, T: ?Sized> {
    display: D,
    store: Arc<ReadingStore>,
    buffer: Arc<BatchBuffer>,
    link: Arc<T>,
    threshold: usize,
}

impl<D: StatusDisplay, T: Transport + ?Sized> DisplayActivity<D, T> {
    pub fn new(
        display: D,
        store: Arc<ReadingStore>,
        buffer: Arc<BatchBuffer>,
        link: Arc<T>,
        threshold: usize,
    ) -> Self {
        Self {
            display,
            store,
            buffer,
            link,
            threshold,
        }
    }

    pub fn tick(&mut self) {
        let buffered = self.buffer.snapshot_len();
        let connected = self.link.is_connected();

        match self.store.get() {
            Some(reading) => {
                debug!("Display: {:.1} °C, buffer {buffered}/{}", reading.temperature, self.threshold);
                self.display.render_status(&NodeStatus {
                    reading,
                    buffered,
                    threshold: self.threshold,
                    connected,
                });
            }
            None => self.display.render_error(SENSOR_ERROR_MESSAGE),
        }
    }

    pub fn run(mut self, period: Duration, shutdown: &ShutdownSignal) {
        run_periodic("display", period, shutdown, || self.tick());
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
