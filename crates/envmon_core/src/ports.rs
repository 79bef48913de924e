//! Interfaces dos colaboradores externos: sensor, display e transporte.
//!
//! O pipeline só conhece estes traits; drivers concretos ficam no binário.

use crate::error::{AcquisitionError, TransportError};
use crate::types::{Batch, NodeStatus, Reading};

/// Fonte de leituras. Chamado uma vez por período de amostragem.
pub trait Sensor: Send {
    fn acquire(&mut self) -> Result<Reading, AcquisitionError>;
}

/// Renderizador de status. Ambas as chamadas são fire-and-forget.
pub trait StatusDisplay: Send {
    fn render_status(&mut self, status: &NodeStatus);
    fn render_error(&mut self, message: &str);
}

/// Transporte de lotes.
///
/// Compartilhado entre display (`is_connected`) e despacho (`send`), por isso
/// recebe `&self`.
pub trait Transport: Send + Sync {
    /// Envia um lote. Pode bloquear pelo tempo do I/O externo.
    fn send(&self, batch: &Batch) -> Result<(), TransportError>;

    /// Estado do link, sem bloquear. Melhor esforço.
    fn is_connected(&self) -> bool;
}
