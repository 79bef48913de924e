//! # Envmon Core
//!
//! Pipeline concorrente do nó de monitoramento ambiental: amostragem
//! periódica do sensor, display de status e despacho assíncrono de lotes
//! pela rede, com estado compartilhado sob mutex e fila limitada entre o
//! domínio de amostragem e o de rede.
//!
//! ## Módulos
//! - [`types`] – Leitura, lote e status de display
//! - [`store`] / [`buffer`] / [`queue`] – Containers compartilhados
//! - [`sampling`] / [`display`] / [`dispatch`] – As três atividades
//! - [`pipeline`] – Montagem e shutdown
//! - [`ports`] – Traits dos colaboradores (sensor, display, transporte)
//! - [`protocol`] – Frames binários de lote e confirmação
//! - [`config`] – Configuração unificada via TOML

pub mod buffer;
pub mod config;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod protocol;
pub mod queue;
pub mod sampling;
pub mod schedule;
pub mod stats;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports convenientes
pub use config::{AppConfig, PipelineConfig};
pub use error::{AcquisitionError, EnqueueError, PipelineError, TransportError};
pub use pipeline::{PipelineHandle, start_pipeline};
pub use ports::{Sensor, StatusDisplay, Transport};
pub use protocol::{PROTOCOL_VERSION, decode_batch, encode_batch};
pub use types::{Batch, NodeStatus, Reading};
