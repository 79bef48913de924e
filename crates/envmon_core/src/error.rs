//! Taxonomia de erros do pipeline.
//!
//! Nenhum destes erros é fatal: cada atividade trata o que detecta e o
//! erro vira um ciclo pulado, um buffer retido ou um lote descartado.

use crate::protocol::ProtocolError;
use crate::types::Batch;

/// Falha na aquisição do sensor. Recuperada pulando o período.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AcquisitionError {
    #[error("Leitura inválida (temp válida: {temperature_valid}, umidade válida: {humidity_valid})")]
    InvalidValue {
        temperature_valid: bool,
        humidity_valid: bool,
    },

    #[error("Sensor indisponível: {0}")]
    Unavailable(String),
}

/// Falha ao entregar um lote à fila de despacho.
///
/// O lote volta para o chamador – a fila nunca perde um lote internamente.
#[derive(Debug, thiserror::Error)]
pub enum EnqueueError {
    #[error("Fila de despacho cheia ({} leituras recusadas)", .0.len())]
    Full(Batch),

    #[error("Fila de despacho fechada ({} leituras recusadas)", .0.len())]
    Closed(Batch),
}

impl EnqueueError {
    /// Devolve a posse do lote recusado.
    pub fn into_batch(self) -> Batch {
        match self {
            EnqueueError::Full(batch) | EnqueueError::Closed(batch) => batch,
        }
    }
}

/// Falha de transporte. O lote é descartado, sem retry.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Lote rejeitado pelo destino")]
    Rejected,

    #[error("Sem confirmação do destino dentro do prazo")]
    AckTimeout,

    #[error("Erro de protocolo: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Erro de I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Falhas ao subir o pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuração inválida: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error("Falha ao criar thread: {0}")]
    Spawn(#[from] std::io::Error),
}
