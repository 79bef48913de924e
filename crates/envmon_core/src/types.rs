//! Tipos de dados do pipeline: leitura individual e lote.
//!
//! Uma [`Reading`] é sempre válida – falhas de aquisição não produzem
//! leitura nenhuma. Um [`Batch`] é um snapshot imutável entregue ao domínio
//! de rede.

use crate::error::AcquisitionError;
use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Reading
// ──────────────────────────────────────────────

/// Leitura de temperatura/umidade com timestamp monotônico.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Temperatura (°C)
    pub temperature: f32,
    /// Umidade relativa (%RH)
    pub humidity: f32,
    /// Instante da aquisição (ms desde o boot do nó)
    pub timestamp_ms: u64,
}

impl Reading {
    /// Cria uma leitura validada. Ambos os campos precisam ser numéricos.
    pub fn new(temperature: f32, humidity: f32, timestamp_ms: u64) -> Result<Self, AcquisitionError> {
        let temperature_valid = temperature.is_finite();
        let humidity_valid = humidity.is_finite();

        if !(temperature_valid && humidity_valid) {
            return Err(AcquisitionError::InvalidValue {
                temperature_valid,
                humidity_valid,
            });
        }

        Ok(Self {
            temperature,
            humidity,
            timestamp_ms,
        })
    }
}

// ──────────────────────────────────────────────
// Batch
// ──────────────────────────────────────────────

/// Lote de leituras em ordem de aquisição.
///
/// Não expõe API de mutação: depois de criado só pode ser lido ou consumido.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    readings: Vec<Reading>,
}

impl Batch {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Consome o lote e devolve as leituras.
    pub fn into_readings(self) -> Vec<Reading> {
        self.readings
    }
}

impl From<Vec<Reading>> for Batch {
    fn from(readings: Vec<Reading>) -> Self {
        Self::new(readings)
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Reading;
    type IntoIter = std::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}

// ──────────────────────────────────────────────
// Status para o display
// ──────────────────────────────────────────────

/// Tudo que o display precisa para desenhar um frame de status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStatus {
    pub reading: Reading,
    /// Leituras aguardando envio no buffer
    pub buffered: usize,
    /// Threshold configurado do lote
    pub threshold: usize,
    /// Estado do link de rede
    pub connected: bool,
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
