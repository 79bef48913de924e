//! Dublês de teste dos colaboradores.

use crate::error::{AcquisitionError, TransportError};
use crate::ports::{Sensor, StatusDisplay, Transport};
use crate::types::{Batch, NodeStatus, Reading};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn reading(i: u64) -> Reading {
    Reading::new(20.0 + i as f32 * 0.5, 40.0 + i as f32, i * 100).unwrap()
}

/// Sensor que devolve um roteiro fixo e depois só leituras sequenciais.
pub struct ScriptedSensor {
    script: VecDeque<Result<Reading, AcquisitionError>>,
    next: u64,
}

impl ScriptedSensor {
    pub fn new(script: Vec<Result<Reading, AcquisitionError>>) -> Self {
        Self {
            script: script.into(),
            next: 1_000,
        }
    }

    /// Sem roteiro: leituras válidas indefinidamente.
    pub fn endless() -> Self {
        Self::new(Vec::new())
    }
}

impl Sensor for ScriptedSensor {
    fn acquire(&mut self) -> Result<Reading, AcquisitionError> {
        match self.script.pop_front() {
            Some(result) => result,
            None => {
                self.next += 1;
                Ok(reading(self.next))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Status(NodeStatus),
    Error(String),
}

/// Display que grava cada frame renderizado.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    pub frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingDisplay {
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }
}

impl StatusDisplay for RecordingDisplay {
    fn render_status(&mut self, status: &NodeStatus) {
        self.frames.lock().unwrap().push(Frame::Status(*status));
    }

    fn render_error(&mut self, message: &str) {
        self.frames.lock().unwrap().push(Frame::Error(message.to_string()));
    }
}

/// Transporte que grava os lotes recebidos e pode ser configurado para falhar.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<Batch>>,
    pub attempts: AtomicUsize,
    pub fail: AtomicBool,
    pub offline: AtomicBool,
}

impl RecordingTransport {
    pub fn failing() -> Self {
        let transport = Self::default();
        transport.fail.store(true, Ordering::SeqCst);
        transport
    }

    pub fn sent(&self) -> Vec<Batch> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Transport for RecordingTransport {
    fn send(&self, batch: &Batch) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::Rejected);
        }
        self.sent.lock().unwrap().push(batch.clone());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.offline.load(Ordering::SeqCst)
    }
}
