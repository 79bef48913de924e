//! Agendamento periódico com gancho de encerramento.
//!
//! O sinal de shutdown é um channel crossbeam que nunca recebe mensagem:
//! dropar o [`ShutdownTrigger`] desconecta o channel e acorda na hora
//! qualquer atividade parada em [`ShutdownSignal::wait`].

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::time::{Duration, Instant};
use tracing::debug;

/// Lado que dispara o encerramento.
#[derive(Debug)]
pub struct ShutdownTrigger {
    _tx: Sender<()>,
}

impl ShutdownTrigger {
    /// Dispara o encerramento para todos os [`ShutdownSignal`] ligados.
    pub fn fire(self) {
        drop(self);
    }
}

/// Lado observado pelas atividades.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: Receiver<()>,
}

impl ShutdownSignal {
    /// Espera até `timeout`. Retorna `true` se a atividade deve continuar.
    pub fn wait(&self, timeout: Duration) -> bool {
        matches!(self.rx.recv_timeout(timeout), Err(RecvTimeoutError::Timeout))
    }
}

pub fn shutdown_pair() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = bounded(0);
    (ShutdownTrigger { _tx: tx }, ShutdownSignal { rx })
}

/// Executa `tick` a cada `period` até o shutdown.
///
/// Dorme pelo tempo restante do período. Um tick que estoura o período é
/// seguido imediatamente pelo próximo, sem recuperar os períodos perdidos.
pub fn run_periodic<F>(name: &str, period: Duration, shutdown: &ShutdownSignal, mut tick: F)
where
    F: FnMut(),
{
    debug!("{name}: iniciando (período {period:?})");
    loop {
        let cycle_start = Instant::now();

        tick();

        let remaining = period.saturating_sub(cycle_start.elapsed());
        if !shutdown.wait(remaining) {
            break;
        }
    }
    debug!("{name}: encerrada");
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
