//! Transporte UDP: um datagrama por lote e, opcionalmente, espera pela
//! confirmação do listener (equivalente à resposta 2xx do HTTP).

use envmon_core::config::TransportConfig;
use envmon_core::protocol::{AckStatus, BatchPayload, UNKNOWN_SEQ, decode_ack, encode_batch};
use envmon_core::{Batch, Transport, TransportError};
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct UdpTransport {
    socket: UdpSocket,
    dest_addr: String,
    device_id: String,
    ack_timeout: Option<Duration>,
    next_seq: AtomicU32,
    connected: AtomicBool,
    started: Instant,
}

impl UdpTransport {
    /// Faz bind local e associa o socket ao destino.
    pub fn connect(config: &TransportConfig, device_id: &str) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(if config.bind_ip.is_empty() {
            "0.0.0.0:0".to_string()
        } else {
            format!("{}:0", config.bind_ip)
        })?;

        let dest_addr = format!("{}:{}", config.dest_ip, config.port);
        socket.connect(&dest_addr)?;

        match config.ack_timeout() {
            Some(t) => info!("Transporte UDP → {dest_addr} (confirmação em até {t:?})"),
            None => info!("Transporte UDP → {dest_addr} (sem confirmação)"),
        }

        Ok(Self {
            socket,
            dest_addr,
            device_id: device_id.to_string(),
            ack_timeout: config.ack_timeout(),
            next_seq: AtomicU32::new(1),
            connected: AtomicBool::new(true),
            started: Instant::now(),
        })
    }

    pub fn dest_addr(&self) -> &str {
        &self.dest_addr
    }

    /// Próximo número de sequência, pulando o valor reservado.
    fn allocate_seq(&self) -> u32 {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        if seq == UNKNOWN_SEQ {
            self.next_seq.fetch_add(1, Ordering::Relaxed)
        } else {
            seq
        }
    }

    /// Envia o frame e espera a confirmação do lote `seq` até o prazo.
    ///
    /// Confirmações de outros lotes (atrasadas de envios anteriores) são
    /// descartadas sem consumir o resultado deste envio.
    fn exchange(&self, frame: &[u8], seq: u32) -> Result<(), TransportError> {
        self.socket.send(frame)?;
        let Some(timeout) = self.ack_timeout else {
            return Ok(());
        };

        let deadline = Instant::now() + timeout;
        let mut buf = [0u8; 64];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(TransportError::AckTimeout);
            }
            self.socket.set_read_timeout(Some(remaining))?;

            let n = match self.socket.recv(&mut buf) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => {
                    return Err(TransportError::AckTimeout);
                }
                Err(e) => return Err(TransportError::Io(e)),
            };

            match decode_ack(&buf[..n]) {
                Ok(ack) if ack.seq == seq => {
                    return match ack.status {
                        AckStatus::Accepted => Ok(()),
                        AckStatus::Rejected => Err(TransportError::Rejected),
                    };
                }
                Ok(ack) => debug!("Confirmação do lote #{} descartada (esperando #{seq})", ack.seq),
                Err(e) => debug!("Resposta inválida descartada: {e}"),
            }
        }
    }
}

impl Transport for UdpTransport {
    fn send(&self, batch: &Batch) -> Result<(), TransportError> {
        let seq = self.allocate_seq();
        let payload = BatchPayload {
            device_id: self.device_id.clone(),
            seq,
            batch_time_ms: self.started.elapsed().as_millis() as u64,
            readings: batch.readings().to_vec(),
        };
        let frame = encode_batch(&payload)?;
        debug!("Enviando lote #{seq} de {} leituras ({} bytes)", batch.len(), frame.len());

        let result = self.exchange(&frame, seq);
        match &result {
            Ok(()) | Err(TransportError::Rejected) => self.connected.store(true, Ordering::Relaxed),
            Err(TransportError::AckTimeout) | Err(TransportError::Io(_)) => {
                self.connected.store(false, Ordering::Relaxed)
            }
            Err(TransportError::Protocol(_)) => {}
        }
        result
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use envmon_core::Reading;
    use envmon_core::protocol::{decode_batch, encode_ack};
    use std::net::SocketAddr;
    use std::thread;

    fn batch() -> Batch {
        Batch::new((0..3).map(|i| Reading::new(22.0, 50.0, i).unwrap()).collect())
    }

    fn recv_batch(sock: &UdpSocket) -> (BatchPayload, SocketAddr) {
        let mut buf = [0u8; 2048];
        let (n, from) = sock.recv_from(&mut buf).unwrap();
        (decode_batch(&buf[..n]).unwrap(), from)
    }

    /// Listener falso que responde uma vez com `reply` (ou não responde).
    fn fake_listener(reply: Option<AckStatus>) -> (u16, thread::JoinHandle<BatchPayload>) {
        let sock = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = sock.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (payload, from) = recv_batch(&sock);
            if let Some(status) = reply {
                sock.send_to(&encode_ack(status, payload.seq), from).unwrap();
            }
            payload
        });
        (port, handle)
    }

    fn config(port: u16, ack_timeout_ms: u64) -> TransportConfig {
        TransportConfig {
            dest_ip: "127.0.0.1".into(),
            port,
            bind_ip: "127.0.0.1".into(),
            ack_timeout_ms,
        }
    }

    #[test]
    fn accepted_batch_is_success() {
        let (port, listener) = fake_listener(Some(AckStatus::Accepted));
        let transport = UdpTransport::connect(&config(port, 2_000), "NO_TESTE").unwrap();

        transport.send(&batch()).unwrap();
        assert!(transport.is_connected());

        let payload = listener.join().unwrap();
        assert_eq!(payload.device_id, "NO_TESTE");
        assert_eq!(payload.seq, 1);
        assert_eq!(payload.readings, batch().into_readings());
    }

    #[test]
    fn rejected_batch_is_error_but_link_up() {
        let (port, listener) = fake_listener(Some(AckStatus::Rejected));
        let transport = UdpTransport::connect(&config(port, 2_000), "NO_TESTE").unwrap();

        assert!(matches!(transport.send(&batch()), Err(TransportError::Rejected)));
        assert!(transport.is_connected());
        listener.join().unwrap();
    }

    #[test]
    fn missing_ack_marks_link_down() {
        let (port, listener) = fake_listener(None);
        let transport = UdpTransport::connect(&config(port, 50), "NO_TESTE").unwrap();

        assert!(matches!(transport.send(&batch()), Err(TransportError::AckTimeout)));
        assert!(!transport.is_connected());
        listener.join().unwrap();
    }

    #[test]
    fn late_ack_of_previous_batch_is_not_taken_for_current() {
        let sock = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = sock.local_addr().unwrap().port();
        let listener = thread::spawn(move || {
            let (first, _) = recv_batch(&sock);
            let (second, from) = recv_batch(&sock);
            // Aceite do primeiro chega depois do prazo, antes da resposta do segundo
            sock.send_to(&encode_ack(AckStatus::Accepted, first.seq), from).unwrap();
            sock.send_to(&encode_ack(AckStatus::Rejected, second.seq), from).unwrap();
            (first.seq, second.seq)
        });

        let transport = UdpTransport::connect(&config(port, 300), "NO_TESTE").unwrap();
        assert!(matches!(transport.send(&batch()), Err(TransportError::AckTimeout)));
        assert!(!transport.is_connected());

        assert!(matches!(transport.send(&batch()), Err(TransportError::Rejected)));
        assert!(transport.is_connected());

        let (first_seq, second_seq) = listener.join().unwrap();
        assert_ne!(first_seq, second_seq);
    }

    #[test]
    fn fire_and_forget_without_ack() {
        let (port, listener) = fake_listener(None);
        let transport = UdpTransport::connect(&config(port, 0), "NO_TESTE").unwrap();

        transport.send(&batch()).unwrap();
        assert_eq!(listener.join().unwrap().readings.len(), 3);
    }

    #[test]
    fn sequence_skips_reserved_value() {
        let (port, listener) = fake_listener(None);
        let transport = UdpTransport::connect(&config(port, 0), "NO_TESTE").unwrap();
        transport.next_seq.store(u32::MAX, Ordering::Relaxed);

        assert_eq!(transport.allocate_seq(), u32::MAX);
        assert_eq!(transport.allocate_seq(), 1);
        transport.send(&batch()).unwrap();
        listener.join().unwrap();
    }
}
