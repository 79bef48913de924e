//! Thread de rede que escuta UDP, confirma cada lote e repassa para a
//! thread principal via channel.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use envmon_core::protocol::{
    ACK_SIZE, AckStatus, BatchPayload, ProtocolError, UNKNOWN_SEQ, decode_batch, encode_ack,
    has_magic,
};
use std::net::{SocketAddr, UdpSocket};
use tracing::{debug, info, warn};

/// Lotes pendentes entre a thread de rede e a principal.
const CHANNEL_CAPACITY: usize = 64;

/// Mensagem enviada da thread de rede para a principal.
#[derive(Debug, Clone)]
pub struct NetMessage {
    pub payload: BatchPayload,
    pub source_addr: String,
    pub raw_size: usize,
}

/// Classificação de um datagrama recebido.
#[derive(Debug)]
pub enum Datagram {
    /// Lote válido.
    Batch(BatchPayload),
    /// Tem nosso magic byte mas não decodifica; merece confirmação negativa.
    Malformed(ProtocolError),
    /// Tráfego alheio; ignorado sem resposta.
    Foreign,
}

pub fn classify(data: &[u8]) -> Datagram {
    match decode_batch(data) {
        Ok(payload) => Datagram::Batch(payload),
        Err(e) if has_magic(data) => Datagram::Malformed(e),
        Err(_) => Datagram::Foreign,
    }
}

/// Faz bind na porta e inicia a thread de rede. Retorna o receiver do channel.
pub fn spawn_receiver_thread(
    port: u16,
    sender_ip_filter: String,
) -> std::io::Result<Receiver<NetMessage>> {
    let sock = UdpSocket::bind(format!("0.0.0.0:{port}"))?;
    spawn_on_socket(sock, sender_ip_filter, CHANNEL_CAPACITY)
}

/// Inicia a thread de rede num socket já associado.
///
/// Com `capacity` lotes pendentes, os próximos recebem confirmação negativa.
pub fn spawn_on_socket(
    sock: UdpSocket,
    sender_ip_filter: String,
    capacity: usize,
) -> std::io::Result<Receiver<NetMessage>> {
    let (tx, rx) = bounded::<NetMessage>(capacity);

    let mode = if sender_ip_filter.is_empty() {
        "Auto (qualquer origem)".to_string()
    } else {
        sender_ip_filter.clone()
    };
    info!("Listener escutando em {} – Modo: {mode}", sock.local_addr()?);

    std::thread::Builder::new()
        .name("udp-listener".into())
        .spawn(move || receiver_loop(&sock, &tx, &sender_ip_filter))?;

    Ok(rx)
}

fn reply(sock: &UdpSocket, addr: SocketAddr, status: AckStatus, seq: u32) {
    let ack: [u8; ACK_SIZE] = encode_ack(status, seq);
    if let Err(e) = sock.send_to(&ack, addr) {
        warn!("Erro ao confirmar lote para {addr}: {e}");
    }
}

fn receiver_loop(sock: &UdpSocket, tx: &Sender<NetMessage>, sender_ip_filter: &str) {
    let mut buf = [0u8; 65536];
    loop {
        let (size, addr) = match sock.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) => {
                warn!("Erro ao receber UDP: {e}");
                continue;
            }
        };
        let source = addr.ip().to_string();

        // Filtro de IP se configurado
        if !sender_ip_filter.is_empty() && source != sender_ip_filter {
            debug!("Ignorando pacote de {source} (esperado: {sender_ip_filter})");
            continue;
        }

        match classify(&buf[..size]) {
            Datagram::Batch(payload) => {
                let seq = payload.seq;
                let msg = NetMessage {
                    payload,
                    source_addr: addr.to_string(),
                    raw_size: size,
                };
                // Só confirma o que a thread principal de fato aceitou
                match tx.try_send(msg) {
                    Ok(()) => reply(sock, addr, AckStatus::Accepted, seq),
                    Err(TrySendError::Full(_)) => {
                        warn!("Channel cheio, recusando lote #{seq} de {source}");
                        reply(sock, addr, AckStatus::Rejected, seq);
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        debug!("Thread principal encerrada, parando listener");
                        return;
                    }
                }
            }
            Datagram::Malformed(e) => {
                warn!("Lote inválido de {source}: {e}");
                reply(sock, addr, AckStatus::Rejected, UNKNOWN_SEQ);
            }
            Datagram::Foreign => {
                debug!("Pacote desconhecido de {source} ({size} bytes)");
            }
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use envmon_core::Reading;
    use envmon_core::protocol::{decode_ack, encode_batch};
    use std::time::Duration;

    fn payload() -> BatchPayload {
        BatchPayload {
            device_id: "ENVMON_NODE".into(),
            seq: 1,
            batch_time_ms: 4_000,
            readings: vec![
                Reading::new(21.5, 44.0, 2_000).unwrap(),
                Reading::new(21.6, 44.0, 4_000).unwrap(),
            ],
        }
    }

    #[test]
    fn classifies_datagrams() {
        let frame = encode_batch(&payload()).unwrap();
        assert!(matches!(classify(&frame), Datagram::Batch(p) if p == payload()));
        assert!(matches!(classify(&frame[..5]), Datagram::Malformed(_)));
        assert!(matches!(classify(b"GET / HTTP/1.1"), Datagram::Foreign));
    }

    #[test]
    fn receives_and_acknowledges_batch() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let server_addr = server.local_addr().unwrap();
        let rx = spawn_on_socket(server, String::new(), CHANNEL_CAPACITY).unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        client.connect(server_addr).unwrap();

        // Lixo com nosso magic: confirmação negativa
        client.send(&[envmon_core::protocol::MAGIC_BYTE, 1, 0xFF]).unwrap();
        let mut ack = [0u8; 16];
        let n = client.recv(&mut ack).unwrap();
        let reply = decode_ack(&ack[..n]).unwrap();
        assert_eq!(reply.status, AckStatus::Rejected);
        assert_eq!(reply.seq, UNKNOWN_SEQ);

        client.send(&encode_batch(&payload()).unwrap()).unwrap();
        let n = client.recv(&mut ack).unwrap();
        let reply = decode_ack(&ack[..n]).unwrap();
        assert_eq!(reply.status, AckStatus::Accepted);
        assert_eq!(reply.seq, 1);

        let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(msg.payload, payload());
        assert_eq!(msg.source_addr, client.local_addr().unwrap().to_string());
    }

    #[test]
    fn filtered_source_gets_no_reply() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let server_addr = server.local_addr().unwrap();
        let rx = spawn_on_socket(server, "10.9.9.9".into(), CHANNEL_CAPACITY).unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client.set_read_timeout(Some(Duration::from_millis(200))).unwrap();
        client.connect(server_addr).unwrap();
        client.send(&encode_batch(&payload()).unwrap()).unwrap();

        let mut ack = [0u8; 16];
        assert!(client.recv(&mut ack).is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_channel_rejects_batch() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let server_addr = server.local_addr().unwrap();
        let rx = spawn_on_socket(server, String::new(), 1).unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        client.connect(server_addr).unwrap();

        let mut ack = [0u8; 16];
        let mut statuses = Vec::new();
        for seq in 1..=2 {
            let batch = BatchPayload { seq, ..payload() };
            client.send(&encode_batch(&batch).unwrap()).unwrap();
            let n = client.recv(&mut ack).unwrap();
            let reply = decode_ack(&ack[..n]).unwrap();
            assert_eq!(reply.seq, seq);
            statuses.push(reply.status);
        }
        assert_eq!(statuses, [AckStatus::Accepted, AckStatus::Rejected]);

        // Só o lote confirmado chegou à thread principal
        assert_eq!(rx.try_recv().unwrap().payload.seq, 1);
        assert!(rx.try_recv().is_err());
    }
}
