//! Protocolo binário de envio de lotes.
//!
//! Substitui o POST JSON por um datagrama bincode com header fixo.
//! Formato do frame de lote:
//!
//! ```text
//! ┌──────────┬─────────┬──────────────────────┐
//! │ Magic(1) │ Ver.(1) │ BatchPayload (N)     │
//! └──────────┴─────────┴──────────────────────┘
//! ```
//!
//! O destino responde com um frame de confirmação de 7 bytes
//! (`[Magic][Ver.][Status][Seq u32 LE]`), equivalente ao código HTTP
//! 2xx / não-2xx. O `Seq` ecoa o [`BatchPayload::seq`] do lote confirmado;
//! o valor 0 fica reservado para respostas a frames que não decodificam.

use crate::types::Reading;
use serde::{Deserialize, Serialize};

/// Magic byte que identifica pacotes do nó ('E').
pub const MAGIC_BYTE: u8 = 0x45;

/// Versão atual do protocolo.
pub const PROTOCOL_VERSION: u8 = 2;

/// Tamanho do header (magic + version).
const HEADER_SIZE: usize = 2;

/// Tamanho do frame de confirmação (status + seq).
pub const ACK_SIZE: usize = HEADER_SIZE + 1 + 4;

/// Seq usado quando o lote confirmado não pôde ser identificado.
pub const UNKNOWN_SEQ: u32 = 0;

/// Tamanho máximo de pacote UDP seguro (sem fragmentação).
pub const MAX_UDP_PAYLOAD: usize = 65507;

/// Erros do protocolo.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Pacote muito curto ({0} bytes, mínimo {HEADER_SIZE})")]
    TooShort(usize),

    #[error("Frame muito grande ({0} bytes, máximo {MAX_UDP_PAYLOAD})")]
    TooLarge(usize),

    #[error("Magic byte inválido: 0x{0:02X} (esperado 0x{MAGIC_BYTE:02X})")]
    InvalidMagic(u8),

    #[error("Versão incompatível: {0} (suportada: {PROTOCOL_VERSION})")]
    VersionMismatch(u8),

    #[error("Status de confirmação desconhecido: {0}")]
    UnknownAck(u8),

    #[error("Erro de serialização: {0}")]
    Serialize(String),

    #[error("Erro de deserialização: {0}")]
    Deserialize(String),
}

/// Conteúdo de um datagrama de lote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchPayload {
    /// Identificador do nó de origem
    pub device_id: String,
    /// Número de sequência do lote, ecoado na confirmação
    pub seq: u32,
    /// Instante do envio (ms desde o boot do nó)
    pub batch_time_ms: u64,
    pub readings: Vec<Reading>,
}

/// Resposta do destino a um lote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckStatus {
    Accepted,
    Rejected,
}

/// Confirmação decodificada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub status: AckStatus,
    pub seq: u32,
}

impl AckStatus {
    fn code(self) -> u8 {
        match self {
            AckStatus::Accepted => 0,
            AckStatus::Rejected => 1,
        }
    }
}

/// Valida magic e versão, devolvendo o corpo do frame.
fn check_header(data: &[u8]) -> Result<&[u8], ProtocolError> {
    if data.len() < HEADER_SIZE {
        return Err(ProtocolError::TooShort(data.len()));
    }

    let magic = data[0];
    if magic != MAGIC_BYTE {
        return Err(ProtocolError::InvalidMagic(magic));
    }

    let version = data[1];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::VersionMismatch(version));
    }

    Ok(&data[HEADER_SIZE..])
}

/// Indica se o datagrama parece ser do nosso protocolo (só o magic byte).
pub fn has_magic(data: &[u8]) -> bool {
    data.first() == Some(&MAGIC_BYTE)
}

/// Codifica um [`BatchPayload`] para transmissão UDP.
///
/// Retorna bytes no formato: `[MAGIC][VERSION][bincode_payload...]`
pub fn encode_batch(payload: &BatchPayload) -> Result<Vec<u8>, ProtocolError> {
    let body = bincode::serialize(payload).map_err(|e| ProtocolError::Serialize(e.to_string()))?;

    let total = HEADER_SIZE + body.len();
    if total > MAX_UDP_PAYLOAD {
        return Err(ProtocolError::TooLarge(total));
    }

    let mut frame = Vec::with_capacity(total);
    frame.push(MAGIC_BYTE);
    frame.push(PROTOCOL_VERSION);
    frame.extend_from_slice(&body);

    Ok(frame)
}

/// Decodifica um datagrama recebido em [`BatchPayload`].
pub fn decode_batch(data: &[u8]) -> Result<BatchPayload, ProtocolError> {
    let body = check_header(data)?;
    bincode::deserialize(body).map_err(|e| ProtocolError::Deserialize(e.to_string()))
}

/// Codifica o frame de confirmação do lote `seq`.
pub fn encode_ack(status: AckStatus, seq: u32) -> [u8; ACK_SIZE] {
    let mut frame = [0u8; ACK_SIZE];
    frame[0] = MAGIC_BYTE;
    frame[1] = PROTOCOL_VERSION;
    frame[2] = status.code();
    frame[3..].copy_from_slice(&seq.to_le_bytes());
    frame
}

/// Decodifica o frame de confirmação.
pub fn decode_ack(data: &[u8]) -> Result<Ack, ProtocolError> {
    let body = check_header(data)?;
    let Some((&code, seq)) = body.split_first() else {
        return Err(ProtocolError::TooShort(data.len()));
    };
    let status = match code {
        0 => AckStatus::Accepted,
        1 => AckStatus::Rejected,
        other => return Err(ProtocolError::UnknownAck(other)),
    };
    let seq: [u8; 4] = seq
        .try_into()
        .map_err(|_| ProtocolError::TooShort(data.len()))?;
    Ok(Ack {
        status,
        seq: u32::from_le_bytes(seq),
    })
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> BatchPayload {
        BatchPayload {
            device_id: "ENVMON_NODE".into(),
            seq: 7,
            batch_time_ms: 20_000,
            readings: (0..10)
                .map(|i| Reading::new(22.0 + i as f32 * 0.1, 48.0, i * 2_000).unwrap())
                .collect(),
        }
    }

    #[test]
    fn encode_decode_roundtrip() {
        let original = sample_payload();
        let encoded = encode_batch(&original).unwrap();
        let decoded = decode_batch(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn header_is_correct() {
        let encoded = encode_batch(&BatchPayload::default()).unwrap();
        assert_eq!(encoded[0], MAGIC_BYTE);
        assert_eq!(encoded[1], PROTOCOL_VERSION);
        assert!(has_magic(&encoded));
    }

    #[test]
    fn rejects_invalid_magic() {
        let mut encoded = encode_batch(&sample_payload()).unwrap();
        encoded[0] = 0xFF;
        assert!(!has_magic(&encoded));
        assert!(matches!(
            decode_batch(&encoded),
            Err(ProtocolError::InvalidMagic(0xFF))
        ));
    }

    #[test]
    fn rejects_short_packet() {
        assert!(matches!(
            decode_batch(&[MAGIC_BYTE]),
            Err(ProtocolError::TooShort(1))
        ));
    }

    #[test]
    fn rejects_wrong_version() {
        let mut encoded = encode_batch(&sample_payload()).unwrap();
        encoded[1] = 99;
        assert!(matches!(
            decode_batch(&encoded),
            Err(ProtocolError::VersionMismatch(99))
        ));
    }

    #[test]
    fn truncated_body_fails_deserialize() {
        let encoded = encode_batch(&sample_payload()).unwrap();
        assert!(matches!(
            decode_batch(&encoded[..encoded.len() / 2]),
            Err(ProtocolError::Deserialize(_))
        ));
    }

    #[test]
    fn oversized_batch_is_refused() {
        // 16 bytes por leitura em bincode: ~4100 leituras estouram o datagrama
        let payload = BatchPayload {
            readings: vec![Reading::new(20.0, 50.0, 0).unwrap(); 4_200],
            ..Default::default()
        };
        assert!(matches!(
            encode_batch(&payload),
            Err(ProtocolError::TooLarge(_))
        ));
    }

    #[test]
    fn ack_frames() {
        let frame = encode_ack(AckStatus::Rejected, 0x0102_0304);
        assert_eq!(frame, [MAGIC_BYTE, PROTOCOL_VERSION, 1, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(
            decode_ack(&frame).unwrap(),
            Ack {
                status: AckStatus::Rejected,
                seq: 0x0102_0304
            }
        );
        assert_eq!(decode_ack(&encode_ack(AckStatus::Accepted, 9)).unwrap().status, AckStatus::Accepted);
        assert!(matches!(
            decode_ack(&[MAGIC_BYTE, PROTOCOL_VERSION, 7, 0, 0, 0, 0]),
            Err(ProtocolError::UnknownAck(7))
        ));
        assert!(matches!(
            decode_ack(&[MAGIC_BYTE, PROTOCOL_VERSION]),
            Err(ProtocolError::TooShort(2))
        ));
        // Frame antigo, sem seq
        assert!(matches!(
            decode_ack(&[MAGIC_BYTE, PROTOCOL_VERSION, 0]),
            Err(ProtocolError::TooShort(3))
        ));
    }
}
