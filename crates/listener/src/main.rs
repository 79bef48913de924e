//! # Envmon Listener
//!
//! Recebe lotes de leituras dos nós via UDP, confirma cada um, mostra as
//! leituras no log e grava tudo em JSON Lines.

mod journal;
mod net_thread;

use envmon_core::config::AppConfig;
use journal::{BatchRecord, Journal};
use std::path::Path;
use tracing::{error, info, warn};

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load_or_create(&config_path);

    let listener_cfg = &config.listener;

    // ── Journal ──
    let mut journal = if listener_cfg.journal_enabled {
        match Journal::open(Path::new(&listener_cfg.journal_path)) {
            Ok(j) => {
                info!("Gravando lotes em {}", j.path().display());
                Some(j)
            }
            Err(e) => {
                warn!("Não foi possível abrir {}: {e}. Seguindo sem journal", listener_cfg.journal_path);
                None
            }
        }
    } else {
        None
    };

    // ── Thread de rede ──
    let rx = match net_thread::spawn_receiver_thread(listener_cfg.port, listener_cfg.sender_ip.clone()) {
        Ok(rx) => rx,
        Err(e) => {
            error!("Falha ao escutar na porta {}: {e}", listener_cfg.port);
            std::process::exit(1);
        }
    };

    info!("Aguardando dados dos sensores...");

    for msg in rx.iter() {
        let payload = &msg.payload;
        info!(
            "Lote #{} recebido de {} ({}) – {} leituras, {} bytes",
            payload.seq,
            payload.device_id,
            msg.source_addr,
            payload.readings.len(),
            msg.raw_size
        );
        for (i, r) in payload.readings.iter().enumerate() {
            info!(
                "  {}: T={:.1}°C, H={:.0}%, Time={}",
                i + 1,
                r.temperature,
                r.humidity,
                r.timestamp_ms
            );
        }

        if let Some(j) = journal.as_mut() {
            if let Err(e) = j.append(&BatchRecord::new(payload, &msg.source_addr)) {
                warn!("Erro ao gravar journal: {e}");
            }
        }
    }
}
