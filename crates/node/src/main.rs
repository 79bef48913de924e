//! # Envmon Node
//!
//! Amostra o sensor periodicamente, mostra o status no display e envia
//! lotes de leituras via UDP para o listener.
//!
//! ## Uso
//! ```bash
//! envmon_node              # lê config.toml ao lado do executável
//! RUST_LOG=debug envmon_node
//! ```

mod console_display;
mod sim_sensor;
mod udp_transport;

use console_display::ConsoleDisplay;
use crossbeam_channel::bounded;
use envmon_core::config::AppConfig;
use envmon_core::start_pipeline;
use sim_sensor::SimulatedSensor;
use std::sync::Arc;
use tracing::{error, info, warn};
use udp_transport::UdpTransport;

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load_or_create(&config_path);

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Config inválida: {e}");
        }
        std::process::exit(1);
    }

    // ── Colaboradores ──
    let transport = match UdpTransport::connect(&config.transport, &config.node.device_id) {
        Ok(t) => Arc::new(t),
        Err(e) => {
            error!("Falha ao criar socket UDP: {e}");
            std::process::exit(1);
        }
    };
    let sensor = SimulatedSensor::new(&config.sensor);
    let display = ConsoleDisplay::new();

    // ── Banner ──
    let p = &config.pipeline;
    println!();
    println!("══════════════════════════════════════════════");
    println!("   🌡  ENVMON NODE – ATIVO");
    println!("══════════════════════════════════════════════");
    println!("  Dispositivo: {}", config.node.device_id);
    println!("  Destino:     {}", transport.dest_addr());
    println!("  Amostragem:  {} ms | Display: {} ms", p.sampling_period_ms, p.ui_period_ms);
    println!("  Lote:        {} leituras | Fila: {} lotes", p.batch_threshold, p.queue_capacity);
    println!("  Protocolo:   bincode v{}", envmon_core::PROTOCOL_VERSION);
    println!("══════════════════════════════════════════════");
    println!();

    // ── Pipeline ──
    let handle = match start_pipeline(p, sensor, display, transport) {
        Ok(h) => h,
        Err(e) => {
            error!("Falha ao iniciar pipeline: {e}");
            std::process::exit(1);
        }
    };

    // ── Espera Ctrl-C ──
    let (stop_tx, stop_rx) = bounded::<()>(1);
    match ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    }) {
        Ok(()) => {
            let _ = stop_rx.recv();
        }
        Err(e) => {
            warn!("Handler de Ctrl-C indisponível ({e}); pipeline segue até o processo ser morto");
            loop {
                std::thread::park();
            }
        }
    }

    info!("Encerrando pipeline...");
    if let Some(r) = handle.latest_reading() {
        info!("Última leitura: {:.1} °C  {:.0} %RH", r.temperature, r.humidity);
    }
    let pending = handle.buffered();
    let stats = handle.shutdown();
    if pending > 0 {
        warn!("{pending} leituras ainda no buffer foram descartadas");
    }
    info!(
        "Leituras: {} (falhas {}) | Lotes enviados: {} | falhos: {} | leituras perdidas: {} | fila cheia: {}x",
        stats.readings_acquired,
        stats.acquisition_failures,
        stats.batches_sent,
        stats.batches_failed,
        stats.readings_lost,
        stats.queue_full
    );
}
