//! Configuração unificada via TOML.
//!
//! Um único `config.toml` para o nó e o listener. Todos os campos têm
//! valor padrão, então um arquivo parcial é suficiente.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Parâmetros do pipeline de aquisição/despacho.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Período de amostragem (ms). DHT11 aceita no máximo 0,5 Hz.
    pub sampling_period_ms: u64,
    /// Período de atualização do display (ms)
    pub ui_period_ms: u64,
    /// Leituras por lote
    pub batch_threshold: usize,
    /// Lotes aguardando envio na fila
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sampling_period_ms: 2000,
            ui_period_ms: 500,
            batch_threshold: 10,
            queue_capacity: 5,
        }
    }
}

impl PipelineConfig {
    pub fn sampling_period(&self) -> Duration {
        Duration::from_millis(self.sampling_period_ms)
    }

    pub fn ui_period(&self) -> Duration {
        Duration::from_millis(self.ui_period_ms)
    }

    /// Valida só o pipeline.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.sampling_period_ms == 0 {
            errors.push("Período de amostragem não pode ser 0".into());
        }
        if self.ui_period_ms == 0 {
            errors.push("Período do display não pode ser 0".into());
        }
        if self.batch_threshold == 0 {
            errors.push("Threshold do lote não pode ser 0".into());
        }
        if self.queue_capacity == 0 {
            errors.push("Capacidade da fila não pode ser 0".into());
        }

        errors
    }
}

/// Identidade do nó.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Enviado em cada lote
    pub device_id: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            device_id: "ENVMON_NODE".into(),
        }
    }
}

/// Sensor simulado usado pelo binário do nó.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub base_temperature_c: f32,
    pub base_humidity_pct: f32,
    /// Falha a cada N leituras (0 = nunca)
    pub fail_every: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            base_temperature_c: 23.0,
            base_humidity_pct: 45.0,
            fail_every: 0,
        }
    }
}

/// Destino dos lotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// IP do listener
    pub dest_ip: String,
    /// Porta UDP do listener
    pub port: u16,
    /// IP local para bind (vazio = auto)
    pub bind_ip: String,
    /// Espera pela confirmação (ms, 0 = não espera)
    pub ack_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            dest_ip: "127.0.0.1".into(),
            port: 8080,
            bind_ip: String::new(),
            ack_timeout_ms: 1000,
        }
    }
}

impl TransportConfig {
    pub fn ack_timeout(&self) -> Option<Duration> {
        (self.ack_timeout_ms > 0).then(|| Duration::from_millis(self.ack_timeout_ms))
    }
}

/// Configuração do listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Porta UDP para escutar
    pub port: u16,
    /// IP do nó (vazio = aceita qualquer origem)
    pub sender_ip: String,
    /// Grava cada lote em JSON Lines
    pub journal_enabled: bool,
    pub journal_path: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            sender_ip: String::new(),
            journal_enabled: true,
            journal_path: "sensor_data.jsonl".into(),
        }
    }
}

/// Configuração raiz do aplicativo (unifica nó e listener).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub node: NodeConfig,
    pub pipeline: PipelineConfig,
    pub sensor: SensorConfig,
    pub transport: TransportConfig,
    pub listener: ListenerConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Carrega a config e grava a padrão quando o arquivo ainda não existe.
    ///
    /// Uma falha ao gravar só gera aviso; o processo segue com os defaults.
    pub fn load_or_create(path: &Path) -> Self {
        let config = Self::load(path);
        if !path.exists() {
            if let Err(e) = config.save(path) {
                warn!("Não foi possível salvar config padrão: {e}");
            }
        }
        config
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.pipeline.validate();

        if self.node.device_id.trim().is_empty() {
            errors.push("device_id não pode ser vazio".into());
        }
        if self.transport.port == 0 {
            errors.push("Porta do transporte não pode ser 0".into());
        }
        if self.listener.port == 0 {
            errors.push("Porta do listener não pode ser 0".into());
        }

        errors
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
