//! Sensor simulado tipo DHT: deriva lenta em torno dos valores base.
//!
//! Determinístico, para que duas execuções com a mesma config produzam a
//! mesma sequência de leituras e falhas.

use envmon_core::config::SensorConfig;
use envmon_core::{AcquisitionError, Reading, Sensor};
use std::time::Instant;

pub struct SimulatedSensor {
    base_temperature: f32,
    base_humidity: f32,
    fail_every: u32,
    count: u64,
    started: Instant,
}

impl SimulatedSensor {
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            base_temperature: config.base_temperature_c,
            base_humidity: config.base_humidity_pct,
            fail_every: config.fail_every,
            count: 0,
            started: Instant::now(),
        }
    }
}

impl Sensor for SimulatedSensor {
    fn acquire(&mut self) -> Result<Reading, AcquisitionError> {
        self.count += 1;

        if self.fail_every > 0 && self.count % u64::from(self.fail_every) == 0 {
            return Err(AcquisitionError::Unavailable(format!(
                "sem resposta do sensor (leitura #{})",
                self.count
            )));
        }

        let phase = self.count as f32 * 0.05;
        let temperature = self.base_temperature + 1.5 * phase.sin();
        let humidity = (self.base_humidity + 5.0 * (phase * 0.7).cos()).clamp(0.0, 100.0);
        let timestamp_ms = self.started.elapsed().as_millis() as u64;

        Reading::new(temperature, humidity, timestamp_ms)
    }
}
