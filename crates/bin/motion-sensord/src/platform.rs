//! Multi-sensor platform: starts every configured sensor independently.

use motion_adapter_repeater_reqwest::{HttpRepeater, RepeaterError};
use motion_app::event_bus::InProcessEventBus;
use motion_domain::error::MotionSensorError;

use crate::accessory::MotionSensorAccessory;
use crate::config::Config;

/// The set of sensors that started successfully.
pub struct Platform {
    name: String,
    accessories: Vec<MotionSensorAccessory>,
}

impl Platform {
    /// Start one accessory per configured sensor.
    ///
    /// A sensor entry that cannot be decoded, fails validation or cannot bind
    /// is logged and skipped; its siblings are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`RepeaterError`] if the shared repeater client cannot be
    /// built. No sensor is started in that case.
    pub async fn start(config: &Config, bus: &InProcessEventBus) -> Result<Self, RepeaterError> {
        let repeater = HttpRepeater::new(&config.repeater)?;
        let mut accessories = Vec::with_capacity(config.sensors.len());

        for entry in config.sensor_entries() {
            let raw = match entry {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::error!(
                        entry = err.index,
                        error = %err.source,
                        "sensor entry is not a table, sensor disabled"
                    );
                    continue;
                }
            };
            let sensor = raw.display_name().to_string();
            match MotionSensorAccessory::create(raw, bus, repeater.clone()).await {
                Ok(accessory) => accessories.push(accessory),
                Err(MotionSensorError::Validation(err)) => {
                    for field in err.errors() {
                        tracing::error!(
                            sensor = %sensor,
                            field = %field.field,
                            reason = %field.kind,
                            "invalid sensor configuration"
                        );
                    }
                    tracing::error!(sensor = %sensor, "sensor disabled");
                }
                Err(MotionSensorError::Bind(err)) => {
                    tracing::error!(
                        sensor = %sensor,
                        addr = %err.addr,
                        error = %err.source,
                        "failed to start trigger listener, sensor disabled"
                    );
                }
            }
        }

        tracing::info!(
            platform = %config.platform.name,
            running = accessories.len(),
            configured = config.sensors.len(),
            "platform started"
        );

        Ok(Self {
            name: config.platform.name.clone(),
            accessories,
        })
    }

    /// The running accessories, in configuration order.
    #[must_use]
    pub fn accessories(&self) -> &[MotionSensorAccessory] {
        &self.accessories
    }

    /// Look up a running accessory by sensor name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MotionSensorAccessory> {
        self.accessories.iter().find(|accessory| accessory.name() == name)
    }

    /// Whether no sensor is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accessories.is_empty()
    }

    /// Shut every accessory down and release their ports.
    pub async fn shutdown(&mut self) {
        for accessory in &mut self.accessories {
            accessory.shutdown().await;
        }
        tracing::info!(platform = %self.name, "platform stopped");
    }
}
