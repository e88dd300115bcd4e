//! One motion sensor accessory: validated config, controller and listener.

use std::net::SocketAddr;
use std::sync::Arc;

use motion_adapter_http_axum::TriggerListener;
use motion_adapter_repeater_reqwest::HttpRepeater;
use motion_app::controller::MotionController;
use motion_app::event_bus::{InProcessEventBus, SensorPublisher};
use motion_domain::config::RawSensorConfig;
use motion_domain::error::MotionSensorError;
use motion_domain::sensor::{AccessoryInfo, SensorConfig};

type Controller = MotionController<SensorPublisher, HttpRepeater>;

/// A running motion sensor.
///
/// Created only from a configuration that validated cleanly and whose
/// listener bound successfully; otherwise nothing is left running.
pub struct MotionSensorAccessory {
    info: AccessoryInfo,
    controller: Arc<Controller>,
    listener: TriggerListener,
}

impl MotionSensorAccessory {
    /// Validate `raw`, then start the sensor's listener.
    ///
    /// State changes are published on `bus`; triggers are relayed through
    /// `repeater`.
    ///
    /// # Errors
    ///
    /// Returns [`MotionSensorError::Validation`] listing every invalid field,
    /// or [`MotionSensorError::Bind`] when the listen address is unavailable.
    pub async fn create(
        raw: RawSensorConfig,
        bus: &InProcessEventBus,
        repeater: HttpRepeater,
    ) -> Result<Self, MotionSensorError> {
        let config = SensorConfig::try_from(raw)?;
        let info = AccessoryInfo::for_sensor(&config);
        let controller = Arc::new(MotionController::new(
            &config,
            bus.publisher(config.name()),
            repeater,
        ));

        let listener =
            match TriggerListener::start(config.socket_addr(), Arc::clone(&controller)).await {
                Ok(listener) => listener,
                Err(err) => {
                    controller.shutdown();
                    return Err(err.into());
                }
            };

        tracing::info!(
            sensor = %config.name(),
            addr = %listener.local_addr(),
            timeout_secs = config.motion_timeout().as_secs(),
            repeaters = config.repeaters().len(),
            "motion sensor listening"
        );

        Ok(Self {
            info,
            controller,
            listener,
        })
    }

    /// Accessory metadata.
    #[must_use]
    pub fn info(&self) -> &AccessoryInfo {
        &self.info
    }

    /// Sensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Current motion state.
    #[must_use]
    pub fn get_state(&self) -> bool {
        self.controller.get_state()
    }

    /// Address the trigger listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Cancel the pending reset and release the listen port. Idempotent.
    pub async fn shutdown(&mut self) {
        self.controller.shutdown();
        self.listener.stop().await;
    }
}
