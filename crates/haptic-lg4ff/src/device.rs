//! Opened lg4ff device and its background update thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hidhaptic_driver::{EffectId, EffectStatus, HapticDevice};
use hidhaptic_effects::{HapticEffect, HapticFeatures, MAX_PERCENT};
use hidhaptic_errors::{DeviceError, HapticError, Result};
use hidhaptic_hid_common::JoystickTransport;
use hidhaptic_logitech_protocol::{
    LOGITECH_VENDOR_ID, LogitechModel, autocenter_commands, is_supported_product,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::config::Lg4ffConfig;
use crate::renderer::{LG4FF_FEATURES, LinkEvent, MAX_EFFECTS, RendererState};

/// Interval between two renderer ticks.
pub const TICK_PERIOD: Duration = Duration::from_millis(2);

/// Time given to stopped effects to wind down before the thread exits.
pub const CLOSE_GRACE_PERIOD: Duration = Duration::from_millis(50);

pub(crate) const DRIVER_NAME: &str = "lg4ff";

/// `true` if `joystick` is a Logitech wheel this driver handles.
pub fn is_supported(joystick: &dyn JoystickTransport) -> bool {
    joystick.vendor_id() == LOGITECH_VENDOR_ID && is_supported_product(joystick.product_id())
}

struct Shared {
    renderer: Mutex<RendererState>,
    joystick: Arc<dyn JoystickTransport>,
    clock: Arc<dyn Clock>,
    stop: AtomicBool,
    device: String,
}

/// A Logitech wheel driven by the lg4ff renderer.
///
/// The device owns a background thread that renders every
/// [`TICK_PERIOD`] and is the only writer of slot commands. API calls lock
/// the same renderer, so they are serialized against the tick.
pub struct Lg4ffDevice {
    shared: Arc<Shared>,
    thread: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl Lg4ffDevice {
    /// Open `joystick` with the configuration from the environment.
    ///
    /// # Errors
    ///
    /// See [`Lg4ffDevice::open_with`].
    pub fn open(joystick: Arc<dyn JoystickTransport>) -> Result<Self> {
        Self::open_with(joystick, Lg4ffConfig::from_env(), Arc::new(MonotonicClock::new()))
    }

    /// Open `joystick` with an explicit configuration and clock.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedDevice`] for foreign joysticks and
    /// [`DeviceError::InitializationFailed`] when a setup command cannot be
    /// written or the update thread cannot be spawned.
    pub fn open_with(
        joystick: Arc<dyn JoystickTransport>,
        config: Lg4ffConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let vendor_id = joystick.vendor_id();
        let product_id = joystick.product_id();
        if !is_supported(joystick.as_ref()) {
            return Err(DeviceError::unsupported(vendor_id, product_id).into());
        }

        let device = format!("{vendor_id:04x}:{product_id:04x}");
        let model = LogitechModel::from_ids(product_id, joystick.product_version());

        let mut renderer = RendererState::new(model, &config);
        for report in renderer.init_slots() {
            joystick.send_effect(&report).map_err(|e| {
                error!(device = %device, error = %e, "Failed initializing effect slots");
                DeviceError::initialization(&device, format!("effect slot setup: {e}"))
            })?;
        }

        info!(
            device = %device,
            model = %model,
            spring = config.spring_level,
            damper = config.damper_level,
            friction = config.friction_level,
            gain = config.gain,
            "Opened lg4ff haptic device"
        );

        let shared = Arc::new(Shared {
            renderer: Mutex::new(renderer),
            joystick,
            clock,
            stop: AtomicBool::new(false),
            device,
        });

        let thread_shared = Arc::clone(&shared);
        let thread = thread::Builder::new()
            .name(format!("lg4ff {vendor_id:04x}:{product_id:04x}"))
            .spawn(move || update_thread_main(&thread_shared))
            .map_err(|e| DeviceError::initialization(&shared.device, format!("update thread: {e}")))?;

        Ok(Self {
            shared,
            thread: Mutex::new(Some(thread)),
            closed: AtomicBool::new(false),
        })
    }

    pub fn model(&self) -> LogitechModel {
        self.shared.renderer.lock().model()
    }

    /// Largest combined force level rendered so far.
    pub fn peak_ffb_level(&self) -> i64 {
        self.shared.renderer.lock().peak_ffb_level()
    }

    /// Ticks whose writes failed.
    pub fn write_failures(&self) -> u64 {
        self.shared.renderer.lock().write_failures()
    }

    pub fn is_device_lost(&self) -> bool {
        self.shared.renderer.lock().is_lost()
    }

    /// Lock the renderer for a mutating call, failing once the device is lost.
    fn live_renderer(&self) -> Result<parking_lot::MutexGuard<'_, RendererState>> {
        let renderer = self.shared.renderer.lock();
        if renderer.is_lost() {
            return Err(DeviceError::DeviceLost {
                device: self.shared.device.clone(),
                consecutive_failures: renderer.failure_streak(),
            }
            .into());
        }
        Ok(renderer)
    }

    fn now(&self) -> u64 {
        self.shared.clock.now_ms()
    }
}

impl HapticDevice for Lg4ffDevice {
    fn driver_name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn num_effects(&self) -> usize {
        MAX_EFFECTS
    }

    fn num_effects_playing(&self) -> usize {
        MAX_EFFECTS
    }

    fn features(&self) -> HapticFeatures {
        LG4FF_FEATURES
    }

    fn num_axes(&self) -> usize {
        1
    }

    fn new_effect(&self, effect: &HapticEffect) -> Result<EffectId> {
        let now = self.now();
        let id = self.live_renderer()?.new_effect(effect, now)?;
        debug!(device = %self.shared.device, id = %id, kind = %effect.kind(), "Created effect");
        Ok(id)
    }

    fn update_effect(&self, id: EffectId, effect: &HapticEffect) -> Result<()> {
        let now = self.now();
        self.live_renderer()?.update_effect(id, effect, now)?;
        Ok(())
    }

    fn run_effect(&self, id: EffectId, iterations: u32) -> Result<()> {
        let now = self.now();
        // Stopping stays allowed on a lost device.
        let mut renderer = if iterations == 0 {
            self.shared.renderer.lock()
        } else {
            self.live_renderer()?
        };
        renderer.run_effect(id, iterations, now)?;
        Ok(())
    }

    fn destroy_effect(&self, id: EffectId) -> Result<()> {
        self.shared.renderer.lock().destroy_effect(id)?;
        debug!(device = %self.shared.device, id = %id, "Destroyed effect");
        Ok(())
    }

    fn effect_status(&self, id: EffectId) -> Result<EffectStatus> {
        let started = self.shared.renderer.lock().effect_status(id)?;
        Ok(if started {
            EffectStatus::Playing
        } else {
            EffectStatus::Stopped
        })
    }

    fn set_gain(&self, gain: i32) -> Result<()> {
        self.live_renderer()?.set_app_gain(gain);
        Ok(())
    }

    fn set_autocenter(&self, autocenter: i32) -> Result<()> {
        let autocenter = u8::try_from(autocenter.clamp(0, MAX_PERCENT)).unwrap_or(0);
        let renderer = self.live_renderer()?;
        let model = renderer.model();
        for report in autocenter_commands(model, autocenter).iter() {
            self.shared.joystick.send_effect(report).map_err(|e| {
                warn!(device = %self.shared.device, error = %e, "Failed sending autocenter command");
                HapticError::from(e.into_device_error(self.shared.device.clone()))
            })?;
        }
        debug!(device = %self.shared.device, autocenter, ffex = model.is_ffex(), "Set autocenter");
        Ok(())
    }

    fn stop_all(&self) -> Result<()> {
        self.shared.renderer.lock().stop_all();
        Ok(())
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.shared.renderer.lock().stop_all();
        thread::sleep(CLOSE_GRACE_PERIOD);
        self.shared.stop.store(true, Ordering::Release);

        let handle = self.thread.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!(device = %self.shared.device, "lg4ff update thread panicked");
            }
        }
        info!(device = %self.shared.device, "Closed lg4ff haptic device");
    }
}

impl Drop for Lg4ffDevice {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Lg4ffDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lg4ffDevice")
            .field("device", &self.shared.device)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

fn update_thread_main(shared: &Shared) {
    debug!(device = %shared.device, "lg4ff update thread started");
    while !shared.stop.load(Ordering::Acquire) {
        run_tick(shared);
        thread::sleep(TICK_PERIOD);
    }
    debug!(device = %shared.device, "lg4ff update thread stopped");
}

fn run_tick(shared: &Shared) {
    let mut renderer = shared.renderer.lock();
    let now = shared.clock.now_ms();
    let commands = renderer.tick(now);

    let mut ok = true;
    for command in &commands {
        match shared.joystick.send_effect(&command.report) {
            Ok(_) => trace!(device = %shared.device, report = ?command.report, "Sent slot command"),
            Err(e) => {
                ok = false;
                renderer.requeue(command.slot);
                trace!(device = %shared.device, error = %e, "Slot command failed");
            }
        }
    }

    match renderer.record_tick(ok) {
        LinkEvent::FirstFailure => {
            warn!(device = %shared.device, "Failed sending slot commands, retrying");
        }
        LinkEvent::Lost => {
            error!(
                device = %shared.device,
                consecutive_failures = renderer.failure_streak(),
                "lg4ff device lost"
            );
        }
        LinkEvent::Recovered => {
            info!(device = %shared.device, "lg4ff device writes recovered");
        }
        LinkEvent::Healthy | LinkEvent::StillFailing => {}
    }
}
