use crate::bridge::{DeviceBridge, KeyCode};
use crate::delay::Delay;
use crate::state::{StateCode, classify};
use crate::{Error, UnlockOptions};
use std::fmt;
use std::time::Duration;
use tracing::{error, info, warn};

/// Result of a single [`Controller::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The initial state query produced nothing; no unlock was attempted.
    QueryFailed,
    /// The device was not in a locked state; no unlock was attempted.
    AlreadyUnlocked { code: StateCode },
    /// The unlock was attempted and the device now reports unlocked.
    Unlocked { before: StateCode, after: StateCode },
    /// The unlock was attempted but the device still is not unlocked.
    StillLocked { before: StateCode, after: StateCode },
    /// The unlock was attempted but the re-check query produced nothing.
    RecheckFailed { before: StateCode },
}

impl Outcome {
    /// True only when the device reported unlocked after the attempt.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Unlocked { .. })
    }

    /// Whether key events were sent during the run.
    pub fn attempted_unlock(&self) -> bool {
        matches!(
            self,
            Outcome::Unlocked { .. } | Outcome::StillLocked { .. } | Outcome::RecheckFailed { .. }
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::QueryFailed => write!(f, "failed to query screen state"),
            Outcome::AlreadyUnlocked { code } => {
                write!(f, "device already unlocked or state unknown (code {code})")
            }
            Outcome::Unlocked { before, after } => {
                write!(f, "unlock succeeded (code {before} -> {after})")
            }
            Outcome::StillLocked { before, after } => {
                write!(f, "unlock failed (code {before} -> {after})")
            }
            Outcome::RecheckFailed { before } => {
                write!(f, "failed to re-check screen state after unlock (code {before})")
            }
        }
    }
}

/// Drives the check, unlock, re-check sequence for one device.
pub struct Controller<B, D> {
    bridge: B,
    delay: D,
    key_interval: Duration,
    settle_delay: Duration,
}

impl<B: DeviceBridge, D: Delay> Controller<B, D> {
    /// Build a controller taking its pauses from `options`.
    pub fn new(bridge: B, delay: D, options: &UnlockOptions) -> Self {
        Self {
            bridge,
            delay,
            key_interval: options.key_interval,
            settle_delay: options.settle_delay,
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Query the screen state, logging and swallowing every failure.
    pub fn query_screen_state(&self, serial: &str) -> Option<String> {
        match self.bridge.screen_state(serial) {
            Ok(Some(state)) => Some(state),
            Ok(None) => {
                warn!("{serial}: no screen state found in device diagnostics");
                None
            }
            Err(Error::NotFound(program)) => {
                error!("{serial}: device bridge `{program}` not found, is it installed and on PATH?");
                None
            }
            Err(Error::Timeout(timeout)) => {
                error!("{serial}: screen state query timed out after {timeout:?}");
                None
            }
            Err(e) => {
                error!("{serial}: screen state query failed: {e}");
                None
            }
        }
    }

    /// Send wake then menu, pausing after each. The first failure is logged and
    /// ends the sequence.
    pub fn unlock(&mut self, serial: &str) {
        for key in [KeyCode::Wake, KeyCode::Menu] {
            if let Err(e) = self.bridge.send_key_event(serial, key) {
                error!("{serial}: failed to send key event {}: {e}", key.code());
                return;
            }
            self.delay.sleep(self.key_interval);
        }
        info!("{serial}: unlock attempt initiated");
    }

    /// Check the device, unlock it if locked, and re-check.
    pub fn run(&mut self, serial: &str) -> Outcome {
        info!("{serial}: processing device");
        let Some(state) = self.query_screen_state(serial) else {
            return Outcome::QueryFailed;
        };
        let before = classify(Some(state.as_str()));
        info!("{serial}: current screen state {state} (code {before})");

        if !before.is_locked() {
            info!("{serial}: already unlocked or state unknown, nothing to do");
            return Outcome::AlreadyUnlocked { code: before };
        }

        info!("{serial}: device is locked, attempting unlock");
        self.unlock(serial);
        self.delay.sleep(self.settle_delay);

        let Some(state) = self.query_screen_state(serial) else {
            error!("{serial}: could not re-check screen state after unlock");
            return Outcome::RecheckFailed { before };
        };
        let after = classify(Some(state.as_str()));
        info!("{serial}: new screen state {state} (code {after})");

        if after == StateCode::OnUnlocked {
            info!("{serial}: unlocked");
            Outcome::Unlocked { before, after }
        } else {
            warn!("{serial}: unlock did not take effect");
            Outcome::StillLocked { before, after }
        }
    }
}
