//! screen-unlock: wake and unlock a connected Android device over `adb`.
//!
//! Usage:
//! ```no_run
//! use screen_unlock::{Adb, Controller, ThreadSleep, UnlockOptions};
//!
//! let options = UnlockOptions::default();
//! let bridge = Adb::new(&options);
//! let mut controller = Controller::new(bridge, ThreadSleep, &options);
//! let outcome = controller.run("emulator-5554");
//! println!("{outcome}");
//! ```

use std::path::PathBuf;
use std::time::Duration;

mod bridge;
mod controller;
mod delay;
mod state;

pub use bridge::{Adb, DeviceBridge, KeyCode};
pub use controller::{Controller, Outcome};
pub use delay::{Delay, ThreadSleep};
pub use state::{SCREEN_STATE_MARKER, StateCode, classify, parse_screen_state};

/// Error type for device bridge invocations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The bridge executable could not be found on the search path.
    #[error("device bridge not found: {0}")]
    NotFound(String),
    /// The bridge did not exit within the allowed time and was killed.
    #[error("device bridge timed out after {0:?}")]
    Timeout(Duration),
    /// The bridge exited with a non-zero status.
    #[error("device bridge exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    /// Any other failure spawning or waiting on the bridge.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Knobs for a single run. Every field has a working default.
#[derive(Clone, Debug)]
pub struct UnlockOptions {
    /// Bridge executable, resolved through the search path if not absolute.
    pub program: PathBuf,
    /// Upper bound for a state query.
    pub query_timeout: Duration,
    /// Pause after each injected key event.
    pub key_interval: Duration,
    /// Pause between the unlock attempt and the re-check.
    pub settle_delay: Duration,
}

impl Default for UnlockOptions {
    fn default() -> Self {
        Self {
            program: PathBuf::from(bridge::DEFAULT_PROGRAM),
            query_timeout: Duration::from_secs(10),
            key_interval: Duration::from_millis(100),
            settle_delay: Duration::from_secs(3),
        }
    }
}
