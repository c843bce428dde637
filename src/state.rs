use std::fmt;

/// Token preceding the screen state in `dumpsys nfc` output.
pub const SCREEN_STATE_MARKER: &str = "mScreenState=";

/// Screen state reduced to the codes used for branching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateCode {
    /// `ON_UNLOCKED`
    OnUnlocked,
    /// `ON_LOCKED`
    OnLocked,
    /// `OFF_LOCKED`
    OffLocked,
    /// Absent or unrecognized state.
    Unknown,
}

impl StateCode {
    /// Integer code, `-1` for [`StateCode::Unknown`].
    pub fn code(self) -> i32 {
        match self {
            StateCode::OnUnlocked => 2,
            StateCode::OnLocked => 3,
            StateCode::OffLocked => 4,
            StateCode::Unknown => -1,
        }
    }

    /// Screen on or off, but behind the keyguard.
    pub fn is_locked(self) -> bool {
        matches!(self, StateCode::OnLocked | StateCode::OffLocked)
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Map a queried screen state to its code. Total over all inputs.
pub fn classify(state: Option<&str>) -> StateCode {
    match state {
        Some("ON_UNLOCKED") => StateCode::OnUnlocked,
        Some("ON_LOCKED") => StateCode::OnLocked,
        Some("OFF_LOCKED") => StateCode::OffLocked,
        _ => StateCode::Unknown,
    }
}

/// Extract the value after [`SCREEN_STATE_MARKER`] from the first line carrying it.
pub fn parse_screen_state(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (_, rest) = line.split_once(SCREEN_STATE_MARKER)?;
        Some(rest.trim().to_string())
    })
}
