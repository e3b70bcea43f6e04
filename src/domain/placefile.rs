// Placefile domain model
use super::state_vector::StateVector;
use std::path::PathBuf;

/// Seconds without contact after which an airborne aircraft is drawn as stale
pub const STALE_AFTER_SECS: i64 = 180;

/// Display status of an aircraft. The discriminant is the placefile color index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AircraftStatus {
    /// Yellow
    Fresh = 1,
    /// Orange, no contact within `STALE_AFTER_SECS`
    Stale = 2,
    /// Red
    Grounded = 3,
}

impl AircraftStatus {
    /// Grounded wins over Stale, Stale wins over Fresh.
    pub fn classify(state: &StateVector, reference_time: i64) -> Self {
        if state.on_ground {
            AircraftStatus::Grounded
        } else if reference_time - state.last_contact > STALE_AFTER_SECS {
            AircraftStatus::Stale
        } else {
            AircraftStatus::Fresh
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Static header of the placefile
#[derive(Debug, Clone)]
pub struct PlacefileHeader {
    /// Title timestamp, already formatted
    pub generated_at: String,
    /// Absolute path of the icon sheet
    pub icon_path: PathBuf,
}

impl PlacefileHeader {
    pub const REFRESH_MINUTES: u32 = 1;
    pub const THRESHOLD: u32 = 999;
    pub const TITLE: &'static str = "JRAD - Flight Positions";

    pub fn new(generated_at: String, icon_path: PathBuf) -> Self {
        Self {
            generated_at,
            icon_path,
        }
    }
}

/// Rendered text of one aircraft
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    pub status: AircraftStatus,
    /// `Object:` line
    pub position_line: String,
    /// `Icon:` line with the tooltip
    pub icon_line: String,
}
