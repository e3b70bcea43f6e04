// Aircraft state vector domain model

/// Where the last position report of an aircraft came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    AdsB,
    Asterix,
    Mlat,
    Flarm,
    Unknown(i64),
}

impl PositionSource {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => PositionSource::AdsB,
            1 => PositionSource::Asterix,
            2 => PositionSource::Mlat,
            3 => PositionSource::Flarm,
            other => PositionSource::Unknown(other),
        }
    }

    /// Display label, `None` for codes outside the known set
    pub fn label(&self) -> Option<&'static str> {
        match self {
            PositionSource::AdsB => Some("ADS-B"),
            PositionSource::Asterix => Some("ASTERISX"),
            PositionSource::Mlat => Some("MLAT"),
            PositionSource::Flarm => Some("FLARM"),
            PositionSource::Unknown(_) => None,
        }
    }
}

/// One aircraft's telemetry at fetch time. Times are unix epoch seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    pub icao24: String,
    pub callsign: Option<String>,
    pub origin_country: String,
    pub time_position: Option<i64>,
    pub last_contact: i64,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub baro_altitude: Option<f64>,
    pub on_ground: bool,
    pub velocity: Option<f64>,
    pub true_track: Option<f64>,
    pub vertical_rate: Option<f64>,
    pub sensors: Option<Vec<i64>>,
    pub geo_altitude: Option<f64>,
    pub squawk: Option<String>,
    pub spi: bool,
    pub position_source: PositionSource,
}

impl StateVector {
    /// Both coordinates, if the aircraft has a known position
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// All state vectors returned by a single fetch, in the order the source sent them
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Source timestamp of the snapshot (epoch seconds)
    pub time: i64,
    pub states: Vec<StateVector>,
}

impl Snapshot {
    pub fn new(time: i64, states: Vec<StateVector>) -> Self {
        Self { time, states }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_source_codes() {
        assert_eq!(PositionSource::from_code(0).label(), Some("ADS-B"));
        assert_eq!(PositionSource::from_code(1).label(), Some("ASTERISX"));
        assert_eq!(PositionSource::from_code(2).label(), Some("MLAT"));
        assert_eq!(PositionSource::from_code(3).label(), Some("FLARM"));

        assert_eq!(PositionSource::from_code(4), PositionSource::Unknown(4));
        assert_eq!(PositionSource::from_code(-1).label(), None);
    }
}
