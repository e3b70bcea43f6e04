// OpenSky Network state vector source
use crate::application::state_source::{FetchError, StateVectorSource};
use crate::domain::state_vector::{PositionSource, Snapshot, StateVector};
use crate::infrastructure::config::OpenSkySettings;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

// Positions in the state vector array, see
// https://openskynetwork.github.io/opensky-api/rest.html#all-state-vectors
const ICAO24: usize = 0;
const CALLSIGN: usize = 1;
const ORIGIN_COUNTRY: usize = 2;
const TIME_POSITION: usize = 3;
const LAST_CONTACT: usize = 4;
const LONGITUDE: usize = 5;
const LATITUDE: usize = 6;
const BARO_ALTITUDE: usize = 7;
const ON_GROUND: usize = 8;
const VELOCITY: usize = 9;
const TRUE_TRACK: usize = 10;
const VERTICAL_RATE: usize = 11;
const SENSORS: usize = 12;
const GEO_ALTITUDE: usize = 13;
const SQUAWK: usize = 14;
const SPI: usize = 15;
const POSITION_SOURCE: usize = 16;
const MIN_FIELDS: usize = 17;

#[derive(Debug, Deserialize)]
struct StatesResponse {
    time: i64,
    /// `null` when no aircraft matched
    #[serde(default)]
    states: Option<Vec<Vec<Value>>>,
}

#[derive(Debug, Clone)]
pub struct OpenSkySource {
    client: reqwest::Client,
    states_url: String,
    credentials: Option<(String, String)>,
}

impl OpenSkySource {
    pub fn new(settings: &OpenSkySettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("Failed to build OpenSky HTTP client")?;

        let credentials = match (&settings.username, &settings.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        Ok(Self {
            client,
            states_url: format!("{}/states/all", settings.base_url.trim_end_matches('/')),
            credentials,
        })
    }

    async fn get_states(&self) -> Result<StatesResponse, FetchError> {
        let mut request = self.client.get(&self.states_url);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await.map_err(map_request_error)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        response
            .json::<StatesResponse>()
            .await
            .map_err(map_request_error)
    }
}

fn map_request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_decode() {
        FetchError::Decode(e.to_string())
    } else {
        FetchError::Http(e.to_string())
    }
}

#[async_trait]
impl StateVectorSource for OpenSkySource {
    async fn fetch_states(&self) -> Result<Snapshot, FetchError> {
        let response = self.get_states().await?;

        let states = response
            .states
            .unwrap_or_default()
            .iter()
            .map(|row| state_from_row(row))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(time = response.time, states = states.len(), "Fetched OpenSky state vectors");
        Ok(Snapshot::new(response.time, states))
    }
}

fn field(row: &[Value], idx: usize) -> Option<&Value> {
    row.get(idx).filter(|v| !v.is_null())
}

fn string_field(row: &[Value], idx: usize) -> Option<String> {
    field(row, idx).and_then(Value::as_str).map(str::to_string)
}

fn float_field(row: &[Value], idx: usize) -> Option<f64> {
    field(row, idx).and_then(Value::as_f64)
}

fn time_field(row: &[Value], idx: usize) -> Option<i64> {
    field(row, idx).and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
}

fn bool_field(row: &[Value], idx: usize) -> bool {
    field(row, idx).and_then(Value::as_bool).unwrap_or(false)
}

fn state_from_row(row: &[Value]) -> Result<StateVector, FetchError> {
    if row.len() < MIN_FIELDS {
        return Err(FetchError::Decode(format!(
            "state vector has {} fields, expected at least {}",
            row.len(),
            MIN_FIELDS
        )));
    }

    let icao24 = string_field(row, ICAO24)
        .ok_or_else(|| FetchError::Decode("state vector without icao24".to_string()))?;
    let last_contact = time_field(row, LAST_CONTACT).ok_or_else(|| {
        FetchError::Decode(format!("state vector {} without last_contact", icao24))
    })?;

    let sensors = field(row, SENSORS)
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect());

    let position_source = field(row, POSITION_SOURCE)
        .and_then(Value::as_i64)
        .map(PositionSource::from_code)
        .unwrap_or(PositionSource::Unknown(-1));
    if let PositionSource::Unknown(code) = position_source {
        tracing::trace!(icao24 = %icao24, code, "Unknown position source");
    }

    Ok(StateVector {
        icao24,
        callsign: string_field(row, CALLSIGN),
        origin_country: string_field(row, ORIGIN_COUNTRY).unwrap_or_default(),
        time_position: time_field(row, TIME_POSITION),
        last_contact,
        longitude: float_field(row, LONGITUDE),
        latitude: float_field(row, LATITUDE),
        baro_altitude: float_field(row, BARO_ALTITUDE),
        on_ground: bool_field(row, ON_GROUND),
        velocity: float_field(row, VELOCITY),
        true_track: float_field(row, TRUE_TRACK),
        vertical_rate: float_field(row, VERTICAL_RATE),
        sensors,
        geo_altitude: float_field(row, GEO_ALTITUDE),
        squawk: string_field(row, SQUAWK),
        spi: bool_field(row, SPI),
        position_source,
    })
}
