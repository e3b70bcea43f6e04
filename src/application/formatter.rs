// Placefile formatter - Pure rendering of state vectors to placefile text
use crate::domain::placefile::{AircraftStatus, PlacefileHeader, RenderedBlock};
use crate::domain::state_vector::StateVector;
use chrono::{DateTime, FixedOffset, SecondsFormat};

/// Shown for any field the source did not report
pub const UNKNOWN: &str = "N/A";
pub const NO_CALLSIGN: &str = "No Callsign";

const SEPARATOR: &str = "===================================";
/// Literal `\n` escape, expanded by the radar client inside the tooltip
const TOOLTIP_NEWLINE: &str = "\\n";

/// ISO-8601 with seconds precision in the given offset, e.g. `2024-05-01T12:00:00-04:00`
pub fn format_datetime(datetime: DateTime<FixedOffset>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Secs, false)
}

pub fn format_timestamp(epoch_secs: i64, utc_offset: FixedOffset) -> Option<String> {
    DateTime::from_timestamp(epoch_secs, 0).map(|dt| format_datetime(dt.with_timezone(&utc_offset)))
}

fn format_optional_timestamp(epoch_secs: Option<i64>, utc_offset: FixedOffset) -> String {
    epoch_secs
        .and_then(|secs| format_timestamp(secs, utc_offset))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn format_number(value: f64) -> String {
    format!("{:?}", value)
}

fn format_optional_number(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| UNKNOWN.to_string())
}

fn display_callsign(callsign: Option<&str>) -> &str {
    match callsign.map(str::trim) {
        Some(cs) if !cs.is_empty() => cs,
        _ => NO_CALLSIGN,
    }
}

/// Render one state vector, or `None` if it has no usable position.
///
/// `reference_time` is the epoch second staleness is measured against and
/// `utc_offset` is the local offset applied to every timestamp.
pub fn render(
    state: &StateVector,
    reference_time: i64,
    utc_offset: FixedOffset,
) -> Option<RenderedBlock> {
    let (latitude, longitude) = state.position()?;
    let status = AircraftStatus::classify(state, reference_time);

    let sensors = state
        .sensors
        .as_ref()
        .map(|ids| {
            ids.iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_else(|| UNKNOWN.to_string());

    let tooltip = [
        format!("Callsign: {}", display_callsign(state.callsign.as_deref())),
        format!("ICAO24: {}", state.icao24),
        format!("Squawk: {}", state.squawk.as_deref().unwrap_or(UNKNOWN)),
        format!("SPI: {}", state.spi),
        format!("Sensors: {}", sensors),
        SEPARATOR.to_string(),
        format!("Origin country: {}", state.origin_country),
        format!(
            "Last position report: {}",
            format_optional_timestamp(state.time_position, utc_offset)
        ),
        format!(
            "Last contact: {}",
            format_optional_timestamp(Some(state.last_contact), utc_offset)
        ),
        format!(
            "Position source: {}",
            state.position_source.label().unwrap_or(UNKNOWN)
        ),
        SEPARATOR.to_string(),
        format!("On ground: {}", state.on_ground),
        format!("Longitude: {}", format_number(longitude)),
        format!("Latitude: {}", format_number(latitude)),
        format!("Altitude: {}", format_optional_number(state.geo_altitude)),
        format!("Velocity: {}", format_optional_number(state.velocity)),
        format!("Vertical Rate: {}", format_optional_number(state.vertical_rate)),
        format!("Heading: {}", format_optional_number(state.true_track)),
        format!(
            "Barometric Altitude: {}",
            format_optional_number(state.baro_altitude)
        ),
    ]
    .join(TOOLTIP_NEWLINE);

    // icon rotation needs a number even when the heading is unknown
    let rotation = state.true_track.map(format_number).unwrap_or_else(|| "0".to_string());

    Some(RenderedBlock {
        status,
        position_line: format!(
            "Object: {}, {}",
            format_number(latitude),
            format_number(longitude)
        ),
        icon_line: format!("Icon: 0,0,{},1,{},{}", rotation, status.code(), tooltip),
    })
}

pub fn render_header(header: &PlacefileHeader) -> String {
    format!(
        "Refresh: {}\nThreshold: {}\nTitle: {} - {}\nFont: 1, 11, 0, \"Tahoma\"\nIconFile: 1, 22, 22, 11, 11, \"{}\"\n\n",
        PlacefileHeader::REFRESH_MINUTES,
        PlacefileHeader::THRESHOLD,
        PlacefileHeader::TITLE,
        header.generated_at,
        header.icon_path.display(),
    )
}

/// Full placefile text: header, then every block in the given order
pub fn render_placefile(header: &PlacefileHeader, blocks: &[RenderedBlock]) -> String {
    let mut out = render_header(header);
    for block in blocks {
        out.push_str(&block.position_line);
        out.push('\n');
        out.push_str(&block.icon_line);
        out.push_str("\nEnd:\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state_vector::PositionSource;
    use std::path::PathBuf;

    const NOW: i64 = 1_714_564_800; // 2024-05-01T12:00:00Z

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn sample() -> StateVector {
        StateVector {
            icao24: "a0b1c2".to_string(),
            callsign: Some("UAL123  ".to_string()),
            origin_country: "United States".to_string(),
            time_position: Some(NOW - 5),
            last_contact: NOW - 2,
            longitude: Some(-75.0),
            latitude: Some(40.0),
            baro_altitude: Some(10058.4),
            on_ground: false,
            velocity: Some(231.5),
            true_track: Some(87.3),
            vertical_rate: Some(-1.3),
            sensors: None,
            geo_altitude: Some(10363.2),
            squawk: Some("1200".to_string()),
            spi: false,
            position_source: PositionSource::AdsB,
        }
    }

    fn tooltip_fields(block: &RenderedBlock) -> Vec<String> {
        let tooltip = block.icon_line.splitn(6, ',').nth(5).unwrap();
        tooltip.split(TOOLTIP_NEWLINE).map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_full_record() {
        let block = render(&sample(), NOW, utc()).unwrap();

        assert_eq!(block.position_line, "Object: 40.0, -75.0");
        assert!(block.icon_line.starts_with("Icon: 0,0,87.3,1,1,Callsign: UAL123\\nICAO24: a0b1c2\\n"));
        assert!(!block.icon_line.contains('\n'));

        let fields = tooltip_fields(&block);
        assert_eq!(
            fields,
            vec![
                "Callsign: UAL123",
                "ICAO24: a0b1c2",
                "Squawk: 1200",
                "SPI: false",
                "Sensors: N/A",
                SEPARATOR,
                "Origin country: United States",
                "Last position report: 2024-05-01T11:59:55+00:00",
                "Last contact: 2024-05-01T11:59:58+00:00",
                "Position source: ADS-B",
                SEPARATOR,
                "On ground: false",
                "Longitude: -75.0",
                "Latitude: 40.0",
                "Altitude: 10363.2",
                "Velocity: 231.5",
                "Vertical Rate: -1.3",
                "Heading: 87.3",
                "Barometric Altitude: 10058.4",
            ]
        );
    }

    #[test]
    fn test_missing_coordinates_are_skipped() {
        let mut no_lat = sample();
        no_lat.latitude = None;
        assert!(render(&no_lat, NOW, utc()).is_none());

        let mut no_lon = sample();
        no_lon.longitude = None;
        assert!(render(&no_lon, NOW, utc()).is_none());
    }

    #[test]
    fn test_status_code_in_icon_line() {
        let mut stale = sample();
        stale.last_contact = NOW - 600;
        let block = render(&stale, NOW, utc()).unwrap();
        assert!(block.icon_line.starts_with("Icon: 0,0,87.3,1,2,"));

        let mut grounded = stale.clone();
        grounded.on_ground = true;
        let block = render(&grounded, NOW, utc()).unwrap();
        assert_eq!(block.status, AircraftStatus::Grounded);
        assert!(block.icon_line.starts_with("Icon: 0,0,87.3,1,3,"));
    }

    #[test]
    fn test_callsign_fallback() {
        for callsign in [None, Some(""), Some("    ")] {
            let mut state = sample();
            state.callsign = callsign.map(|s| s.to_string());
            let block = render(&state, NOW, utc()).unwrap();
            assert_eq!(tooltip_fields(&block)[0], "Callsign: No Callsign");
        }
    }

    #[test]
    fn test_callsign_is_trimmed() {
        let mut state = sample();
        state.callsign = Some("  DAL42 \t".to_string());
        let block = render(&state, NOW, utc()).unwrap();
        assert_eq!(tooltip_fields(&block)[0], "Callsign: DAL42");
    }

    #[test]
    fn test_absent_fields_render_marker() {
        let mut state = sample();
        state.time_position = None;
        state.true_track = None;
        state.squawk = None;
        state.velocity = None;
        state.position_source = PositionSource::Unknown(9);
        state.sensors = Some(vec![-1408232560, 42]);

        let block = render(&state, NOW, utc()).unwrap();
        assert!(block.icon_line.starts_with("Icon: 0,0,0,1,1,"));

        let fields = tooltip_fields(&block);
        assert!(fields.contains(&"Last position report: N/A".to_string()));
        assert!(fields.contains(&"Heading: N/A".to_string()));
        assert!(fields.contains(&"Squawk: N/A".to_string()));
        assert!(fields.contains(&"Velocity: N/A".to_string()));
        assert!(fields.contains(&"Position source: N/A".to_string()));
        assert!(fields.contains(&"Sensors: -1408232560, 42".to_string()));
    }

    #[test]
    fn test_timestamps_round_trip_to_the_second() {
        let offset = FixedOffset::west_opt(4 * 3600).unwrap();
        for epoch in [0, NOW, NOW + 59, 2_000_000_123] {
            let text = format_timestamp(epoch, offset).unwrap();
            assert!(text.ends_with("-04:00"));
            assert!(!text.contains('.'));

            let parsed = DateTime::parse_from_rfc3339(&text).unwrap();
            assert_eq!(parsed.timestamp(), epoch);
        }
    }

    #[test]
    fn test_local_offset_is_applied() {
        let offset = FixedOffset::west_opt(4 * 3600).unwrap();
        assert_eq!(
            format_timestamp(NOW, offset).unwrap(),
            "2024-05-01T08:00:00-04:00"
        );
    }

    #[test]
    fn test_render_placefile_layout() {
        let header = PlacefileHeader::new(
            "2024-05-01T12:00:00+00:00".to_string(),
            PathBuf::from("/srv/jrad/data/planes.png"),
        );
        let block = render(&sample(), NOW, utc()).unwrap();
        let text = render_placefile(&header, &[block.clone(), block.clone()]);

        let expected_header = "Refresh: 1\n\
            Threshold: 999\n\
            Title: JRAD - Flight Positions - 2024-05-01T12:00:00+00:00\n\
            Font: 1, 11, 0, \"Tahoma\"\n\
            IconFile: 1, 22, 22, 11, 11, \"/srv/jrad/data/planes.png\"\n\n";
        assert!(text.starts_with(expected_header));

        let body = &text[expected_header.len()..];
        let one = format!("{}\n{}\nEnd:\n\n", block.position_line, block.icon_line);
        assert_eq!(body, format!("{}{}", one, one));
    }

    #[test]
    fn test_header_only_placefile() {
        let header = PlacefileHeader::new("t".to_string(), PathBuf::from("/i.png"));
        assert_eq!(render_placefile(&header, &[]), render_header(&header));
    }
}
