//! Realistic Seasave-style CNV header block.
//!
//! The header mirrors the structure of Sea-Bird Seasave output: instrument
//! metadata, the 17-variable schema with spans, the sampling interval and the
//! bad-value sentinel, terminated by `*END*`. Downstream ingest only needs
//! the `#` schema lines; the `*`/`**` lines are present for realism.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tx_core::GeoPoint;
use tx_core::schema::{BAD_FLAG, CHANNELS};

use crate::row::fmt_sci;

/// Cruise metadata printed into the header's `**` comment lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMeta {
    pub operator: String,
    pub ship: String,
    pub cruise: String,
    pub station: String,
}

impl Default for HeaderMeta {
    fn default() -> Self {
        Self {
            operator: "Ella".to_string(),
            ship: "Investigator".to_string(),
            cruise: "in2020_v09".to_string(),
            station: "7".to_string(),
        }
    }
}

/// Convert decimal degrees to an NMEA-like `DD MM.mm H` string.
///
/// Example: -35.57462 becomes `35 34.48 S`.
fn deg_min(value: f64, pos_hem: char, neg_hem: char) -> String {
    let hem = if value >= 0.0 { pos_hem } else { neg_hem };
    let abs = value.abs();
    let deg = abs.trunc() as i64;
    let minutes = (abs - deg as f64) * 60.0;
    format!("{deg} {minutes:05.2} {hem}")
}

/// Span line fields keep the per-column formatting of the reference output.
fn span_fields(index: usize, vmin: f64, vmax: f64) -> (String, String) {
    match index {
        7 | 16 => (fmt_sci(vmin, 4), fmt_sci(vmax, 4)),
        11 | 13 => (format!("{}", vmin as i64), format!("{}", vmax as i64)),
        2 => (format!("{vmin:.3}"), format!("{vmax:.3}")),
        1 | 4 => (format!("{vmin:.6}"), format!("{vmax:.6}")),
        _ => (format!("{vmin:.4}"), format!("{vmax:.4}")),
    }
}

/// Build the full header string, ending with `*END*` and a newline.
///
/// `file_name` is the raw-file path quoted in the `* FileName` line (the
/// `.hex` twin of the output, by convention).
pub fn format_header(
    meta: &HeaderMeta,
    file_name: &str,
    start: GeoPoint,
    interval_s: f64,
    start_time: DateTime<Utc>,
) -> String {
    let stamp = start_time.format("%b %d %Y %H:%M:%S");
    let nmea_stamp = start_time.format("%b %d %Y  %H:%M:%S");
    let nmea_lat = deg_min(start.lat, 'N', 'S');
    let nmea_lon = deg_min(start.lon, 'E', 'W');

    let mut lines: Vec<String> = Vec::with_capacity(80);
    lines.push("* Sea-Bird SBE 9 Data File:".to_string());
    lines.push(format!("* FileName = {file_name}"));
    lines.push("* Software Version Seasave V 7.26.7.110".to_string());
    lines.push("* Temperature SN = 5932".to_string());
    lines.push("* Conductivity SN = 3168".to_string());
    lines.push("* Number of Bytes Per Scan = 41".to_string());
    lines.push("* Number of Voltage Words = 4".to_string());
    lines.push("* Number of Scans Averaged by the Deck Unit = 1".to_string());
    lines.push("* Append System Time to Every Scan".to_string());
    lines.push(format!("* System UpLoad Time = {stamp}"));
    lines.push(format!("* NMEA Latitude = {nmea_lat}"));
    lines.push(format!("* NMEA Longitude = {nmea_lon}"));
    lines.push(format!("* NMEA UTC (Time) = {nmea_stamp}"));
    lines.push("* Store Lat/Lon Data = Append to Every Scan".to_string());
    lines.push(format!("** Operator: {}", meta.operator));
    lines.push("** CTD config:".to_string());
    lines.push(format!("** Ship: {}", meta.ship));
    lines.push(format!("** Cruise: {}", meta.cruise));
    lines.push(format!("** Station:  {}", meta.station));
    lines.push("** Latitude:".to_string());
    lines.push("** Longitude:".to_string());
    lines.push("** Depth:".to_string());
    lines.push(format!("* System UTC = {stamp}"));

    // Variable schema
    lines.push(format!("# nquan = {}", CHANNELS.len()));
    lines.push("# nvalues = 0".to_string());
    lines.push("# units = specified".to_string());
    for (i, channel) in CHANNELS.iter().enumerate() {
        lines.push(format!("# name {i} = {}", channel.name));
    }
    for (i, channel) in CHANNELS.iter().enumerate() {
        let (vmin, vmax) = span_fields(i, channel.span.0, channel.span.1);
        lines.push(format!("# span {i} = {vmin:>12}, {vmax:>12}"));
    }

    lines.push(format!("# interval = seconds: {interval_s}"));
    lines.push(format!(
        "# start_time = {stamp} [System UTC, first data scan.]"
    ));
    lines.push(format!("# bad_flag = {}", fmt_sci(BAD_FLAG, 3)));
    lines.push(format!("# datcnv_date = {stamp} , 7.26.7.129"));
    lines.push("# datcnv_skipover = 0".to_string());
    lines.push("# file_type = ascii".to_string());
    lines.push("*END*".to_string());

    lines.join("\n") + "\n"
}
