//! Fixed-format data-row rendering and parsing.
//!
//! Column positions are significant: the resume parser and any downstream
//! ingest rely on the declared order, so the format table below must stay in
//! lockstep with the channel schema.

use tx_core::schema::{CHANNEL_COUNT, ScanRow};

use crate::error::{CodecError, CodecResult};

/// Per-column rendering: fixed decimals, integer, or C-style scientific.
#[derive(Debug, Clone, Copy)]
enum ColFmt {
    Fixed(usize),
    Integer,
    Sci(usize),
}

const ROW_FORMATS: [ColFmt; CHANNEL_COUNT] = [
    ColFmt::Fixed(4), // t090C
    ColFmt::Fixed(6), // c0S/m
    ColFmt::Fixed(3), // prDM
    ColFmt::Fixed(4), // t190C
    ColFmt::Fixed(6), // c1S/m
    ColFmt::Fixed(3), // sbeox0Mm/L
    ColFmt::Fixed(3), // sbeox1Mm/L
    ColFmt::Sci(4),   // par
    ColFmt::Fixed(4), // CStarTr0
    ColFmt::Fixed(4), // sal00
    ColFmt::Fixed(4), // sal11
    ColFmt::Integer,  // scan
    ColFmt::Fixed(3), // timeS
    ColFmt::Integer,  // pumps
    ColFmt::Fixed(5), // latitude
    ColFmt::Fixed(5), // longitude
    ColFmt::Sci(3),   // flag
];

/// Render a value in C `%e` style: signed two-digit exponent, e.g. `1.6391e-05`.
pub(crate) fn fmt_sci(value: f64, decimals: usize) -> String {
    let rendered = format!("{value:.decimals$e}");
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            format!("{mantissa}e{exponent:+03}")
        }
        None => rendered,
    }
}

/// Format one data row: 17 fixed-width fields, space-joined, newline-terminated.
pub fn format_row(row: &ScanRow) -> String {
    let mut parts = Vec::with_capacity(CHANNEL_COUNT);
    for (value, fmt) in row.0.iter().zip(ROW_FORMATS.iter()) {
        parts.push(match fmt {
            ColFmt::Fixed(decimals) => format!("{:10.*}", *decimals, value),
            ColFmt::Integer => format!("{:10}", *value as i64),
            ColFmt::Sci(decimals) => format!("{:>10}", fmt_sci(*value, *decimals)),
        });
    }
    parts.join(" ") + "\n"
}

/// Parse one data line back into a row. Requires exactly 17 numeric fields.
pub fn parse_row(line: &str) -> CodecResult<ScanRow> {
    let mut values = [0.0; CHANNEL_COUNT];
    let mut count = 0;
    for field in line.split_whitespace() {
        if count == CHANNEL_COUNT {
            return Err(CodecError::MalformedLine {
                what: "too many fields",
            });
        }
        values[count] = field.parse::<f64>().map_err(|_| CodecError::MalformedLine {
            what: "non-numeric field",
        })?;
        count += 1;
    }
    if count != CHANNEL_COUNT {
        return Err(CodecError::MalformedLine {
            what: "wrong field count",
        });
    }
    Ok(ScanRow(values))
}
