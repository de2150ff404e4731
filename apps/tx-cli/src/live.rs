//! Periodic live row summaries printed to stdout.

use tx_core::schema::{CHANNELS, ScanRow, channel_index, col};

/// Which fields to print and how often.
#[derive(Debug, Clone)]
pub struct LiveOptions {
    pub every: u64,
    pub fields: Vec<usize>,
}

impl LiveOptions {
    /// Resolve a comma-separated field list against the channel schema.
    /// Unknown names are skipped with a warning.
    pub fn from_list(every: u64, names: &str) -> Self {
        let mut fields = Vec::new();
        for name in names.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match channel_index(name) {
                Some(index) => fields.push(index),
                None => eprintln!("[warn] Unknown live field: {name}"),
            }
        }
        Self {
            every: every.max(1),
            fields,
        }
    }
}

/// Prints a compact summary of selected fields every N rows.
pub struct LivePrinter {
    every: u64,
    fields: Vec<usize>,
    seen: u64,
}

impl LivePrinter {
    pub fn new(options: &LiveOptions) -> Self {
        Self {
            every: options.every,
            fields: options.fields.clone(),
            seen: 0,
        }
    }

    pub fn observe(&mut self, row: &ScanRow) {
        self.seen += 1;
        if self.seen % self.every != 0 {
            return;
        }
        let parts: Vec<String> = self.fields.iter().map(|&i| field_summary(i, row)).collect();
        println!("live: {}", parts.join(", "));
    }
}

fn field_summary(index: usize, row: &ScanRow) -> String {
    let key = CHANNELS[index].key();
    let value = row.0[index];
    match index {
        col::LATITUDE | col::LONGITUDE => format!("{key}={value:.5}"),
        col::TIME_S => format!("{key}={value:.3}"),
        col::SCAN | col::PUMPS => format!("{key}={}", value as i64),
        col::PRESSURE => format!("{key}={value:.2}"),
        col::T090C | col::T190C | col::SAL00 | col::SAL11 | col::CSTAR => {
            format!("{key}={value:.3}")
        }
        _ => format!("{key}={value}"),
    }
}
