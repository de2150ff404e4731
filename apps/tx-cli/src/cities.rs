//! Minimal offline city/port lookup for convenience (no network dependency).

use tx_core::GeoPoint;

const CITY_COORDS: &[(&str, f64, f64)] = &[
    // Australia
    ("sydney", -33.8688, 151.2093),
    ("melbourne", -37.8136, 144.9631),
    ("brisbane", -27.4698, 153.0251),
    ("perth", -31.9523, 115.8613),
    ("fremantle", -32.0569, 115.7439),
    ("adelaide", -34.9285, 138.6007),
    ("hobart", -42.8821, 147.3272),
    ("darwin", -12.4634, 130.8456),
    // NZ
    ("auckland", -36.8485, 174.7633),
    ("wellington", -41.2865, 174.7762),
    ("christchurch", -43.5321, 172.6362),
    // World sample ports
    ("singapore", 1.3521, 103.8198),
    ("hong kong", 22.3193, 114.1694),
    ("tokyo", 35.6762, 139.6503),
    ("shanghai", 31.2304, 121.4737),
    ("los angeles", 34.0522, -118.2437),
    ("san francisco", 37.7749, -122.4194),
    ("new york", 40.7128, -74.0060),
    ("miami", 25.7617, -80.1918),
    ("london", 51.5072, -0.1276),
    ("hamburg", 53.5511, 9.9937),
    ("rotterdam", 51.9244, 4.4777),
];

pub fn lookup(name: &str) -> Option<GeoPoint> {
    let key = name.trim().to_lowercase();
    CITY_COORDS
        .iter()
        .find(|(city, _, _)| *city == key)
        .map(|&(_, lat, lon)| GeoPoint::new(lat, lon))
}
