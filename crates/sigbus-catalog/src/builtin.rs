//! The built-in cockpit signal table.

use sigbus_signal::SignalIdentity;
use sigbus_wire::SEMI_TO_DEGREES;

use crate::definition::SignalDefinition;

/// Version number of the built-in table.
pub const BUILTIN_VERSION: u32 = 1;

/// Timeout shared by every built-in signal.
pub const BUILTIN_TIMEOUT_MS: u32 = 1000;

const CENTI: f64 = 0.01;

// name, category, subcategory, resolution, units, description
const TABLE: [(&str, u8, u8, f64, &str, &str); 17] = [
    ("gps_latitude", 10, 10, SEMI_TO_DEGREES, "deg", "GPS latitude"),
    ("gps_longitude", 10, 11, SEMI_TO_DEGREES, "deg", "GPS longitude"),
    ("altitude_msl", 10, 20, CENTI, "ft", "Altitude above mean sea level"),
    ("altitude_agl", 10, 21, CENTI, "ft", "Altitude above ground level"),
    ("altitude_rate", 10, 22, CENTI, "ft/min", "Rate of altitude change"),
    ("vertical_speed", 10, 23, CENTI, "ft/min", "Vertical speed"),
    ("heading_true", 10, 30, SEMI_TO_DEGREES, "deg", "True heading"),
    ("heading_mag", 10, 31, SEMI_TO_DEGREES, "deg", "Magnetic heading"),
    ("ground_track", 10, 32, SEMI_TO_DEGREES, "deg", "Ground track"),
    ("magnetic_variation", 10, 33, SEMI_TO_DEGREES, "deg", "Magnetic variation"),
    ("att_pitch", 10, 40, SEMI_TO_DEGREES, "deg", "Attitude pitch"),
    ("att_roll", 10, 41, SEMI_TO_DEGREES, "deg", "Attitude roll"),
    ("speed_ias", 10, 50, CENTI, "kt", "Indicated airspeed"),
    ("speed_gs", 10, 51, CENTI, "kt", "Ground speed"),
    ("engine_rpm", 20, 10, CENTI, "rpm", "Engine speed"),
    ("oil_pressure", 20, 20, CENTI, "psi", "Engine oil pressure"),
    ("oil_temperature", 20, 21, CENTI, "degC", "Engine oil temperature"),
];

/// Definitions of the built-in table, in table order.
pub fn definitions() -> Vec<SignalDefinition> {
    TABLE
        .iter()
        .map(|&(name, category, subcategory, resolution, units, description)| {
            SignalDefinition::scaled(
                name,
                SignalIdentity::new(category, subcategory),
                BUILTIN_TIMEOUT_MS,
                resolution,
                units,
            )
            .with_description(description)
        })
        .collect()
}
