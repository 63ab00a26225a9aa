//! Data models for stored data.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use verdure_types::{MetricValue, Reading};

/// A sensor row stored in the database.
///
/// Columns are nullable: a NULL metric maps to
/// [`MetricValue::Unavailable`] when converted to a [`Reading`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredReading {
    /// Database row ID.
    pub id: i64,
    /// When this reading was captured (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Ambient temperature in Celsius.
    pub amb_temp: Option<f64>,
    /// Water temperature in Celsius.
    pub water_temp: Option<f64>,
    /// Nutrient solution pH.
    pub ph_value: Option<f64>,
    /// Electrical conductivity in mS/cm.
    pub ec_value: Option<f64>,
    /// Illuminance at the canopy in lux.
    pub lux_top: Option<f64>,
    /// Illuminance below the canopy in lux.
    pub lux_bot: Option<f64>,
}

impl StoredReading {
    /// Build a row from a [`Reading`]; unavailable metrics become NULL.
    pub fn from_reading(reading: &Reading, timestamp: OffsetDateTime) -> Self {
        Self {
            id: 0, // Will be set by database
            timestamp,
            amb_temp: reading.ambient_temp.value(),
            water_temp: reading.water_temp.value(),
            ph_value: reading.ph.value(),
            ec_value: reading.ec.value(),
            lux_top: reading.lux_top.value(),
            lux_bot: reading.lux_bottom.value(),
        }
    }

    /// Map the row field-by-field into a [`Reading`].
    pub fn to_reading(&self) -> Reading {
        Reading {
            ambient_temp: MetricValue::from(self.amb_temp),
            water_temp: MetricValue::from(self.water_temp),
            ph: MetricValue::from(self.ph_value),
            ec: MetricValue::from(self.ec_value),
            lux_top: MetricValue::from(self.lux_top),
            lux_bottom: MetricValue::from(self.lux_bot),
        }
    }
}
