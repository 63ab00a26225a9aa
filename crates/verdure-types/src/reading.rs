//! Sensor reading types.

use core::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Text shown for a metric with no recorded value.
pub const UNAVAILABLE_TEXT: &str = "No data available";

/// A single metric value: either a measurement or an explicit marker that
/// no data is available.
///
/// The marker is a first-class state, not the absence of a key — every
/// [`Reading`] always carries all six metrics, and only the value varies.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum MetricValue {
    /// A recorded measurement.
    Value(f64),
    /// No measurement recorded.
    Unavailable,
}

impl MetricValue {
    /// The numeric value, if one is available.
    pub fn value(&self) -> Option<f64> {
        match self {
            MetricValue::Value(v) => Some(*v),
            MetricValue::Unavailable => None,
        }
    }

    /// Whether this is the unavailable marker.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, MetricValue::Unavailable)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Value(value)
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => MetricValue::Value(v),
            None => MetricValue::Unavailable,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Value(v) => write!(f, "{v:.2}"),
            MetricValue::Unavailable => f.write_str(UNAVAILABLE_TEXT),
        }
    }
}

/// The six metrics measured on a cultivation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Metric {
    /// Air temperature around the unit, in Celsius.
    AmbientTemperature,
    /// Nutrient solution temperature, in Celsius.
    WaterTemperature,
    /// Nutrient solution pH.
    Ph,
    /// Electrical conductivity of the nutrient solution, in mS/cm.
    Ec,
    /// Illuminance at the canopy, in lux.
    LuxTop,
    /// Illuminance below the canopy, in lux.
    LuxBottom,
}

impl Metric {
    /// All six metrics, in display order.
    pub const ALL: [Metric; 6] = [
        Metric::AmbientTemperature,
        Metric::WaterTemperature,
        Metric::Ph,
        Metric::Ec,
        Metric::LuxTop,
        Metric::LuxBottom,
    ];

    /// Canonical label used by the presentation layer.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::AmbientTemperature => "Ambient Temperature",
            Metric::WaterTemperature => "Water Temperature",
            Metric::Ph => "pH Level",
            Metric::Ec => "EC Level",
            Metric::LuxTop => "Lux Top",
            Metric::LuxBottom => "Lux Bottom",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.label() == s)
            .ok_or_else(|| ParseError::UnknownMetric(s.to_string()))
    }
}

/// One full set of sensor values for a cultivation unit.
///
/// All six metrics are always present; a metric the sensors (or the store)
/// could not supply is [`MetricValue::Unavailable`]. Readings are
/// constructed fresh on every poll or query and replace the snapshot cache
/// wholesale — they are never mutated after publication.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Air temperature, in Celsius.
    pub ambient_temp: MetricValue,
    /// Nutrient solution temperature, in Celsius.
    pub water_temp: MetricValue,
    /// Nutrient solution pH.
    pub ph: MetricValue,
    /// Electrical conductivity, in mS/cm.
    pub ec: MetricValue,
    /// Illuminance at the canopy, in lux.
    pub lux_top: MetricValue,
    /// Illuminance below the canopy, in lux.
    pub lux_bottom: MetricValue,
}

impl Reading {
    /// The reading with every metric marked unavailable.
    ///
    /// This is both the initial snapshot-cache state and what the store
    /// returns when it holds no rows.
    pub fn unavailable() -> Self {
        Self {
            ambient_temp: MetricValue::Unavailable,
            water_temp: MetricValue::Unavailable,
            ph: MetricValue::Unavailable,
            ec: MetricValue::Unavailable,
            lux_top: MetricValue::Unavailable,
            lux_bottom: MetricValue::Unavailable,
        }
    }

    /// Keyed access for consumers that render by metric name.
    pub fn get(&self, metric: Metric) -> MetricValue {
        match metric {
            Metric::AmbientTemperature => self.ambient_temp,
            Metric::WaterTemperature => self.water_temp,
            Metric::Ph => self.ph,
            Metric::Ec => self.ec,
            Metric::LuxTop => self.lux_top,
            Metric::LuxBottom => self.lux_bottom,
        }
    }

    /// Iterate the metrics with their values, in display order.
    pub fn metrics(&self) -> impl Iterator<Item = (Metric, MetricValue)> + '_ {
        Metric::ALL.into_iter().map(|m| (m, self.get(m)))
    }

    /// Whether every metric is the unavailable marker.
    pub fn is_unavailable(&self) -> bool {
        self.metrics().all(|(_, v)| v.is_unavailable())
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self::unavailable()
    }
}
