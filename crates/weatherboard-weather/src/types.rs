use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::dashboard::DashboardTable;

/// Temperature unit reported by a forecast source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// Format a value with this unit, e.g. "14.1°C"
    pub fn format(&self, value: f64) -> String {
        format!("{:.1}{}", value, self.symbol())
    }

    /// Convert `value` from this unit to `target`
    pub fn convert(&self, value: f64, target: TemperatureUnit) -> f64 {
        match (self, target) {
            (Self::Celsius, Self::Fahrenheit) => value * 9.0 / 5.0 + 32.0,
            (Self::Fahrenheit, Self::Celsius) => (value - 32.0) * 5.0 / 9.0,
            _ => value,
        }
    }
}

/// Weather condition categories mapped from OpenWeatherMap condition ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Atmosphere,
    #[default]
    Clear,
    Clouds,
}

impl WeatherKind {
    /// Convert an OpenWeatherMap condition id to a WeatherKind
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_condition_id(id: u16) -> Self {
        match id {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            700..=799 => Self::Atmosphere,
            800 => Self::Clear,
            801..=899 => Self::Clouds,
            _ => Self::Clear, // Unknown ids default to clear
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "Thunderstorm",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Atmosphere => "Atmosphere",
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
        }
    }
}

/// One weather condition tag attached to a forecast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherType {
    pub kind: WeatherKind,
    /// OpenWeatherMap condition id (e.g. 800 for clear sky)
    pub id: u16,
    pub description: String,
    /// OpenWeatherMap icon code (e.g. "01d")
    pub icon: String,
}

impl WeatherType {
    pub fn new(id: u16, description: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            kind: WeatherKind::from_condition_id(id),
            id,
            description: description.into(),
            icon: icon.into(),
        }
    }

    /// Icon asset for this condition, if one exists
    pub fn icon_name(&self) -> Option<&'static str> {
        match self.icon.as_str() {
            "01d" => Some("weather_clear_day"),
            "01n" => Some("weather_clear_night"),
            "02d" => Some("weather_few_cloud_day"),
            "02n" => Some("weather_few_cloud_night"),
            "04d" | "04n" => Some("weather_overcast_clouds"),
            "10d" => Some("weather_moderate_rain"),
            _ => None,
        }
    }

    pub fn is_daytime(&self) -> bool {
        self.icon.ends_with('d')
    }
}

/// Wind at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    /// Direction in degrees, meteorological convention
    pub deg: u16,
}

/// Temperatures of one hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyTemperatures {
    pub unit: TemperatureUnit,
    pub temperature: f64,
    pub feels_like: f64,
}

/// Temperatures of one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTemperatures {
    pub unit: TemperatureUnit,
    pub morning: f64,
    pub day: f64,
    pub evening: f64,
    pub night: f64,
    pub min: f64,
    pub max: f64,
}

/// Either temperature shape, for code that handles both tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", rename_all = "lowercase")]
pub enum Temperatures {
    Hourly(HourlyTemperatures),
    Daily(DailyTemperatures),
}

impl Temperatures {
    pub fn unit(&self) -> TemperatureUnit {
        match self {
            Self::Hourly(t) => t.unit,
            Self::Daily(t) => t.unit,
        }
    }

    pub fn table(&self) -> DashboardTable {
        match self {
            Self::Hourly(_) => DashboardTable::Hourly,
            Self::Daily(_) => DashboardTable::Daily,
        }
    }

    /// The same temperatures expressed in `target`
    pub fn converted(self, target: TemperatureUnit) -> Self {
        match self {
            Self::Hourly(t) => {
                let c = |v| t.unit.convert(v, target);
                Self::Hourly(HourlyTemperatures {
                    unit: target,
                    temperature: c(t.temperature),
                    feels_like: c(t.feels_like),
                })
            }
            Self::Daily(t) => {
                let c = |v| t.unit.convert(v, target);
                Self::Daily(DailyTemperatures {
                    unit: target,
                    morning: c(t.morning),
                    day: c(t.day),
                    evening: c(t.evening),
                    night: c(t.night),
                    min: c(t.min),
                    max: c(t.max),
                })
            }
        }
    }
}

impl fmt::Display for Temperatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hourly(t) => write!(
                f,
                "{} (feels like {})",
                t.unit.format(t.temperature),
                t.unit.format(t.feels_like)
            ),
            Self::Daily(t) => write!(f, "{} / {}", t.unit.format(t.max), t.unit.format(t.min)),
        }
    }
}

/// A temperature shape that belongs to exactly one dashboard table.
pub trait TemperatureShape: Clone + Send + Sync + 'static {
    const TABLE: DashboardTable;

    fn into_temperatures(self) -> Temperatures;
}

impl TemperatureShape for HourlyTemperatures {
    const TABLE: DashboardTable = DashboardTable::Hourly;

    fn into_temperatures(self) -> Temperatures {
        Temperatures::Hourly(self)
    }
}

impl TemperatureShape for DailyTemperatures {
    const TABLE: DashboardTable = DashboardTable::Daily;

    fn into_temperatures(self) -> Temperatures {
        Temperatures::Daily(self)
    }
}

/// One timestamped forecast record.
///
/// `weathers` is never empty for records produced by a repository; the first
/// entry is the primary condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast<T> {
    pub time: DateTime<FixedOffset>,
    pub temperatures: T,
    /// Absent for current-weather records
    pub precipitation: Option<f64>,
    pub humidity: f64,
    pub wind: Wind,
    pub weathers: Vec<WeatherType>,
}

impl<T: TemperatureShape> Forecast<T> {
    pub fn table(&self) -> DashboardTable {
        T::TABLE
    }

    pub fn primary_weather(&self) -> Option<&WeatherType> {
        self.weathers.first()
    }

    pub fn erased_temperatures(&self) -> Temperatures {
        self.temperatures.clone().into_temperatures()
    }
}

/// Current conditions for a place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentForecast {
    pub place_name: String,
    pub forecast: Forecast<HourlyTemperatures>,
}

/// Hour-by-hour forecast for a place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecasts {
    pub place_name: String,
    pub forecasts: Vec<Forecast<HourlyTemperatures>>,
}

/// Day-by-day forecast for a place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecasts {
    pub place_name: String,
    pub forecasts: Vec<Forecast<DailyTemperatures>>,
}
