//! Canned repositories for demos and tests.
//!
//! The data is a fixed two-day snapshot of Tokyo weather in March 2021: one
//! current record, 48 hourly records and 8 daily records. Every place name
//! returns the same forecasts.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, Utc};
use tokio::sync::watch;

use crate::dashboard::{
    DashboardColumn, DashboardQuery, DashboardQueryFilter, DashboardTable,
};
use crate::repository::{PreferenceRepository, WeatherRepository};
use crate::types::{
    CurrentForecast, DailyForecasts, DailyTemperatures, Forecast, HourlyForecasts,
    HourlyTemperatures, TemperatureUnit, WeatherType, Wind,
};

pub const DEFAULT_PLACE_NAME: &str = "Tokyo";

/// (epoch, condition id, description, icon, wind speed, wind deg, humidity, temperature, feels like)
type HourlyRow = (i64, u16, &'static str, &'static str, f64, u16, f64, f64, f64);

/// (epoch, condition id, description, icon, wind speed, wind deg, humidity,
///  precipitation, morning, day, evening, night, min, max)
type DailyRow = (
    i64,
    u16,
    &'static str,
    &'static str,
    f64,
    u16,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
);

const CURRENT: HourlyRow = (1616488109, 801, "few clouds", "02d", 2.57, 180, 33.0, 14.07, 10.02);

const HOURLY: [HourlyRow; 48] = [
    (1616486400, 801, "few clouds", "02d", 4.83, 185, 33.0, 14.07, 8.43),
    (1616490000, 801, "few clouds", "02n", 5.4, 188, 36.0, 13.56, 7.62),
    (1616493600, 800, "clear sky", "01n", 5.76, 184, 42.0, 12.95, 6.98),
    (1616497200, 800, "clear sky", "01n", 5.42, 180, 48.0, 12.61, 7.12),
    (1616500800, 800, "clear sky", "01n", 4.95, 175, 51.0, 12.39, 7.34),
    (1616504400, 800, "clear sky", "01n", 4.33, 176, 54.0, 12.27, 7.78),
    (1616508000, 800, "clear sky", "01n", 3.49, 188, 54.0, 12.21, 8.3),
    (1616511600, 800, "clear sky", "01n", 2.88, 189, 53.0, 12.06, 8.5),
    (1616515200, 800, "clear sky", "01n", 2.5, 192, 54.0, 11.81, 8.52),
    (1616518800, 800, "clear sky", "01n", 1.9, 195, 55.0, 11.45, 8.57),
    (1616522400, 800, "clear sky", "01n", 1.54, 205, 55.0, 11.21, 8.54),
    (1616526000, 800, "clear sky", "01n", 1.05, 228, 56.0, 10.98, 8.66),
    (1616529600, 800, "clear sky", "01n", 1.07, 274, 55.0, 10.73, 8.32),
    (1616533200, 800, "clear sky", "01d", 1.64, 305, 55.0, 10.44, 7.58),
    (1616536800, 800, "clear sky", "01d", 1.96, 317, 52.0, 10.76, 7.6),
    (1616540400, 800, "clear sky", "01d", 1.76, 309, 49.0, 11.5, 8.46),
    (1616544000, 800, "clear sky", "01d", 1.04, 228, 47.0, 12.39, 9.89),
    (1616547600, 800, "clear sky", "01d", 2.8, 190, 45.0, 13.51, 9.84),
    (1616551200, 800, "clear sky", "01d", 4.03, 190, 40.0, 14.75, 10.14),
    (1616554800, 800, "clear sky", "01d", 4.32, 188, 35.0, 15.76, 10.8),
    (1616558400, 800, "clear sky", "01d", 4.79, 181, 34.0, 16.56, 11.32),
    (1616562000, 800, "clear sky", "01d", 5.79, 182, 36.0, 17.15, 11.42),
    (1616565600, 800, "clear sky", "01d", 6.42, 175, 42.0, 17.13, 11.34),
    (1616569200, 804, "overcast clouds", "04d", 6.78, 178, 45.0, 16.83, 10.92),
    (1616572800, 804, "overcast clouds", "04d", 7.53, 183, 46.0, 16.48, 10.05),
    (1616576400, 804, "overcast clouds", "04n", 6.92, 183, 49.0, 16.1, 10.21),
    (1616580000, 804, "overcast clouds", "04n", 6.6, 189, 50.0, 15.76, 10.09),
    (1616583600, 804, "overcast clouds", "04n", 6.88, 197, 53.0, 15.2, 9.4),
    (1616587200, 804, "overcast clouds", "04n", 6.89, 198, 56.0, 14.81, 9.09),
    (1616590800, 804, "overcast clouds", "04n", 6.77, 197, 58.0, 14.47, 8.88),
    (1616594400, 804, "overcast clouds", "04n", 6.76, 197, 60.0, 14.18, 8.64),
    (1616598000, 804, "overcast clouds", "04n", 6.68, 200, 61.0, 13.95, 8.48),
    (1616601600, 804, "overcast clouds", "04n", 6.49, 201, 62.0, 13.78, 8.45),
    (1616605200, 804, "overcast clouds", "04n", 6.04, 206, 63.0, 13.64, 8.65),
    (1616608800, 804, "overcast clouds", "04n", 5.88, 204, 63.0, 13.64, 8.76),
    (1616612400, 804, "overcast clouds", "04n", 5.31, 209, 63.0, 13.43, 8.91),
    (1616616000, 804, "overcast clouds", "04n", 5.26, 210, 63.0, 13.19, 8.65),
    (1616619600, 804, "overcast clouds", "04d", 4.18, 221, 63.0, 13.07, 9.27),
    (1616623200, 804, "overcast clouds", "04d", 3.85, 216, 60.0, 13.29, 9.61),
    (1616626800, 804, "overcast clouds", "04d", 3.59, 234, 56.0, 13.84, 10.24),
    (1616630400, 804, "overcast clouds", "04d", 2.88, 223, 54.0, 14.11, 10.96),
    (1616634000, 804, "overcast clouds", "04d", 3.54, 208, 51.0, 14.88, 11.24),
    (1616637600, 804, "overcast clouds", "04d", 3.39, 214, 47.0, 15.49, 11.84),
    (1616641200, 804, "overcast clouds", "04d", 4.13, 202, 46.0, 15.52, 11.3),
    (1616644800, 804, "overcast clouds", "04d", 3.55, 208, 44.0, 15.9, 12.03),
    (1616648400, 804, "overcast clouds", "04d", 3.18, 193, 44.0, 15.89, 12.28),
    (1616652000, 804, "overcast clouds", "04d", 2.99, 187, 46.0, 15.87, 12.51),
    (1616655600, 804, "overcast clouds", "04d", 3.58, 177, 47.0, 16.0, 12.31),
];

const DAILY: [DailyRow; 8] = [
    (1616464800, 500, "light rain", "10d", 0.55, 50, 32.0, 0.71, 7.99, 11.04, 14.07, 12.21, 7.88, 14.07),
    (1616551200, 800, "clear sky", "01d", 4.03, 190, 40.0, 0.0, 10.73, 14.75, 16.48, 14.18, 10.44, 17.15),
    (1616637600, 804, "overcast clouds", "04d", 3.39, 214, 47.0, 0.01, 13.19, 15.49, 15.86, 14.86, 13.07, 16.0),
    (1616724000, 800, "clear sky", "01d", 2.76, 0, 28.0, 0.18, 12.59, 17.58, 17.48, 14.49, 12.4, 18.36),
    (1616810400, 804, "overcast clouds", "04d", 5.66, 185, 53.0, 0.0, 11.81, 15.61, 16.11, 15.61, 11.81, 16.7),
    (1616896800, 500, "light rain", "10d", 11.14, 191, 54.0, 0.25, 14.67, 18.37, 16.79, 16.41, 14.67, 18.37),
    (1616983200, 501, "moderate rain", "10d", 12.58, 176, 88.0, 1.0, 15.9, 16.24, 17.0, 16.53, 15.21, 17.3),
    (1617069600, 804, "overcast clouds", "04d", 4.24, 43, 46.0, 0.06, 13.96, 17.85, 16.99, 15.1, 13.96, 19.14),
];

/// Record returned for any hourly-table query
const HOURLY_QUERY: HourlyRow = HOURLY[1];

fn local_time(epoch_secs: i64) -> DateTime<FixedOffset> {
    DateTime::<Utc>::from_timestamp(epoch_secs, 0)
        .unwrap_or_default()
        .with_timezone(&Local)
        .fixed_offset()
}

fn hourly_forecast(row: &HourlyRow) -> Forecast<HourlyTemperatures> {
    let (epoch, id, description, icon, speed, deg, humidity, temperature, feels_like) = *row;
    Forecast {
        time: local_time(epoch),
        temperatures: HourlyTemperatures {
            unit: TemperatureUnit::Celsius,
            temperature,
            feels_like,
        },
        precipitation: None,
        humidity,
        wind: Wind { speed, deg },
        weathers: vec![WeatherType::new(id, description, icon)],
    }
}

fn daily_forecast(row: &DailyRow) -> Forecast<DailyTemperatures> {
    let (
        epoch,
        id,
        description,
        icon,
        speed,
        deg,
        humidity,
        precipitation,
        morning,
        day,
        evening,
        night,
        min,
        max,
    ) = *row;
    Forecast {
        time: local_time(epoch),
        temperatures: DailyTemperatures {
            unit: TemperatureUnit::Celsius,
            morning,
            day,
            evening,
            night,
            min,
            max,
        },
        precipitation: Some(precipitation),
        humidity,
        wind: Wind { speed, deg },
        weathers: vec![WeatherType::new(id, description, icon)],
    }
}

/// "Precipitation of today" card
pub fn precipitation_of_today() -> DashboardQuery {
    DashboardQuery::new(
        "Precipitation of today",
        DashboardColumn::Precipitation,
        DashboardTable::Daily,
    )
}

/// "Tomorrow weather" card
pub fn tomorrow_weather() -> DashboardQuery {
    DashboardQuery::new("Tomorrow weather", DashboardColumn::Weather, DashboardTable::Daily)
        .with_skip_today(true)
}

/// "Next laundry weather day" card: the next clear-sky day after today
pub fn next_laundry_weather_day() -> DashboardQuery {
    let mut builder = DashboardQueryFilter::builder();
    let filter = match builder.eq(DashboardColumn::Weather, 800) {
        Ok(builder) => builder.build(),
        Err(_) => DashboardQueryFilter::default(),
    };
    DashboardQuery::new(
        "Next laundry weather day",
        DashboardColumn::Date,
        DashboardTable::Daily,
    )
    .with_filter(filter)
    .with_skip_today(true)
}

/// The cards a fresh dashboard starts with
pub fn default_dashboard_queries() -> Vec<DashboardQuery> {
    vec![
        precipitation_of_today(),
        tomorrow_weather(),
        next_laundry_weather_day(),
    ]
}

/// Weather repository serving the canned snapshot
#[derive(Debug, Clone, Default)]
pub struct StubWeatherRepository;

impl StubWeatherRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WeatherRepository for StubWeatherRepository {
    async fn get_current_forecast(&self, place_name: &str) -> Result<CurrentForecast> {
        tracing::debug!("Serving stub current forecast for {}", place_name);
        Ok(CurrentForecast {
            place_name: place_name.to_string(),
            forecast: hourly_forecast(&CURRENT),
        })
    }

    async fn get_hourly_forecasts(&self, place_name: &str) -> Result<HourlyForecasts> {
        tracing::debug!("Serving stub hourly forecasts for {}", place_name);
        Ok(HourlyForecasts {
            place_name: place_name.to_string(),
            forecasts: HOURLY.iter().map(hourly_forecast).collect(),
        })
    }

    async fn get_daily_forecasts(&self, place_name: &str) -> Result<DailyForecasts> {
        tracing::debug!("Serving stub daily forecasts for {}", place_name);
        Ok(DailyForecasts {
            place_name: place_name.to_string(),
            forecasts: DAILY.iter().map(daily_forecast).collect(),
        })
    }

    async fn get_daily_query_forecasts(
        &self,
        query: &DashboardQuery,
    ) -> Result<Vec<Forecast<DailyTemperatures>>> {
        let row = if *query == tomorrow_weather() || *query == next_laundry_weather_day() {
            &DAILY[1]
        } else {
            &DAILY[0]
        };
        Ok(vec![daily_forecast(row)])
    }

    async fn get_hourly_query_forecasts(
        &self,
        _query: &DashboardQuery,
    ) -> Result<Vec<Forecast<HourlyTemperatures>>> {
        Ok(vec![hourly_forecast(&HOURLY_QUERY)])
    }
}

/// In-memory preferences backed by watch channels
#[derive(Debug)]
pub struct StubPreferenceRepository {
    place_name: watch::Sender<Option<String>>,
    queries: watch::Sender<Vec<DashboardQuery>>,
}

impl StubPreferenceRepository {
    pub fn new(place_name: Option<String>) -> Self {
        let (place_name, _) = watch::channel(place_name);
        let (queries, _) = watch::channel(default_dashboard_queries());
        Self {
            place_name,
            queries,
        }
    }
}

impl Default for StubPreferenceRepository {
    fn default() -> Self {
        Self::new(Some(DEFAULT_PLACE_NAME.to_string()))
    }
}

impl PreferenceRepository for StubPreferenceRepository {
    fn place_name(&self) -> watch::Receiver<Option<String>> {
        self.place_name.subscribe()
    }

    fn set_place_name(&self, place_name: String) {
        tracing::debug!("Place name set to {}", place_name);
        self.place_name.send_replace(Some(place_name));
    }

    fn dashboard_queries(&self) -> watch::Receiver<Vec<DashboardQuery>> {
        self.queries.subscribe()
    }

    fn set_dashboard_queries(&self, queries: Vec<DashboardQuery>) {
        tracing::debug!("Dashboard now has {} queries", queries.len());
        self.queries.send_replace(queries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_sizes() {
        let repo = StubWeatherRepository::new();
        let hourly = repo.get_hourly_forecasts("Tokyo").await.unwrap();
        let daily = repo.get_daily_forecasts("Tokyo").await.unwrap();

        assert_eq!(hourly.forecasts.len(), 48);
        assert_eq!(daily.forecasts.len(), 8);
        assert_eq!(daily.place_name, "Tokyo");
    }

    #[tokio::test]
    async fn test_every_record_has_a_weather() {
        let repo = StubWeatherRepository::new();
        let hourly = repo.get_hourly_forecasts("Tokyo").await.unwrap();
        let daily = repo.get_daily_forecasts("Tokyo").await.unwrap();
        let current = repo.get_current_forecast("Tokyo").await.unwrap();

        assert!(hourly.forecasts.iter().all(|f| !f.weathers.is_empty()));
        assert!(daily.forecasts.iter().all(|f| !f.weathers.is_empty()));
        assert!(!current.forecast.weathers.is_empty());
    }

    #[tokio::test]
    async fn test_current_forecast() {
        let current = StubWeatherRepository::new()
            .get_current_forecast("Osaka")
            .await
            .unwrap();

        assert_eq!(current.place_name, "Osaka");
        assert_eq!(current.forecast.precipitation, None);
        assert_eq!(current.forecast.temperatures.temperature, 14.07);
        assert_eq!(current.forecast.time.timestamp(), 1616488109);
    }

    #[tokio::test]
    async fn test_daily_min_not_above_max() {
        let daily = StubWeatherRepository::new()
            .get_daily_forecasts("Tokyo")
            .await
            .unwrap();

        for forecast in &daily.forecasts {
            assert!(forecast.temperatures.min <= forecast.temperatures.max);
            assert!(forecast.precipitation.is_some());
        }
    }

    #[tokio::test]
    async fn test_query_lookup() {
        let repo = StubWeatherRepository::new();

        let today = repo
            .get_daily_query_forecasts(&precipitation_of_today())
            .await
            .unwrap();
        assert_eq!(today[0].time.timestamp(), 1616464800);

        let tomorrow = repo
            .get_daily_query_forecasts(&tomorrow_weather())
            .await
            .unwrap();
        assert_eq!(tomorrow[0].time.timestamp(), 1616551200);
        assert_eq!(tomorrow[0].weathers[0].description, "clear sky");

        let hourly = repo
            .get_hourly_query_forecasts(&DashboardQuery::new(
                "Next hour",
                DashboardColumn::Temperature,
                DashboardTable::Hourly,
            ))
            .await
            .unwrap();
        assert_eq!(hourly.len(), 1);
        assert_eq!(hourly[0].weathers[0].icon, "02n");
    }

    #[test]
    fn test_laundry_query_filter() {
        let query = next_laundry_weather_day();
        assert!(query.skip_today);
        assert_eq!(query.filter.len(), 1);
        assert_eq!(query.filter.comparisons()[0].value(), 800.0);
    }

    #[tokio::test]
    async fn test_preferences_notify_watchers() {
        let prefs = StubPreferenceRepository::default();
        let mut place = prefs.place_name();
        assert_eq!(place.borrow().as_deref(), Some("Tokyo"));

        prefs.set_place_name("Sapporo".to_string());
        place.changed().await.unwrap();
        assert_eq!(place.borrow_and_update().as_deref(), Some("Sapporo"));

        assert_eq!(prefs.dashboard_queries().borrow().len(), 3);
        prefs.set_dashboard_queries(vec![tomorrow_weather()]);
        assert_eq!(prefs.dashboard_queries().borrow().len(), 1);
    }
}
