use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;

use crate::dashboard::DashboardQuery;
use crate::types::{
    CurrentForecast, DailyForecasts, DailyTemperatures, Forecast, HourlyForecasts,
    HourlyTemperatures,
};

/// Source of forecast data.
///
/// Implementations may fail with any error. A failure carrying
/// [`weatherboard_core::Cancelled`] in its chain is treated as cancellation by
/// the use cases rather than as an ordinary failure.
#[async_trait]
pub trait WeatherRepository: Send + Sync {
    async fn get_current_forecast(&self, place_name: &str) -> Result<CurrentForecast>;

    async fn get_hourly_forecasts(&self, place_name: &str) -> Result<HourlyForecasts>;

    async fn get_daily_forecasts(&self, place_name: &str) -> Result<DailyForecasts>;

    /// Forecasts from the daily table matching `query`
    async fn get_daily_query_forecasts(
        &self,
        query: &DashboardQuery,
    ) -> Result<Vec<Forecast<DailyTemperatures>>>;

    /// Forecasts from the hourly table matching `query`
    async fn get_hourly_query_forecasts(
        &self,
        query: &DashboardQuery,
    ) -> Result<Vec<Forecast<HourlyTemperatures>>>;
}

/// Observable user preferences for the dashboard
pub trait PreferenceRepository: Send + Sync {
    /// Place the dashboard shows; `None` until one is chosen
    fn place_name(&self) -> watch::Receiver<Option<String>>;

    fn set_place_name(&self, place_name: String);

    /// Cards on the dashboard, in display order
    fn dashboard_queries(&self) -> watch::Receiver<Vec<DashboardQuery>>;

    fn set_dashboard_queries(&self, queries: Vec<DashboardQuery>);
}
