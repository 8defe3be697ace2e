//! Place-scoped forecast use cases.

use std::sync::Arc;

use async_trait::async_trait;
use weatherboard_core::AppError;
use weatherboard_weather::{CurrentForecast, DailyForecasts, HourlyForecasts, WeatherRepository};

use crate::use_case::{Dispatcher, UseCase};

/// Reject place names a repository cannot look up.
fn validate_place_name(place_name: &str) -> Result<&str, AppError> {
    let trimmed = place_name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("place name is empty"));
    }
    Ok(trimmed)
}

/// Current conditions for a place
#[derive(Clone)]
pub struct GetCurrentForecast {
    repository: Arc<dyn WeatherRepository>,
    dispatcher: Dispatcher,
}

impl GetCurrentForecast {
    pub fn new(repository: Arc<dyn WeatherRepository>, dispatcher: Dispatcher) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }
}

#[async_trait]
impl UseCase for GetCurrentForecast {
    type Params = String;
    type Output = CurrentForecast;

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn execute(&self, place_name: String) -> anyhow::Result<CurrentForecast> {
        let place_name = validate_place_name(&place_name)?;
        tracing::debug!("Fetching current forecast for {}", place_name);
        self.repository.get_current_forecast(place_name).await
    }
}

/// Hour-by-hour forecast for a place
#[derive(Clone)]
pub struct GetHourlyForecasts {
    repository: Arc<dyn WeatherRepository>,
    dispatcher: Dispatcher,
}

impl GetHourlyForecasts {
    pub fn new(repository: Arc<dyn WeatherRepository>, dispatcher: Dispatcher) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }
}

#[async_trait]
impl UseCase for GetHourlyForecasts {
    type Params = String;
    type Output = HourlyForecasts;

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn execute(&self, place_name: String) -> anyhow::Result<HourlyForecasts> {
        let place_name = validate_place_name(&place_name)?;
        tracing::debug!("Fetching hourly forecasts for {}", place_name);
        self.repository.get_hourly_forecasts(place_name).await
    }
}

/// Day-by-day forecast for a place
#[derive(Clone)]
pub struct GetDailyForecasts {
    repository: Arc<dyn WeatherRepository>,
    dispatcher: Dispatcher,
}

impl GetDailyForecasts {
    pub fn new(repository: Arc<dyn WeatherRepository>, dispatcher: Dispatcher) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }
}

#[async_trait]
impl UseCase for GetDailyForecasts {
    type Params = String;
    type Output = DailyForecasts;

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn execute(&self, place_name: String) -> anyhow::Result<DailyForecasts> {
        let place_name = validate_place_name(&place_name)?;
        tracing::debug!("Fetching daily forecasts for {}", place_name);
        self.repository.get_daily_forecasts(place_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_place_name() {
        assert_eq!(validate_place_name(" Tokyo ").unwrap(), "Tokyo");
        assert!(validate_place_name("").is_err());
        assert!(validate_place_name("   ").is_err());
    }
}
