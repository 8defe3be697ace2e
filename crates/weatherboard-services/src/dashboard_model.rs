//! Dashboard state: the latest forecasts and card results for the chosen place.
//!
//! The model owns three watch channels (current forecast, hourly forecasts,
//! query results) and is their only writer. A refresh fans out into two
//! concurrent branches, one for the place forecasts and one for the cards.
//! A branch that fails logs a warning and leaves its previous state in place.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use weatherboard_core::{Cancelled, Outcome};
use weatherboard_weather::{
    CurrentForecast, DashboardQuery, HourlyForecasts, PreferenceRepository, QueryResult,
    WeatherRepository,
};

use crate::forecasts::{GetCurrentForecast, GetHourlyForecasts};
use crate::observe::{ObserveDashboardMainPlaceName, ObserveDashboardQueries};
use crate::query::GetQueryForecasts;
use crate::use_case::{Dispatcher, UseCase};

/// What woke the run loop
enum Trigger {
    Place,
    Cards,
    Interval,
}

type PreferenceWatchers = (
    watch::Receiver<Option<String>>,
    watch::Receiver<Vec<DashboardQuery>>,
);

pub struct DashboardModel {
    dispatcher: Dispatcher,
    get_current_forecast: GetCurrentForecast,
    get_hourly_forecasts: GetHourlyForecasts,
    get_query_forecasts: GetQueryForecasts,
    observe_place_name: ObserveDashboardMainPlaceName,
    observe_queries: ObserveDashboardQueries,
    refresh_interval: Option<Duration>,
    current: watch::Sender<Option<CurrentForecast>>,
    hourly: watch::Sender<Option<HourlyForecasts>>,
    query_results: watch::Sender<Vec<QueryResult>>,
}

impl DashboardModel {
    pub fn new(
        weather: Arc<dyn WeatherRepository>,
        preferences: Arc<dyn PreferenceRepository>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            get_current_forecast: GetCurrentForecast::new(weather.clone(), dispatcher.clone()),
            get_hourly_forecasts: GetHourlyForecasts::new(weather.clone(), dispatcher.clone()),
            get_query_forecasts: GetQueryForecasts::new(weather, dispatcher.clone()),
            observe_place_name: ObserveDashboardMainPlaceName::new(
                preferences.clone(),
                dispatcher.clone(),
            ),
            observe_queries: ObserveDashboardQueries::new(preferences, dispatcher.clone()),
            dispatcher,
            refresh_interval: None,
            current: watch::channel(None).0,
            hourly: watch::channel(None).0,
            query_results: watch::channel(Vec::new()).0,
        }
    }

    /// Also refresh periodically while [`DashboardModel::run`] is active
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval).filter(|i| !i.is_zero());
        self
    }

    pub fn current_forecast(&self) -> watch::Receiver<Option<CurrentForecast>> {
        self.current.subscribe()
    }

    pub fn hourly_forecasts(&self) -> watch::Receiver<Option<HourlyForecasts>> {
        self.hourly.subscribe()
    }

    pub fn query_results(&self) -> watch::Receiver<Vec<QueryResult>> {
        self.query_results.subscribe()
    }

    /// Refresh everything once using the current preferences.
    pub async fn refresh(&self) -> Result<(), Cancelled> {
        let Some((place_rx, queries_rx)) = self.observe().await? else {
            return Ok(());
        };
        let place_name = place_rx.borrow().clone();
        let queries = queries_rx.borrow().clone();
        self.refresh_with(place_name, queries).await
    }

    /// Refresh now, then again whenever the place or card list changes (and
    /// on the refresh interval, if set), until the scope is cancelled.
    ///
    /// A place change refreshes only the place forecasts and a card change
    /// only the cards. The interval refreshes both.
    ///
    /// Returns `Ok(())` only if the preference source goes away.
    pub async fn run(&self) -> Result<(), Cancelled> {
        let Some((mut place_rx, mut queries_rx)) = self.observe().await? else {
            return Ok(());
        };
        let scope = self.dispatcher.scope().clone();

        let place_name = place_rx.borrow_and_update().clone();
        let queries = queries_rx.borrow_and_update().clone();
        self.refresh_with(place_name, queries).await?;

        loop {
            let trigger = tokio::select! {
                biased;
                _ = scope.cancelled() => return Err(Cancelled),
                changed = place_rx.changed() => {
                    if changed.is_err() {
                        return Ok(());
                    }
                    Trigger::Place
                }
                changed = queries_rx.changed() => {
                    if changed.is_err() {
                        return Ok(());
                    }
                    Trigger::Cards
                }
                _ = tokio::time::sleep(self.refresh_interval.unwrap_or_default()),
                    if self.refresh_interval.is_some() => Trigger::Interval,
            };

            match trigger {
                Trigger::Place => {
                    tracing::info!("Dashboard place changed, refreshing forecasts");
                    let place_name = place_rx.borrow_and_update().clone();
                    self.refresh_forecasts(place_name).await?;
                }
                Trigger::Cards => {
                    tracing::info!("Dashboard cards changed, refreshing queries");
                    let queries = queries_rx.borrow_and_update().clone();
                    self.refresh_queries(queries).await?;
                }
                Trigger::Interval => {
                    tracing::debug!("Refresh interval elapsed");
                    let place_name = place_rx.borrow_and_update().clone();
                    let queries = queries_rx.borrow_and_update().clone();
                    self.refresh_with(place_name, queries).await?;
                }
            }
        }
    }

    async fn observe(&self) -> Result<Option<PreferenceWatchers>, Cancelled> {
        let place = self.observe_place_name.invoke(()).await?;
        let queries = self.observe_queries.invoke(()).await?;
        match (place, queries) {
            (Outcome::Success(place), Outcome::Success(queries)) => Ok(Some((place, queries))),
            (Outcome::Failure(e), _) | (_, Outcome::Failure(e)) => {
                tracing::warn!("Failed to observe dashboard preferences: {}", e);
                Ok(None)
            }
        }
    }

    async fn refresh_with(
        &self,
        place_name: Option<String>,
        queries: Vec<DashboardQuery>,
    ) -> Result<(), Cancelled> {
        let (forecasts, cards) = tokio::join!(
            self.refresh_forecasts(place_name),
            self.refresh_queries(queries)
        );
        forecasts?;
        cards
    }

    async fn refresh_forecasts(&self, place_name: Option<String>) -> Result<(), Cancelled> {
        let Some(place_name) = place_name else {
            tracing::debug!("No place selected, skipping forecast refresh");
            return Ok(());
        };

        if let Outcome::Success(current) = self
            .get_current_forecast
            .invoke(place_name.clone())
            .await?
            .on_failure(|e| tracing::warn!("Current forecast refresh failed: {}", e))
        {
            self.current.send_replace(Some(current));
        }

        if let Outcome::Success(hourly) = self
            .get_hourly_forecasts
            .invoke(place_name)
            .await?
            .on_failure(|e| tracing::warn!("Hourly forecast refresh failed: {}", e))
        {
            self.hourly.send_replace(Some(hourly));
        }

        Ok(())
    }

    async fn refresh_queries(&self, queries: Vec<DashboardQuery>) -> Result<(), Cancelled> {
        if let Outcome::Success(results) = self
            .get_query_forecasts
            .invoke(queries)
            .await?
            .on_failure(|e| tracing::warn!("Dashboard query refresh failed: {}", e))
        {
            self.query_results.send_replace(results);
        }
        Ok(())
    }
}
