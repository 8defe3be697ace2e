//! Use cases exposing observable dashboard preferences.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use weatherboard_weather::{DashboardQuery, PreferenceRepository};

use crate::use_case::{Dispatcher, UseCase};

/// Watch the place the dashboard shows
#[derive(Clone)]
pub struct ObserveDashboardMainPlaceName {
    preferences: Arc<dyn PreferenceRepository>,
    dispatcher: Dispatcher,
}

impl ObserveDashboardMainPlaceName {
    pub fn new(preferences: Arc<dyn PreferenceRepository>, dispatcher: Dispatcher) -> Self {
        Self {
            preferences,
            dispatcher,
        }
    }
}

#[async_trait]
impl UseCase for ObserveDashboardMainPlaceName {
    type Params = ();
    type Output = watch::Receiver<Option<String>>;

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn execute(&self, _params: ()) -> anyhow::Result<Self::Output> {
        Ok(self.preferences.place_name())
    }
}

/// Watch the dashboard's card list
#[derive(Clone)]
pub struct ObserveDashboardQueries {
    preferences: Arc<dyn PreferenceRepository>,
    dispatcher: Dispatcher,
}

impl ObserveDashboardQueries {
    pub fn new(preferences: Arc<dyn PreferenceRepository>, dispatcher: Dispatcher) -> Self {
        Self {
            preferences,
            dispatcher,
        }
    }
}

#[async_trait]
impl UseCase for ObserveDashboardQueries {
    type Params = ();
    type Output = watch::Receiver<Vec<DashboardQuery>>;

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn execute(&self, _params: ()) -> anyhow::Result<Self::Output> {
        Ok(self.preferences.dashboard_queries())
    }
}
