use std::sync::Arc;

use async_trait::async_trait;
use weatherboard_weather::{
    DashboardQuery, DashboardTable, QueryForecasts, QueryResult, WeatherRepository,
};

use crate::use_case::{Dispatcher, UseCase};

/// Resolve dashboard queries against the table each one names.
///
/// Queries run one after another, one repository call each, and results come
/// back in input order. The first failing query fails the whole call.
#[derive(Clone)]
pub struct GetQueryForecasts {
    repository: Arc<dyn WeatherRepository>,
    dispatcher: Dispatcher,
}

impl GetQueryForecasts {
    pub fn new(repository: Arc<dyn WeatherRepository>, dispatcher: Dispatcher) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }
}

#[async_trait]
impl UseCase for GetQueryForecasts {
    type Params = Vec<DashboardQuery>;
    type Output = Vec<QueryResult>;

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn execute(&self, queries: Vec<DashboardQuery>) -> anyhow::Result<Vec<QueryResult>> {
        let mut results = Vec::with_capacity(queries.len());

        for query in queries {
            tracing::debug!("Running query '{}' on {:?} table", query.name, query.from);
            let forecasts = match query.from {
                DashboardTable::Daily => {
                    QueryForecasts::Daily(self.repository.get_daily_query_forecasts(&query).await?)
                }
                DashboardTable::Hourly => {
                    QueryForecasts::Hourly(self.repository.get_hourly_query_forecasts(&query).await?)
                }
            };
            results.push(QueryResult { query, forecasts });
        }

        tracing::debug!("Resolved {} dashboard queries", results.len());
        Ok(results)
    }
}
