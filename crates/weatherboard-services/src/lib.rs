//! Weatherboard use cases and the dashboard model built on them.

pub mod dashboard_model;
pub mod forecasts;
pub mod observe;
pub mod query;
pub mod use_case;

pub use dashboard_model::DashboardModel;
pub use forecasts::{GetCurrentForecast, GetDailyForecasts, GetHourlyForecasts};
pub use observe::{ObserveDashboardMainPlaceName, ObserveDashboardQueries};
pub use query::GetQueryForecasts;
pub use use_case::{Dispatcher, UseCase};
