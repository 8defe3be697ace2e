//! Weather domain for Weatherboard
//!
//! Forecast records, dashboard queries and the repository seams the use
//! cases read through, plus canned repositories for demos and tests.

pub mod dashboard;
pub mod repository;
pub mod stub;
pub mod types;

pub use dashboard::{
    Comparison, ComparisonOperator, ConstraintClass, DashboardColumn, DashboardQuery,
    DashboardQueryFilter, DashboardQueryFilterBuilder, DashboardTable, FilterError,
    QueryForecasts, QueryResult,
};
pub use repository::{PreferenceRepository, WeatherRepository};
pub use stub::{StubPreferenceRepository, StubWeatherRepository};
pub use types::*;
