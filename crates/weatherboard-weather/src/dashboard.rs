//! Dashboard queries: named, filtered views over the daily or hourly table.
//!
//! A [`DashboardQueryFilter`] is an ordered list of [`Comparison`]s built
//! through [`DashboardQueryFilterBuilder`], which rejects conflicting
//! constraints on the same column:
//!
//! - `eq` conflicts with any other comparison on the column
//! - `gt`/`gt_or_eq` conflict with another lower bound or an `eq`
//! - `lt`/`lt_or_eq` conflict with another upper bound or an `eq`
//!
//! One lower and one upper bound on the same column form a range and are allowed.
//! Values must be finite so that queries compare equal to themselves.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use weatherboard_core::{AppError, ErrorKind};

use crate::types::{DailyTemperatures, Forecast, HourlyTemperatures, Temperatures, WeatherType};

/// Forecast attribute a comparison or card targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardColumn {
    Weather,
    Temperature,
    MaxTemperature,
    MinTemperature,
    Humidity,
    Precipitation,
    Wind,
    Date,
    DateTime,
}

impl DashboardColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Temperature => "temperature",
            Self::MaxTemperature => "max_temperature",
            Self::MinTemperature => "min_temperature",
            Self::Humidity => "humidity",
            Self::Precipitation => "precipitation",
            Self::Wind => "wind",
            Self::Date => "date",
            Self::DateTime => "date_time",
        }
    }
}

impl fmt::Display for DashboardColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table a query reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTable {
    Daily,
    Hourly,
}

/// Operator of a [`Comparison`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl ComparisonOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
        }
    }

    pub fn class(&self) -> ConstraintClass {
        match self {
            Self::Equals => ConstraintClass::Equality,
            Self::GreaterThan | Self::GreaterThanOrEqual => ConstraintClass::LowerBound,
            Self::LessThan | Self::LessThanOrEqual => ConstraintClass::UpperBound,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Mutually exclusive constraint classes; a column holds at most one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintClass {
    Equality,
    LowerBound,
    UpperBound,
}

/// One column-scoped predicate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Comparison {
    Equals { column: DashboardColumn, value: f64 },
    GreaterThan { column: DashboardColumn, value: f64 },
    GreaterThanOrEqual { column: DashboardColumn, value: f64 },
    LessThan { column: DashboardColumn, value: f64 },
    LessThanOrEqual { column: DashboardColumn, value: f64 },
}

impl Comparison {
    pub fn new(operator: ComparisonOperator, column: DashboardColumn, value: f64) -> Self {
        match operator {
            ComparisonOperator::Equals => Self::Equals { column, value },
            ComparisonOperator::GreaterThan => Self::GreaterThan { column, value },
            ComparisonOperator::GreaterThanOrEqual => Self::GreaterThanOrEqual { column, value },
            ComparisonOperator::LessThan => Self::LessThan { column, value },
            ComparisonOperator::LessThanOrEqual => Self::LessThanOrEqual { column, value },
        }
    }

    pub fn column(&self) -> DashboardColumn {
        match *self {
            Self::Equals { column, .. }
            | Self::GreaterThan { column, .. }
            | Self::GreaterThanOrEqual { column, .. }
            | Self::LessThan { column, .. }
            | Self::LessThanOrEqual { column, .. } => column,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Self::Equals { value, .. }
            | Self::GreaterThan { value, .. }
            | Self::GreaterThanOrEqual { value, .. }
            | Self::LessThan { value, .. }
            | Self::LessThanOrEqual { value, .. } => value,
        }
    }

    pub fn operator(&self) -> ComparisonOperator {
        match self {
            Self::Equals { .. } => ComparisonOperator::Equals,
            Self::GreaterThan { .. } => ComparisonOperator::GreaterThan,
            Self::GreaterThanOrEqual { .. } => ComparisonOperator::GreaterThanOrEqual,
            Self::LessThan { .. } => ComparisonOperator::LessThan,
            Self::LessThanOrEqual { .. } => ComparisonOperator::LessThanOrEqual,
        }
    }

    pub fn class(&self) -> ConstraintClass {
        self.operator().class()
    }

    /// True if `self` and `other` cannot both appear in one filter.
    pub fn conflicts_with(&self, other: &Comparison) -> bool {
        if self.column() != other.column() {
            return false;
        }
        let (a, b) = (self.class(), other.class());
        a == ConstraintClass::Equality || b == ConstraintClass::Equality || a == b
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column(), self.operator(), self.value())
    }
}

/// Filter construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("conflicting constraint on {column}: `{attempted}` clashes with existing `{existing}`")]
    Conflict {
        column: DashboardColumn,
        existing: ComparisonOperator,
        attempted: ComparisonOperator,
    },
    #[error("value for {column} must be a finite number")]
    NonFiniteValue { column: DashboardColumn },
}

impl From<FilterError> for AppError {
    fn from(e: FilterError) -> Self {
        AppError::with_cause(ErrorKind::InvalidQuery, "invalid dashboard filter", e)
    }
}

/// Immutable, validated list of comparisons in insertion order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Comparison>", into = "Vec<Comparison>")]
pub struct DashboardQueryFilter {
    comparisons: Vec<Comparison>,
}

impl DashboardQueryFilter {
    pub fn builder() -> DashboardQueryFilterBuilder {
        DashboardQueryFilterBuilder::new()
    }

    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// Comparisons targeting `column`, in insertion order
    pub fn comparisons_for(&self, column: DashboardColumn) -> impl Iterator<Item = &Comparison> {
        self.comparisons.iter().filter(move |c| c.column() == column)
    }
}

impl TryFrom<Vec<Comparison>> for DashboardQueryFilter {
    type Error = FilterError;

    fn try_from(comparisons: Vec<Comparison>) -> Result<Self, Self::Error> {
        let mut builder = DashboardQueryFilterBuilder::new();
        for comparison in comparisons {
            builder.push(comparison)?;
        }
        Ok(builder.build())
    }
}

impl From<DashboardQueryFilter> for Vec<Comparison> {
    fn from(filter: DashboardQueryFilter) -> Self {
        filter.comparisons
    }
}

/// Accumulates comparisons, rejecting conflicts as they are added.
///
/// A rejected call leaves the builder unchanged, so it stays usable.
#[derive(Debug, Clone, Default)]
pub struct DashboardQueryFilterBuilder {
    comparisons: Vec<Comparison>,
}

impl DashboardQueryFilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(
        &mut self,
        column: DashboardColumn,
        value: impl Into<f64>,
    ) -> Result<&mut Self, FilterError> {
        self.push(Comparison::Equals {
            column,
            value: value.into(),
        })
    }

    pub fn gt(
        &mut self,
        column: DashboardColumn,
        value: impl Into<f64>,
    ) -> Result<&mut Self, FilterError> {
        self.push(Comparison::GreaterThan {
            column,
            value: value.into(),
        })
    }

    pub fn gt_or_eq(
        &mut self,
        column: DashboardColumn,
        value: impl Into<f64>,
    ) -> Result<&mut Self, FilterError> {
        self.push(Comparison::GreaterThanOrEqual {
            column,
            value: value.into(),
        })
    }

    pub fn lt(
        &mut self,
        column: DashboardColumn,
        value: impl Into<f64>,
    ) -> Result<&mut Self, FilterError> {
        self.push(Comparison::LessThan {
            column,
            value: value.into(),
        })
    }

    pub fn lt_or_eq(
        &mut self,
        column: DashboardColumn,
        value: impl Into<f64>,
    ) -> Result<&mut Self, FilterError> {
        self.push(Comparison::LessThanOrEqual {
            column,
            value: value.into(),
        })
    }

    /// Add any comparison, subject to the same conflict rules
    pub fn push(&mut self, comparison: Comparison) -> Result<&mut Self, FilterError> {
        if !comparison.value().is_finite() {
            return Err(FilterError::NonFiniteValue {
                column: comparison.column(),
            });
        }
        if let Some(existing) = self
            .comparisons
            .iter()
            .find(|c| c.conflicts_with(&comparison))
        {
            return Err(FilterError::Conflict {
                column: comparison.column(),
                existing: existing.operator(),
                attempted: comparison.operator(),
            });
        }
        self.comparisons.push(comparison);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// Snapshot the comparisons added so far
    pub fn build(&self) -> DashboardQueryFilter {
        DashboardQueryFilter {
            comparisons: self.comparisons.clone(),
        }
    }
}

/// A named, user-defined card selecting forecasts from one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardQuery {
    pub name: String,
    /// Column the card emphasizes when rendered
    pub main_column: DashboardColumn,
    pub from: DashboardTable,
    #[serde(default)]
    pub filter: DashboardQueryFilter,
    #[serde(default)]
    pub skip_today: bool,
    /// Overrides the dashboard's place when set
    #[serde(default)]
    pub place_name: Option<String>,
}

impl DashboardQuery {
    pub fn new(name: impl Into<String>, main_column: DashboardColumn, from: DashboardTable) -> Self {
        Self {
            name: name.into(),
            main_column,
            from,
            filter: DashboardQueryFilter::default(),
            skip_today: false,
            place_name: None,
        }
    }

    pub fn with_filter(mut self, filter: DashboardQueryFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_skip_today(mut self, skip_today: bool) -> Self {
        self.skip_today = skip_today;
        self
    }

    pub fn with_place_name(mut self, place_name: impl Into<String>) -> Self {
        self.place_name = Some(place_name.into());
        self
    }

    /// The query's own place, or `default` when it has none
    pub fn effective_place_name<'a>(&'a self, default: &'a str) -> &'a str {
        match self.place_name.as_deref() {
            Some(place) if !place.is_empty() => place,
            _ => default,
        }
    }
}

/// Forecasts matched by one query; the variant always equals the query's table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", content = "forecasts", rename_all = "lowercase")]
pub enum QueryForecasts {
    Daily(Vec<Forecast<DailyTemperatures>>),
    Hourly(Vec<Forecast<HourlyTemperatures>>),
}

impl QueryForecasts {
    pub fn table(&self) -> DashboardTable {
        match self {
            Self::Daily(_) => DashboardTable::Daily,
            Self::Hourly(_) => DashboardTable::Hourly,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Daily(f) => f.len(),
            Self::Hourly(f) => f.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first_weather(&self) -> Option<&WeatherType> {
        match self {
            Self::Daily(f) => f.first().and_then(Forecast::primary_weather),
            Self::Hourly(f) => f.first().and_then(Forecast::primary_weather),
        }
    }

    pub fn first_temperatures(&self) -> Option<Temperatures> {
        match self {
            Self::Daily(f) => f.first().map(Forecast::erased_temperatures),
            Self::Hourly(f) => f.first().map(Forecast::erased_temperatures),
        }
    }

    pub fn first_precipitation(&self) -> Option<f64> {
        match self {
            Self::Daily(f) => f.first().and_then(|f| f.precipitation),
            Self::Hourly(f) => f.first().and_then(|f| f.precipitation),
        }
    }
}

/// A query paired with the forecasts it matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: DashboardQuery,
    pub forecasts: QueryForecasts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use DashboardColumn::*;

    const ALL_COLUMNS: [DashboardColumn; 9] = [
        Weather,
        Temperature,
        MaxTemperature,
        MinTemperature,
        Humidity,
        Precipitation,
        Wind,
        Date,
        DateTime,
    ];

    const ALL_OPERATORS: [ComparisonOperator; 5] = [
        ComparisonOperator::Equals,
        ComparisonOperator::GreaterThan,
        ComparisonOperator::GreaterThanOrEqual,
        ComparisonOperator::LessThan,
        ComparisonOperator::LessThanOrEqual,
    ];

    /// Go through the named builder method for `operator`
    fn add(
        builder: &mut DashboardQueryFilterBuilder,
        operator: ComparisonOperator,
        column: DashboardColumn,
        value: f64,
    ) -> bool {
        let result = match operator {
            ComparisonOperator::Equals => builder.eq(column, value),
            ComparisonOperator::GreaterThan => builder.gt(column, value),
            ComparisonOperator::GreaterThanOrEqual => builder.gt_or_eq(column, value),
            ComparisonOperator::LessThan => builder.lt(column, value),
            ComparisonOperator::LessThanOrEqual => builder.lt_or_eq(column, value),
        };
        result.is_ok()
    }

    /// Whether `(column, operator)` may join a filter already holding `accepted`,
    /// written out independently of `Comparison::conflicts_with`
    fn allowed(
        accepted: &[(DashboardColumn, ComparisonOperator)],
        column: DashboardColumn,
        operator: ComparisonOperator,
    ) -> bool {
        let is_lower = |op: ComparisonOperator| {
            matches!(
                op,
                ComparisonOperator::GreaterThan | ComparisonOperator::GreaterThanOrEqual
            )
        };
        let is_upper = |op: ComparisonOperator| {
            matches!(
                op,
                ComparisonOperator::LessThan | ComparisonOperator::LessThanOrEqual
            )
        };
        accepted.iter().filter(|(c, _)| *c == column).all(|&(_, existing)| {
            existing != ComparisonOperator::Equals
                && operator != ComparisonOperator::Equals
                && !(is_lower(existing) && is_lower(operator))
                && !(is_upper(existing) && is_upper(operator))
        })
    }

    /// Feed `calls` in order, checking every accept/reject against `allowed`
    fn check_sequence(calls: &[(DashboardColumn, ComparisonOperator)]) {
        let mut builder = DashboardQueryFilter::builder();
        let mut accepted = Vec::new();
        for (i, &(column, operator)) in calls.iter().enumerate() {
            let expected = allowed(&accepted, column, operator);
            let landed = add(&mut builder, operator, column, i as f64);
            assert_eq!(landed, expected, "{:?} at step {} of {:?}", operator, i, calls);
            if landed {
                accepted.push((column, operator));
            }
            assert_eq!(builder.len(), accepted.len());
        }
        assert_eq!(builder.build().len(), accepted.len());
    }

    #[test]
    fn test_every_pair_follows_conflict_rule() {
        for first_column in ALL_COLUMNS {
            for first_op in ALL_OPERATORS {
                for second_column in ALL_COLUMNS {
                    for second_op in ALL_OPERATORS {
                        check_sequence(&[(first_column, first_op), (second_column, second_op)]);
                        check_sequence(&[(second_column, second_op), (first_column, first_op)]);
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_triple_follows_conflict_rule() {
        // one column for all three calls, then the third on a second column
        for column in ALL_COLUMNS {
            let other = if column == Weather { Wind } else { Weather };
            for a in ALL_OPERATORS {
                for b in ALL_OPERATORS {
                    for c in ALL_OPERATORS {
                        check_sequence(&[(column, a), (column, b), (column, c)]);
                        check_sequence(&[(column, a), (column, b), (other, c)]);
                        check_sequence(&[(column, a), (other, b), (column, c)]);
                    }
                }
            }
        }
    }

    #[test]
    fn test_range_plus_any_third_bound_is_rejected() {
        for op in ALL_OPERATORS {
            let mut builder = DashboardQueryFilter::builder();
            builder.gt_or_eq(Humidity, 20).unwrap().lt(Humidity, 80).unwrap();
            assert!(!add(&mut builder, op, Humidity, 50.0), "{:?}", op);
            assert_eq!(builder.build().len(), 2);
        }
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            for op in ALL_OPERATORS {
                let mut builder = DashboardQueryFilter::builder();
                builder.gt(Temperature, 0).unwrap();
                let err = builder
                    .push(Comparison::new(op, Wind, value))
                    .unwrap_err();
                assert_eq!(err, FilterError::NonFiniteValue { column: Wind });
                assert!(!add(&mut builder, op, Precipitation, value));
                assert_eq!(builder.len(), 1);
            }
        }
    }

    #[test]
    fn test_try_from_rejects_non_finite_values() {
        let comparisons = vec![
            Comparison::new(ComparisonOperator::GreaterThan, Temperature, 10.0),
            Comparison::new(ComparisonOperator::LessThan, Temperature, f64::INFINITY),
        ];
        assert_eq!(
            DashboardQueryFilter::try_from(comparisons).unwrap_err(),
            FilterError::NonFiniteValue { column: Temperature }
        );

        let nan = vec![Comparison::new(ComparisonOperator::Equals, Weather, f64::NAN)];
        assert!(DashboardQueryFilter::try_from(nan).is_err());
    }

    #[test]
    fn test_built_query_equals_its_clone() {
        let mut builder = DashboardQueryFilter::builder();
        builder.gt(Precipitation, 0.5).unwrap().lt(Precipitation, 1e6).unwrap();
        let query = DashboardQuery::new("Rainy", Precipitation, DashboardTable::Daily)
            .with_filter(builder.build());
        assert_eq!(query, query.clone());
    }

    #[test]
    fn test_non_conflicting_calls_all_land() {
        let mut builder = DashboardQueryFilter::builder();
        builder
            .eq(Weather, 800)
            .unwrap()
            .gt(Temperature, 10)
            .unwrap()
            .lt_or_eq(Humidity, 60)
            .unwrap()
            .gt_or_eq(Wind, 1.5)
            .unwrap()
            .lt(Precipitation, 0.1)
            .unwrap();

        let filter = builder.build();
        assert_eq!(filter.len(), 5);
        assert_eq!(filter.comparisons()[0], Comparison::Equals { column: Weather, value: 800.0 });
        assert_eq!(filter.comparisons()[4].operator(), ComparisonOperator::LessThan);
    }

    #[test]
    fn test_range_on_one_column_is_allowed() {
        let filter = DashboardQueryFilter::builder()
            .gt(Temperature, 10)
            .unwrap()
            .lt(Temperature, 25)
            .unwrap()
            .build();
        assert_eq!(filter.len(), 2);
        assert_eq!(filter.comparisons_for(Temperature).count(), 2);
        assert_eq!(filter.comparisons_for(Humidity).count(), 0);
    }

    #[test]
    fn test_eq_then_bound_conflicts() {
        let mut builder = DashboardQueryFilter::builder();
        builder.eq(Temperature, 1).unwrap();

        let err = builder.gt(Temperature, 2).unwrap_err();
        assert_eq!(
            err,
            FilterError::Conflict {
                column: Temperature,
                existing: ComparisonOperator::Equals,
                attempted: ComparisonOperator::GreaterThan,
            }
        );
        assert!(builder.lt_or_eq(Temperature, 3).is_err());
        assert!(builder.eq(Temperature, 4).is_err());
    }

    #[test]
    fn test_bound_then_eq_conflicts() {
        let mut builder = DashboardQueryFilter::builder();
        builder.lt(Humidity, 50).unwrap();
        assert!(builder.eq(Humidity, 40).is_err());
    }

    #[test]
    fn test_same_class_conflicts() {
        let mut builder = DashboardQueryFilter::builder();
        builder.gt(Wind, 2).unwrap();
        assert!(builder.gt_or_eq(Wind, 3).is_err());
        assert!(builder.gt(Wind, 3).is_err());

        builder.lt_or_eq(Wind, 9).unwrap();
        assert!(builder.lt(Wind, 8).is_err());
    }

    #[test]
    fn test_rejected_call_leaves_builder_usable() {
        let mut builder = DashboardQueryFilter::builder();
        builder.eq(Weather, 800).unwrap();
        assert!(builder.gt(Weather, 0).is_err());
        assert_eq!(builder.len(), 1);

        builder.gt(Temperature, 15).unwrap();
        let first = builder.build();
        builder.lt(Temperature, 25).unwrap();
        let second = builder.build();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn test_filter_error_maps_to_invalid_query() {
        let err = DashboardQueryFilter::builder()
            .eq(Date, 1)
            .unwrap()
            .eq(Date, 2)
            .unwrap_err();
        let app: AppError = err.into();
        assert_eq!(app.kind(), ErrorKind::InvalidQuery);
    }

    #[test]
    fn test_deserialize_validates_filter() {
        let ok: DashboardQueryFilter = serde_json::from_str(
            r#"[{"op":"greater_than","column":"temperature","value":10.0},
                {"op":"less_than","column":"temperature","value":20.0}]"#,
        )
        .unwrap();
        assert_eq!(ok.len(), 2);

        let conflicting = serde_json::from_str::<DashboardQueryFilter>(
            r#"[{"op":"equals","column":"weather","value":800.0},
                {"op":"less_than","column":"weather","value":900.0}]"#,
        );
        assert!(conflicting.is_err());
    }

    #[test]
    fn test_query_defaults_and_overrides() {
        let query = DashboardQuery::new("Tomorrow weather", Weather, DashboardTable::Daily)
            .with_skip_today(true);
        assert!(query.filter.is_empty());
        assert!(query.skip_today);
        assert_eq!(query.effective_place_name("Tokyo"), "Tokyo");

        let elsewhere = query.clone().with_place_name("Sapporo");
        assert_eq!(elsewhere.effective_place_name("Tokyo"), "Sapporo");
        assert_ne!(query, elsewhere);
    }

    #[test]
    fn test_comparison_display() {
        let c = Comparison::new(ComparisonOperator::GreaterThanOrEqual, MaxTemperature, 20.5);
        assert_eq!(c.to_string(), "max_temperature >= 20.5");
    }

    #[test]
    fn test_empty_query_forecasts_keep_table() {
        let hourly = QueryForecasts::Hourly(Vec::new());
        assert_eq!(hourly.table(), DashboardTable::Hourly);
        assert!(hourly.is_empty());
        assert!(hourly.first_weather().is_none());
        assert!(hourly.first_temperatures().is_none());
    }
}
