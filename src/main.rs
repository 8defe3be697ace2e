use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use weatherboard_core::{App, Cancelled, Config, TemperatureUnit as UnitPreference};
use weatherboard_services::{DashboardModel, Dispatcher};
use weatherboard_weather::{
    QueryResult, StubPreferenceRepository, StubWeatherRepository, TemperatureUnit, Temperatures,
};

fn display_unit(preference: UnitPreference) -> Option<TemperatureUnit> {
    match preference {
        UnitPreference::Auto => None,
        UnitPreference::Celsius => Some(TemperatureUnit::Celsius),
        UnitPreference::Fahrenheit => Some(TemperatureUnit::Fahrenheit),
    }
}

fn format_temperatures(temperatures: Temperatures, unit: Option<TemperatureUnit>) -> String {
    match unit {
        Some(unit) => temperatures.converted(unit).to_string(),
        None => temperatures.to_string(),
    }
}

fn summarize(result: &QueryResult, unit: Option<TemperatureUnit>) -> String {
    let weather = result
        .forecasts
        .first_weather()
        .map_or("-", |w| w.description.as_str());
    let temperatures = result
        .forecasts
        .first_temperatures()
        .map_or_else(|| "-".to_string(), |t| format_temperatures(t, unit));
    let precipitation = result
        .forecasts
        .first_precipitation()
        .map_or_else(|| "-".to_string(), |p| format!("{:.2} mm", p));

    format!(
        "{:<28} [{}] {} | {} | {}",
        result.query.name, result.query.main_column, weather, temperatures, precipitation
    )
}

fn print_dashboard(model: &DashboardModel, place_name: &str, unit: Option<TemperatureUnit>) {
    println!("Weatherboard - {}", place_name);
    if let Some(current) = model.current_forecast().borrow().as_ref() {
        let weather = current
            .forecast
            .primary_weather()
            .map_or("-", |w| w.description.as_str());
        println!(
            "  Now: {}, {}",
            weather,
            format_temperatures(current.forecast.erased_temperatures(), unit)
        );
    }
    for result in model.query_results().borrow().iter() {
        println!("  {}", summarize(result, unit));
    }
}

/// Keep the dashboard live until Ctrl-C, reprinting whenever the cards change
async fn watch(model: &DashboardModel, place_name: &str, unit: Option<TemperatureUnit>) {
    let mut results = model.query_results();
    let printer = async {
        while results.changed().await.is_ok() {
            print_dashboard(model, place_name, unit);
        }
    };

    tokio::select! {
        outcome = model.run() => match outcome {
            Ok(()) => tracing::info!("Preferences closed, stopping"),
            Err(Cancelled) => tracing::info!("Dashboard stopped"),
        },
        _ = printer => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = Config::path()?;
    let created = !config_path.exists();
    let config = Config::load_from(&config_path)?;

    weatherboard_core::init(&config.logging.filter)?;
    if created {
        tracing::info!("Created default config at {}", config_path.display());
    }
    let mut app = App::from_config(config)?;

    let config = app.shared_config();
    let place_name = config.weather.place_name.as_str();
    let unit = display_unit(config.weather.temperature_unit);
    tracing::info!(
        "Weatherboard started for {} (config: {})",
        place_name,
        config.config_dir.display()
    );

    let dispatcher = Dispatcher::new(tokio::runtime::Handle::current(), app.scope());
    let preferences = Arc::new(StubPreferenceRepository::new(Some(place_name.to_string())));
    let model = DashboardModel::new(
        Arc::new(StubWeatherRepository::new()),
        preferences,
        dispatcher,
    )
    .with_refresh_interval(Duration::from_secs(
        u64::from(config.weather.refresh_minutes) * 60,
    ));

    if std::env::args().any(|arg| arg == "--watch") {
        let scope = app.scope();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted");
                scope.cancel();
            }
        });
        watch(&model, place_name, unit).await;
    } else {
        model.refresh().await?;
        print_dashboard(&model, place_name, unit);
    }

    app.shutdown()?;
    Ok(())
}
