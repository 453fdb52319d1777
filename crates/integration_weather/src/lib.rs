//! OpenWeatherMap integration
//!
//! Raw client for the weather provider: geocoding, current conditions,
//! monthly/yearly statistics, hourly history and the 5-day forecast.
//! Values are normalized to metric units before they leave this crate.

mod client;
mod config;
mod error;
mod models;

pub use client::{OpenWeatherMapClient, WeatherClient, attribute_month, trailing_months};
pub use config::OpenWeatherConfig;
pub use error::WeatherError;
pub use models::{
    CurrentConditions, GeoPlace, KELVIN_OFFSET, MonthlyStatistics, Observation,
    StatisticalClimate, StatisticsSource, days_in_month, kelvin_to_celsius,
};
