//! Current weather via OpenStreetMap geocoding and the National Weather Service.
//!
//! Three sequential calls: Nominatim search → NWS points → NWS forecast.
//! Only the first forecast period is reported.

use super::traits::{str_arg, ParamKind, ParamSpec, Tool, ToolSpec};
use crate::config::WeatherConfig;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const NAME: &str = "weather_tool";

pub struct WeatherTool {
    spec: ToolSpec,
    config: WeatherConfig,
    http: reqwest::Client,
}

impl WeatherTool {
    pub fn new(http: reqwest::Client, config: WeatherConfig) -> Self {
        Self {
            spec: ToolSpec {
                name: NAME.into(),
                description:
                    "Get current weather for a location using the National Weather Service API."
                        .into(),
                params: vec![ParamSpec::required(
                    "location",
                    ParamKind::String,
                    "Place name or ZIP code, e.g. 'Maryville, MO'",
                )],
            },
            config,
            http,
        }
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)], what: &str) -> Result<Value> {
        let resp = self
            .http
            .get(url)
            .query(query)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .with_context(|| format!("{} request failed", what))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("{} failed ({}): {}", what, status, body);
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to decode {} JSON response", what))
    }
}

/// Extract `(lat, lon)` from a Nominatim search response.
pub fn parse_geocode(geo: &Value, location: &str) -> Result<(String, String)> {
    let first = match geo.as_array() {
        Some(list) if !list.is_empty() => &list[0],
        _ => bail!("No geocoding result for '{}'.", location),
    };

    let coord = |key: &str| match &first[key] {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };

    match (coord("lat"), coord("lon")) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => bail!(
            "Geocoding result for '{}' is malformed or missing lat/lon.",
            location
        ),
    }
}

/// Forecast URL from an NWS points response.
pub fn forecast_url(points: &Value) -> Result<String> {
    points["properties"]["forecast"]
        .as_str()
        .map(str::to_string)
        .context("Could not retrieve forecast URL from NWS points data.")
}

/// One-line summary of the first forecast period.
pub fn format_current(forecast: &Value) -> Result<String> {
    let periods = forecast["properties"]["periods"]
        .as_array()
        .context("Forecast data is missing expected 'periods' information.")?;
    let Some(current) = periods.first() else {
        bail!("No forecast data available in periods.");
    };

    let field = |key: &str| match &current[key] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => "N/A".to_string(),
    };

    let updated = current["startTime"]
        .as_str()
        .and_then(|ts| ts.get(..19))
        .map(|ts| ts.replace('T', " "))
        .unwrap_or_else(|| "Timestamp N/A".to_string());

    Ok(format!(
        "{}: {}, {}°{} (as of {} UTC)",
        field("name"),
        field("shortForecast"),
        field("temperature"),
        field("temperatureUnit"),
        updated
    ))
}

#[async_trait]
impl Tool for WeatherTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let location = str_arg(args, "location")?;
        debug!("Weather lookup: {}", location);

        let geo = self
            .get_json(
                &self.config.geocode_url,
                &[("q", location), ("format", "json"), ("limit", "1")],
                "Geocoding",
            )
            .await?;
        let (lat, lon) = parse_geocode(&geo, location)?;

        let points_url = self
            .config
            .points_url
            .replace("{lat}", &lat)
            .replace("{lon}", &lon);
        let points = self.get_json(&points_url, &[], "NWS points").await?;

        let forecast_url = forecast_url(&points)?;
        let forecast = self.get_json(&forecast_url, &[], "NWS forecast").await?;

        format_current(&forecast)
    }
}
