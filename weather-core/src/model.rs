//! Lenient views over provider payloads.
//!
//! The payload itself is kept verbatim as JSON. Renderers deserialize these
//! views from it; every field is optional so a missing section is skipped
//! instead of failing the whole panel. Nested objects and lists go through
//! [`lenient`] and [`lenient_list`], so a section of the wrong shape is
//! dropped on its own and its siblings still render. Scalars stay as raw
//! JSON values and are displayed exactly as the provider sent them.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Provider response body of a successful request.
pub type Payload = Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Location {
    pub name: Option<Value>,
    pub country: Option<Value>,
    pub region: Option<Value>,
    pub localtime: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentReading {
    #[serde(deserialize_with = "lenient_list")]
    pub weather_icons: Option<Vec<Value>>,
    pub temperature: Option<Value>,
    #[serde(deserialize_with = "lenient_list")]
    pub weather_descriptions: Option<Vec<Value>>,
    pub feelslike: Option<Value>,
    pub humidity: Option<Value>,
    pub wind_speed: Option<Value>,
    pub wind_dir: Option<Value>,
    pub pressure: Option<Value>,
    pub visibility: Option<Value>,
    pub uv_index: Option<Value>,
    pub cloudcover: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentPayload {
    #[serde(deserialize_with = "lenient")]
    pub location: Option<Location>,
    #[serde(deserialize_with = "lenient")]
    pub current: Option<CurrentReading>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Astro {
    pub sunrise: Option<Value>,
    pub sunset: Option<Value>,
    pub moon_phase: Option<Value>,
    pub moon_illumination: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoricalDay {
    pub mintemp: Option<Value>,
    pub maxtemp: Option<Value>,
    pub avgtemp: Option<Value>,
    pub sunhour: Option<Value>,
    pub uv_index: Option<Value>,
    pub totalsnow: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub astro: Option<Astro>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoricalPayload {
    #[serde(deserialize_with = "lenient")]
    pub location: Option<Location>,
    /// Date key to day data, in payload order.
    #[serde(deserialize_with = "lenient")]
    pub historical: Option<Map<String, Value>>,
}

impl HistoricalPayload {
    /// Days in the order the provider listed them. Entries that are not
    /// objects render as empty days.
    pub fn days(&self) -> Vec<(&str, HistoricalDay)> {
        self.historical
            .iter()
            .flatten()
            .map(|(date, day)| {
                let day: HistoricalDay = serde_json::from_value(day.clone()).unwrap_or_default();
                (date.as_str(), day)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tide {
    #[serde(rename = "tideTime")]
    pub tide_time: Option<Value>,
    pub tide_type: Option<Value>,
    #[serde(rename = "tideHeight_mt")]
    pub tide_height_mt: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MarineHour {
    pub water_temp: Option<Value>,
    pub sig_height_m: Option<Value>,
    pub swell_height: Option<Value>,
    pub swell_dir_16_point: Option<Value>,
    pub wind_speed: Option<Value>,
    pub visibility: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MarineDay {
    pub date: Option<Value>,
    pub mintemp: Option<Value>,
    pub maxtemp: Option<Value>,
    pub avgtemp: Option<Value>,
    pub uv_index: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub astro: Option<Astro>,
    #[serde(deserialize_with = "lenient_list")]
    pub tides: Option<Vec<Tide>>,
    #[serde(deserialize_with = "lenient_list")]
    pub hourly: Option<Vec<MarineHour>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequestInfo {
    pub query: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MarinePayload {
    #[serde(deserialize_with = "lenient")]
    pub request: Option<RequestInfo>,
    #[serde(deserialize_with = "lenient_list")]
    pub forecast: Option<Vec<MarineDay>>,
}

/// Field reader that turns a value of the wrong shape into `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(&value).unwrap_or_default())
}

/// List reader: anything but an array is `None`; each element is read on its
/// own and a malformed one becomes `T::default()`.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => {
            Some(items.iter().map(|item| T::deserialize(item).unwrap_or_default()).collect())
        }
        _ => None,
    })
}

/// Parse a lenient view; a payload of the wrong shape yields an empty view.
pub fn view<T>(payload: &Payload) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    T::deserialize(payload).unwrap_or_default()
}

/// Text of a scalar as shown in a panel: strings unquoted, numbers as sent,
/// absent or null values as `-`.
pub fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
