use chrono::NaiveDate;

use crate::{error::ValidationError, unit::UnitKind};

/// Raw input of the current-conditions unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentQuery {
    pub location: String,
}

/// Raw input of the historical-conditions unit. `date` is expected as `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricalQuery {
    pub location: String,
    pub date: String,
}

/// Raw input of the marine unit. Coordinates are forwarded as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarineQuery {
    pub latitude: String,
    pub longitude: String,
}

/// User input for one of the three units, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Current(CurrentQuery),
    Historical(HistoricalQuery),
    Marine(MarineQuery),
}

/// A query that passed validation, reduced to the endpoint it targets and its
/// outbound parameters (credential not included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidQuery {
    pub kind: UnitKind,
    pub params: Vec<(&'static str, String)>,
}

impl Query {
    pub fn kind(&self) -> UnitKind {
        match self {
            Query::Current(_) => UnitKind::Current,
            Query::Historical(_) => UnitKind::Historical,
            Query::Marine(_) => UnitKind::Marine,
        }
    }

    /// Check required fields. `today` bounds the historical date.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidQuery, ValidationError> {
        match self {
            Query::Current(q) => {
                let location = q.location.trim();
                if location.is_empty() {
                    return Err(ValidationError::MissingLocation);
                }

                Ok(ValidQuery {
                    kind: UnitKind::Current,
                    params: vec![("query", location.to_string())],
                })
            }
            Query::Historical(q) => {
                let location = q.location.trim();
                let date = q.date.trim();
                if location.is_empty() || date.is_empty() {
                    return Err(ValidationError::MissingLocationOrDate);
                }

                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|_| ValidationError::InvalidDate)?;
                if date > today {
                    return Err(ValidationError::FutureDate);
                }

                Ok(ValidQuery {
                    kind: UnitKind::Historical,
                    params: vec![
                        ("query", location.to_string()),
                        ("historical_date", date.format("%Y-%m-%d").to_string()),
                    ],
                })
            }
            Query::Marine(q) => {
                let latitude = q.latitude.trim();
                let longitude = q.longitude.trim();
                if latitude.is_empty() || longitude.is_empty() {
                    return Err(ValidationError::MissingCoordinates);
                }

                Ok(ValidQuery {
                    kind: UnitKind::Marine,
                    params: vec![
                        ("latitude", latitude.to_string()),
                        ("longitude", longitude.to_string()),
                        ("tide", "yes".to_string()),
                    ],
                })
            }
        }
    }
}

impl From<CurrentQuery> for Query {
    fn from(q: CurrentQuery) -> Self {
        Query::Current(q)
    }
}

impl From<HistoricalQuery> for Query {
    fn from(q: HistoricalQuery) -> Self {
        Query::Historical(q)
    }
}

impl From<MarineQuery> for Query {
    fn from(q: MarineQuery) -> Self {
        Query::Marine(q)
    }
}
