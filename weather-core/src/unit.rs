use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, NaiveDate};
use tracing::{info, instrument};

use crate::{
    client::WeatherClient,
    error::ValidationError,
    query::Query,
    render::{View, render},
    state::{RequestState, UnitState},
};

/// The three request/render flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Current,
    Historical,
    Marine,
}

impl UnitKind {
    /// Resource path on the provider host.
    pub fn endpoint(self) -> &'static str {
        match self {
            UnitKind::Current => "current",
            UnitKind::Historical => "historical",
            UnitKind::Marine => "marine",
        }
    }

    /// Shown when the provider reports an error without detail.
    pub fn fallback_message(self) -> &'static str {
        match self {
            UnitKind::Current => "Failed to fetch weather data",
            UnitKind::Historical => "Failed to fetch historical weather data",
            UnitKind::Marine => "Failed to fetch marine weather data",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UnitKind::Current => "Current Weather",
            UnitKind::Historical => "Historical Weather",
            UnitKind::Marine => "Marine Weather",
        }
    }
}

/// One self-contained query/fetch/render flow.
///
/// `submit` takes `&self`, so a unit can be shared and re-submitted while a
/// request is still in flight. Responses to superseded submissions are
/// dropped.
#[derive(Debug)]
pub struct WeatherUnit {
    kind: UnitKind,
    client: Arc<WeatherClient>,
    state: Mutex<UnitState>,
}

impl WeatherUnit {
    pub fn new(kind: UnitKind, client: Arc<WeatherClient>) -> Self {
        Self { kind, client, state: Mutex::new(UnitState::new()) }
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Snapshot of the current request state.
    pub fn state(&self) -> RequestState {
        self.lock().state().clone()
    }

    pub fn view(&self) -> View {
        let state = self.lock();
        render(self.kind, state.state())
    }

    /// Validate against today's local date, then fetch.
    pub async fn submit(&self, query: Query) -> RequestState {
        self.submit_on(query, Local::now().date_naive()).await
    }

    /// Validate, fetch at most once, and return the state this unit ends up in.
    #[instrument(skip_all, fields(unit = self.kind.endpoint()))]
    pub async fn submit_on(&self, query: Query, today: NaiveDate) -> RequestState {
        let checked = if query.kind() == self.kind {
            query.validate(today)
        } else {
            Err(ValidationError::WrongUnit { expected: self.kind, got: query.kind() })
        };

        let valid = match checked {
            Ok(valid) => valid,
            Err(err) => {
                info!(error = %err, "rejected input");
                let mut state = self.lock();
                state.fail_validation(&err);
                return state.state().clone();
            }
        };

        let ticket = self.lock().begin();
        let outcome = self.client.fetch(&valid).await;

        let mut state = self.lock();
        if state.resolve(ticket, outcome) {
            info!(ticket = ticket.seq(), success = state.state().payload().is_some(), "request resolved");
        }
        state.state().clone()
    }

    fn lock(&self) -> MutexGuard<'_, UnitState> {
        // The state is always a complete variant, even after a panic elsewhere.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{FakeTransport, Reply, client_with};
    use crate::query::{CurrentQuery, HistoricalQuery, MarineQuery};
    use serde_json::json;
    use tokio::sync::oneshot;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn unit(kind: UnitKind, transport: FakeTransport) -> WeatherUnit {
        WeatherUnit::new(kind, Arc::new(client_with(transport)))
    }

    fn current(location: &str) -> Query {
        CurrentQuery { location: location.into() }.into()
    }

    #[tokio::test]
    async fn blank_input_never_hits_the_network() {
        let cases: [(UnitKind, Query, &str); 3] = [
            (UnitKind::Current, current("  "), "Please enter a location"),
            (
                UnitKind::Historical,
                HistoricalQuery { location: "Paris".into(), date: " ".into() }.into(),
                "Please enter both location and date",
            ),
            (
                UnitKind::Marine,
                MarineQuery { latitude: "45".into(), longitude: "".into() }.into(),
                "Please enter both latitude and longitude",
            ),
        ];

        for (kind, query, message) in cases {
            let transport = FakeTransport::default();
            let calls = transport.calls();
            let unit = unit(kind, transport);

            let state = unit.submit_on(query, today()).await;

            assert_eq!(state, RequestState::Failure(message.into()));
            assert!(calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn query_for_another_unit_is_rejected_without_a_request() {
        let transport = FakeTransport::default();
        let calls = transport.calls();
        let unit = unit(UnitKind::Current, transport);

        let query = MarineQuery { latitude: "45".into(), longitude: "-2".into() }.into();
        let state = unit.submit_on(query, today()).await;

        assert_eq!(
            state,
            RequestState::Failure("Marine Weather input cannot be submitted to Current Weather".into())
        );
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_error_becomes_failure() {
        let body = json!({"error": {"code": 615, "info": "Request failed."}});
        let unit = unit(UnitKind::Current, FakeTransport::new([Reply::Json(body)]));

        let state = unit.submit_on(current("Atlantis"), today()).await;
        assert_eq!(state, RequestState::Failure("Request failed.".into()));
    }

    #[tokio::test]
    async fn fallback_message_is_per_unit() {
        for kind in [UnitKind::Current, UnitKind::Historical, UnitKind::Marine] {
            let query: Query = match kind {
                UnitKind::Current => current("Paris"),
                UnitKind::Historical => {
                    HistoricalQuery { location: "Paris".into(), date: "2024-06-01".into() }.into()
                }
                UnitKind::Marine => {
                    MarineQuery { latitude: "45".into(), longitude: "-2".into() }.into()
                }
            };
            let body = json!({"error": {}});
            let unit = unit(kind, FakeTransport::new([Reply::Json(body)]));

            let state = unit.submit_on(query, today()).await;
            assert_eq!(state, RequestState::Failure(kind.fallback_message().into()));
        }
    }

    #[tokio::test]
    async fn transport_failure_becomes_network_error() {
        let unit = unit(UnitKind::Current, FakeTransport::new([Reply::Fail("dns".into())]));

        let state = unit.submit_on(current("Paris"), today()).await;
        assert_eq!(state, RequestState::Failure("Network error. Please try again.".into()));
    }

    #[tokio::test]
    async fn success_issues_exactly_one_call() {
        let transport = FakeTransport::new([Reply::Json(json!({"location": {"name": "Paris"}}))]);
        let calls = transport.calls();
        let unit = unit(UnitKind::Current, transport);

        let state = unit.submit_on(current("Paris"), today()).await;

        assert!(state.payload().is_some());
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(unit.state(), state);
    }

    #[tokio::test]
    async fn unit_is_loading_while_request_in_flight() {
        let (tx, rx) = oneshot::channel();
        let unit = Arc::new(unit(UnitKind::Current, FakeTransport::new([Reply::Gated(rx)])));

        let task = tokio::spawn({
            let unit = Arc::clone(&unit);
            async move { unit.submit_on(current("Paris"), today()).await }
        });

        while !unit.state().is_loading() {
            tokio::task::yield_now().await;
        }
        assert_eq!(unit.view(), View::Loading);

        tx.send(json!({"location": {"name": "Paris"}})).unwrap();
        let state = task.await.unwrap();
        assert!(state.payload().is_some());
    }

    #[tokio::test]
    async fn late_response_to_older_submission_is_dropped() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let transport = FakeTransport::new([Reply::Gated(first_rx), Reply::Gated(second_rx)]);
        let calls = transport.calls();
        let unit = Arc::new(unit(UnitKind::Current, transport));

        let first = tokio::spawn({
            let unit = Arc::clone(&unit);
            async move { unit.submit_on(current("London"), today()).await }
        });
        while calls.lock().unwrap().len() < 1 {
            tokio::task::yield_now().await;
        }

        let second = tokio::spawn({
            let unit = Arc::clone(&unit);
            async move { unit.submit_on(current("Paris"), today()).await }
        });
        while calls.lock().unwrap().len() < 2 {
            tokio::task::yield_now().await;
        }

        second_tx.send(json!({"location": {"name": "Paris"}})).unwrap();
        second.await.unwrap();
        first_tx.send(json!({"location": {"name": "London"}})).unwrap();
        first.await.unwrap();

        let state = unit.state();
        assert_eq!(state.payload(), Some(&json!({"location": {"name": "Paris"}})));
    }
}
