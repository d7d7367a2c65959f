//! The screen's state machine.
//!
//! [`WeatherController`] is the only writer of the state cells below; everything
//! else holds a [`watch::Receiver`] and reads.

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    Coordinates, LocationError, WeatherResponse, location::LocationProvider,
    network::NetworkMonitor, usecase::GetWeather,
};

pub const UNKNOWN_ERROR: &str = "Unknown error occurred";
pub const LOCATION_UNAVAILABLE: &str = "Unable to get current location";
pub const PERMISSION_NOT_GRANTED: &str = "Location permission not granted";

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherState {
    Loading,
    Success(WeatherResponse),
    Error(String),
}

/// What the UI should show after a [`WeatherController::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Connectivity check failed; nothing else was attempted.
    NoNetwork,
    /// Location access is missing; the UI should ask for it.
    PermissionRequired,
    /// The sequence ran to the end; read the weather state.
    Completed,
}

pub struct WeatherController {
    get_weather: Arc<dyn GetWeather>,
    location: Arc<dyn LocationProvider>,
    network: Arc<dyn NetworkMonitor>,

    weather_state: watch::Sender<WeatherState>,
    has_network: watch::Sender<bool>,
    has_location_permission: watch::Sender<bool>,
    coordinates: watch::Sender<Option<Coordinates>>,
}

impl WeatherController {
    pub fn new(
        get_weather: Arc<dyn GetWeather>,
        location: Arc<dyn LocationProvider>,
        network: Arc<dyn NetworkMonitor>,
    ) -> Self {
        Self {
            get_weather,
            location,
            network,
            weather_state: watch::Sender::new(WeatherState::Loading),
            has_network: watch::Sender::new(true),
            has_location_permission: watch::Sender::new(false),
            coordinates: watch::Sender::new(None),
        }
    }

    pub fn weather_state(&self) -> watch::Receiver<WeatherState> {
        self.weather_state.subscribe()
    }

    pub fn has_network(&self) -> watch::Receiver<bool> {
        self.has_network.subscribe()
    }

    pub fn has_location_permission(&self) -> watch::Receiver<bool> {
        self.has_location_permission.subscribe()
    }

    pub fn coordinates(&self) -> watch::Receiver<Option<Coordinates>> {
        self.coordinates.subscribe()
    }

    /// Snapshot of the weather state.
    pub fn current_state(&self) -> WeatherState {
        self.weather_state.borrow().clone()
    }

    pub fn set_loading(&self) {
        self.weather_state.send_replace(WeatherState::Loading);
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.weather_state.send_replace(WeatherState::Error(message.into()));
    }

    pub async fn check_network_connection(&self) -> bool {
        let available = self.network.has_network_access().await;
        self.has_network.send_replace(available);
        available
    }

    pub fn check_location_permission(&self) -> bool {
        let granted = self.location.has_permission();
        self.has_location_permission.send_replace(granted);
        granted
    }

    pub async fn fetch_weather(&self, latitude: f64, longitude: f64) {
        self.set_loading();

        match self.get_weather.invoke(latitude, longitude).await {
            Ok(weather) => {
                self.weather_state.send_replace(WeatherState::Success(weather));
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "Weather fetch failed");
                if message.is_empty() {
                    self.set_error(UNKNOWN_ERROR);
                } else {
                    self.set_error(message);
                }
            }
        }
    }

    /// Run the launch/refresh sequence: network, permission, location, weather.
    ///
    /// Stops at the first missing precondition without touching anything past it.
    pub async fn refresh(&self) -> RefreshOutcome {
        if !self.check_network_connection().await {
            tracing::info!("No network connection");
            return RefreshOutcome::NoNetwork;
        }

        if !self.check_location_permission() {
            tracing::info!("Location permission required");
            return RefreshOutcome::PermissionRequired;
        }

        self.set_loading();

        match self.location.current_location().await {
            Ok(Some(coordinates)) => {
                self.coordinates.send_replace(Some(coordinates));
                self.fetch_weather(coordinates.latitude, coordinates.longitude)
                    .await;
            }
            Ok(None) => self.set_error(LOCATION_UNAVAILABLE),
            Err(LocationError::PermissionDenied) => self.set_error(PERMISSION_NOT_GRANTED),
            Err(e) => {
                tracing::warn!(error = %e, "Location lookup failed");
                self.set_error(LOCATION_UNAVAILABLE);
            }
        }

        RefreshOutcome::Completed
    }
}

impl std::fmt::Debug for WeatherController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherController")
            .field("weather_state", &*self.weather_state.borrow())
            .field("has_network", &*self.has_network.borrow())
            .field("has_location_permission", &*self.has_location_permission.borrow())
            .field("coordinates", &*self.coordinates.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeatherError;
    use crate::location::MockLocationProvider;
    use crate::model::fixtures::test_city;
    use crate::network::MockNetworkMonitor;
    use crate::usecase::MockGetWeather;

    fn online() -> MockNetworkMonitor {
        let mut network = MockNetworkMonitor::new();
        network.expect_has_network_access().returning(|| true);
        network
    }

    fn located_at(coordinates: Coordinates) -> MockLocationProvider {
        let mut location = MockLocationProvider::new();
        location.expect_has_permission().returning(|| true);
        location
            .expect_current_location()
            .returning(move || Ok(Some(coordinates)));
        location
    }

    fn controller(
        get_weather: MockGetWeather,
        location: MockLocationProvider,
        network: MockNetworkMonitor,
    ) -> WeatherController {
        WeatherController::new(Arc::new(get_weather), Arc::new(location), Arc::new(network))
    }

    fn idle() -> WeatherController {
        controller(
            MockGetWeather::new(),
            MockLocationProvider::new(),
            MockNetworkMonitor::new(),
        )
    }

    #[test]
    fn initial_state_is_loading() {
        let controller = idle();

        assert_eq!(*controller.weather_state().borrow(), WeatherState::Loading);
        assert!(*controller.has_network().borrow());
        assert!(!*controller.has_location_permission().borrow());
        assert_eq!(*controller.coordinates().borrow(), None);
    }

    #[tokio::test]
    async fn fetch_success_wraps_use_case_value() {
        let expected = test_city(20.0);
        let returned = expected.clone();

        let mut get_weather = MockGetWeather::new();
        get_weather
            .expect_invoke()
            .times(1)
            .returning(move |_, _| Ok(returned.clone()));

        let controller = controller(get_weather, MockLocationProvider::new(), MockNetworkMonitor::new());
        controller.fetch_weather(0.0, 0.0).await;

        match controller.current_state() {
            WeatherState::Success(weather) => {
                assert_eq!(weather, expected);
                assert_eq!(weather.name, "Test City");
                assert_eq!(weather.main.temperature, 20.0);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_failure_carries_message() {
        let mut get_weather = MockGetWeather::new();
        get_weather
            .expect_invoke()
            .returning(|_, _| Err(WeatherError::Other("Network error".into())));

        let controller = controller(get_weather, MockLocationProvider::new(), MockNetworkMonitor::new());
        controller.fetch_weather(0.0, 0.0).await;

        assert_eq!(
            controller.current_state(),
            WeatherState::Error("Network error".into())
        );
    }

    #[tokio::test]
    async fn fetch_failure_without_message_uses_fallback() {
        let mut get_weather = MockGetWeather::new();
        get_weather
            .expect_invoke()
            .returning(|_, _| Err(WeatherError::Other(String::new())));

        let controller = controller(get_weather, MockLocationProvider::new(), MockNetworkMonitor::new());
        controller.fetch_weather(0.0, 0.0).await;

        assert_eq!(
            controller.current_state(),
            WeatherState::Error(UNKNOWN_ERROR.into())
        );
    }

    #[tokio::test]
    async fn fetch_passes_coordinates_through() {
        let mut get_weather = MockGetWeather::new();
        get_weather
            .expect_invoke()
            .withf(|lat, lon| *lat == 10.5 && *lon == -20.25)
            .times(1)
            .returning(|_, _| Ok(test_city(1.0)));

        let controller = controller(get_weather, MockLocationProvider::new(), MockNetworkMonitor::new());
        controller.fetch_weather(10.5, -20.25).await;

        assert!(matches!(controller.current_state(), WeatherState::Success(_)));
    }

    #[test]
    fn set_loading_overrides_any_state() {
        let controller = idle();

        controller.set_error("boom");
        controller.set_loading();

        assert_eq!(controller.current_state(), WeatherState::Loading);
    }

    #[test]
    fn set_error_overrides_any_state() {
        let controller = idle();

        controller.set_error("Test error");
        assert_eq!(controller.current_state(), WeatherState::Error("Test error".into()));

        controller.set_loading();
        controller.set_error("Another error");
        assert_eq!(
            controller.current_state(),
            WeatherState::Error("Another error".into())
        );
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let mut get_weather = MockGetWeather::new();
        get_weather
            .expect_invoke()
            .returning(|_, _| Ok(test_city(20.0)));

        let controller = controller(get_weather, MockLocationProvider::new(), MockNetworkMonitor::new());
        let mut state = controller.weather_state();
        assert!(!state.has_changed().unwrap());

        controller.fetch_weather(0.0, 0.0).await;

        assert!(state.has_changed().unwrap());
        assert!(matches!(*state.borrow_and_update(), WeatherState::Success(_)));
    }

    #[tokio::test]
    async fn no_network_stops_before_permission_and_location() {
        let mut network = MockNetworkMonitor::new();
        network.expect_has_network_access().times(1).returning(|| false);

        let mut location = MockLocationProvider::new();
        location.expect_has_permission().never();
        location.expect_current_location().never();

        let mut get_weather = MockGetWeather::new();
        get_weather.expect_invoke().never();

        let controller = controller(get_weather, location, network);

        assert_eq!(controller.refresh().await, RefreshOutcome::NoNetwork);
        assert!(!*controller.has_network().borrow());
        assert_eq!(controller.current_state(), WeatherState::Loading);
    }

    #[tokio::test]
    async fn missing_permission_stops_before_location_and_fetch() {
        let mut location = MockLocationProvider::new();
        location.expect_has_permission().returning(|| false);
        location.expect_current_location().never();

        let mut get_weather = MockGetWeather::new();
        get_weather.expect_invoke().never();

        let controller = controller(get_weather, location, online());

        assert_eq!(controller.refresh().await, RefreshOutcome::PermissionRequired);
        assert!(!*controller.has_location_permission().borrow());
        assert_eq!(*controller.coordinates().borrow(), None);
    }

    #[tokio::test]
    async fn refresh_resolves_location_and_fetches() {
        let here = Coordinates::new(-33.9, 18.4);

        let mut get_weather = MockGetWeather::new();
        get_weather
            .expect_invoke()
            .withf(|lat, lon| *lat == -33.9 && *lon == 18.4)
            .times(1)
            .returning(|_, _| Ok(test_city(20.0)));

        let controller = controller(get_weather, located_at(here), online());

        assert_eq!(controller.refresh().await, RefreshOutcome::Completed);
        assert!(*controller.has_location_permission().borrow());
        assert_eq!(*controller.coordinates().borrow(), Some(here));
        assert_eq!(controller.current_state(), WeatherState::Success(test_city(20.0)));
    }

    #[tokio::test]
    async fn unresolved_location_is_an_error() {
        let mut location = MockLocationProvider::new();
        location.expect_has_permission().returning(|| true);
        location.expect_current_location().returning(|| Ok(None));

        let mut get_weather = MockGetWeather::new();
        get_weather.expect_invoke().never();

        let controller = controller(get_weather, location, online());

        assert_eq!(controller.refresh().await, RefreshOutcome::Completed);
        assert_eq!(
            controller.current_state(),
            WeatherState::Error(LOCATION_UNAVAILABLE.into())
        );
    }

    #[tokio::test]
    async fn permission_fault_is_reported() {
        let mut location = MockLocationProvider::new();
        location.expect_has_permission().returning(|| true);
        location
            .expect_current_location()
            .returning(|| Err(LocationError::PermissionDenied));

        let controller = controller(MockGetWeather::new(), location, online());

        controller.refresh().await;
        assert_eq!(
            controller.current_state(),
            WeatherState::Error(PERMISSION_NOT_GRANTED.into())
        );
    }

    #[tokio::test]
    async fn location_service_fault_is_reported_as_unavailable() {
        let mut location = MockLocationProvider::new();
        location.expect_has_permission().returning(|| true);
        location
            .expect_current_location()
            .returning(|| Err(LocationError::Service("gps off".into())));

        let controller = controller(MockGetWeather::new(), location, online());

        controller.refresh().await;
        assert_eq!(
            controller.current_state(),
            WeatherState::Error(LOCATION_UNAVAILABLE.into())
        );
    }

    #[tokio::test]
    async fn coordinates_are_overwritten_on_each_resolution() {
        let mut location = MockLocationProvider::new();
        location.expect_has_permission().returning(|| true);
        let mut calls = 0;
        location.expect_current_location().returning(move || {
            calls += 1;
            Ok(Some(Coordinates::new(calls as f64, 0.0)))
        });

        let mut get_weather = MockGetWeather::new();
        get_weather
            .expect_invoke()
            .times(2)
            .returning(|_, _| Ok(test_city(20.0)));

        let controller = controller(get_weather, location, online());

        controller.refresh().await;
        controller.refresh().await;

        assert_eq!(
            *controller.coordinates().borrow(),
            Some(Coordinates::new(2.0, 0.0))
        );
    }
}
