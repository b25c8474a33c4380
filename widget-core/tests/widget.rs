//! End-to-end widget flows against a mock OpenWeather server.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use widget_core::provider::openweather::OpenWeatherProvider;
use widget_core::{
    CityDirectory, Coordinates, FetchError, Field, FixedPosition, GeolocationError,
    LocationSource, PanelSnapshot, Theme, UiState, Widget, WidgetError,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEATHER_PATH: &str = "/data/2.5/weather";

const BUSAN: Coordinates = Coordinates {
    latitude: 35.1,
    longitude: 129.04,
};

#[derive(Debug)]
struct DeniedLocation;

#[async_trait]
impl LocationSource for DeniedLocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Denied)
    }
}

/// Refuses access only after a while, like a permission prompt left open.
#[derive(Debug)]
struct SlowDeniedLocation;

#[async_trait]
impl LocationSource for SlowDeniedLocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Err(GeolocationError::Denied)
    }
}

fn body(name: &str, temp: f64, main: &str, description: &str, wind: f64) -> serde_json::Value {
    serde_json::json!({
        "main": { "temp": temp },
        "weather": [{ "description": description, "main": main }],
        "wind": { "speed": wind },
        "name": name
    })
}

fn busan_body() -> serde_json::Value {
    body("Busan", 18.2, "Clouds", "구름 조금", 5.0)
}

fn widget_with(server: &MockServer, locator: Box<dyn LocationSource>) -> Widget<PanelSnapshot> {
    let directory = Arc::new(CityDirectory::korean());
    let provider = OpenWeatherProvider::builder("TEST_KEY".to_string(), Arc::clone(&directory))
        .base_url(format!("{}{}", server.uri(), WEATHER_PATH))
        .build()
        .expect("client builds");

    Widget::new(directory, Box::new(provider), locator, PanelSnapshot::default())
}

fn widget(server: &MockServer) -> Widget<PanelSnapshot> {
    widget_with(server, Box::new(FixedPosition(BUSAN)))
}

async fn mount_city(server: &MockServer, city: &str, response: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", city))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}

async fn mount_seoul(server: &MockServer) {
    mount_city(server, "Seoul", body("Seoul", 23.7, "Clear", "맑음", 2.0)).await;
}

async fn mount_not_found(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Nonexistentville"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({ "cod": "404" })),
        )
        .mount(server)
        .await;
}

async fn mount_busan_coordinates(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("lat", "35.1"))
        .and(query_param("lon", "129.04"))
        .respond_with(ResponseTemplate::new(status).set_body_json(busan_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn starts_with_placeholder() {
    let server = MockServer::start().await;
    let widget = widget(&server);

    assert_eq!(widget.state(), UiState::Default);
    assert!(widget.reading().is_none());
    assert_eq!(widget.surface().text(Field::City), Some("--"));
    assert_eq!(widget.surface().text(Field::Temperature), Some("--°C"));
}

#[tokio::test]
async fn korean_input_is_queried_in_english_and_shown_in_korean() {
    let server = MockServer::start().await;
    mount_seoul(&server).await;
    let widget = widget(&server);

    widget.submit("서울").await.expect("lookup succeeds");

    assert_eq!(widget.state(), UiState::Loaded);
    let panel = widget.surface();
    assert_eq!(panel.text(Field::City), Some("서울"));
    assert_eq!(panel.text(Field::Temperature), Some("24°C"));
    assert_eq!(panel.text(Field::Wind), Some("바람: 7km/h"));
    assert_eq!(panel.text(Field::Condition), Some("맑음"));
    assert!(!panel.loading);
    assert!(matches!(panel.theme, Some(Theme::DayClear | Theme::NightClear)));
    assert!(panel.notifications.is_empty());
}

#[tokio::test]
async fn english_input_is_shown_in_korean() {
    let server = MockServer::start().await;
    mount_seoul(&server).await;
    let widget = widget(&server);

    widget.submit("  Seoul ").await.unwrap();

    assert_eq!(widget.surface().text(Field::City), Some("서울"));
}

#[tokio::test]
async fn blank_input_does_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let widget = widget(&server);

    widget.submit("   ").await.unwrap();

    assert_eq!(widget.state(), UiState::Default);
}

#[tokio::test]
async fn unknown_city_keeps_previous_reading() {
    let server = MockServer::start().await;
    mount_seoul(&server).await;
    mount_not_found(&server).await;
    let widget = widget(&server);

    widget.submit("서울").await.unwrap();
    let before = widget.reading();

    let err = widget.submit("Nonexistentville").await.unwrap_err();

    assert!(matches!(err, WidgetError::Fetch(_)));
    assert_eq!(widget.reading(), before);
    assert_eq!(widget.state(), UiState::Loaded);

    let panel = widget.surface();
    assert_eq!(panel.text(Field::City), Some("서울"));
    assert_eq!(panel.notifications, vec!["도시를 찾을 수 없습니다."]);
    assert!(!panel.loading);
}

#[tokio::test]
async fn failure_from_default_stays_default() {
    let server = MockServer::start().await;
    mount_not_found(&server).await;
    let widget = widget(&server);

    assert!(widget.submit("Nonexistentville").await.is_err());

    assert_eq!(widget.state(), UiState::Default);
    assert_eq!(widget.surface().text(Field::City), Some("--"));
}

#[tokio::test]
async fn search_lists_candidates_and_selection_fetches_canonical_name() {
    let server = MockServer::start().await;
    mount_city(&server, "Daejeon", body("Daejeon", 20.4, "Rain", "비", 3.0)).await;
    let widget = widget(&server);

    widget.type_query("대");
    assert_eq!(
        widget.surface().results,
        Some(vec!["대구 (Daegu)".to_string(), "대전 (Daejeon)".to_string()])
    );

    widget.select_candidate(1).await.expect("lookup succeeds");

    let panel = widget.surface();
    assert_eq!(panel.input, "대전");
    assert!(!panel.results_visible());
    assert_eq!(panel.text(Field::City), Some("대전"));
    assert_eq!(panel.text(Field::Temperature), Some("20°C"));
    assert_eq!(panel.theme, Some(Theme::Rainy));
}

#[tokio::test]
async fn unknown_search_offers_the_raw_input() {
    let server = MockServer::start().await;
    mount_city(&server, "Tokyo", body("Tokyo", 12.0, "Snow", "눈", 1.0)).await;
    let widget = widget(&server);

    widget.type_query(" Tokyo ");
    assert_eq!(widget.surface().results, Some(vec!["Tokyo".to_string()]));

    widget.select_candidate(0).await.unwrap();

    assert_eq!(widget.surface().text(Field::City), Some("Tokyo"));
    assert_eq!(widget.surface().theme, Some(Theme::Snow));
}

#[tokio::test]
async fn clearing_or_clicking_away_hides_results() {
    let server = MockServer::start().await;
    let widget = widget(&server);

    widget.type_query("부");
    assert!(widget.surface().results_visible());

    widget.dismiss_results();
    assert!(!widget.surface().results_visible());

    widget.type_query("부");
    widget.type_query("  ");
    assert!(!widget.surface().results_visible());
    assert_eq!(widget.state(), UiState::Default);
}

#[tokio::test]
async fn out_of_range_selection_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let widget = widget(&server);

    widget.type_query("서");
    widget.select_candidate(3).await.unwrap();

    assert_eq!(widget.state(), UiState::Default);
}

#[tokio::test]
async fn location_toggle_activates_then_resets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("lat", "35.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(busan_body()))
        .expect(1)
        .mount(&server)
        .await;
    let widget = widget(&server);

    widget.toggle_location().await.expect("location lookup succeeds");

    assert_eq!(widget.state(), UiState::LocationActive);
    assert!(widget.is_location_active());
    {
        let panel = widget.surface();
        assert!(panel.location_active);
        assert_eq!(panel.text(Field::City), Some("부산"));
        assert_eq!(panel.text(Field::Wind), Some("바람: 18km/h"));
        assert_eq!(panel.theme, Some(Theme::Cloudy));
    }

    widget.toggle_location().await.unwrap();

    assert_eq!(widget.state(), UiState::Default);
    assert!(!widget.is_location_active());
    let panel = widget.surface();
    assert!(!panel.location_active);
    assert_eq!(panel.text(Field::City), Some("--"));
}

#[tokio::test]
async fn denied_location_renders_placeholder() {
    let server = MockServer::start().await;
    mount_seoul(&server).await;
    let widget = widget_with(&server, Box::new(DeniedLocation));

    widget.submit("서울").await.unwrap();
    let err = widget.toggle_location().await.unwrap_err();

    assert!(matches!(err, WidgetError::Geolocation(GeolocationError::Denied)));
    assert_eq!(widget.state(), UiState::Default);
    assert!(!widget.is_location_active());

    let panel = widget.surface();
    assert_eq!(panel.text(Field::City), Some("--"));
    assert!(!panel.location_active);
    assert_eq!(panel.notifications.len(), 1);
}

#[tokio::test]
async fn failed_location_fetch_stays_manual() {
    let server = MockServer::start().await;
    mount_seoul(&server).await;
    mount_busan_coordinates(&server, 500).await;
    let widget = widget(&server);

    widget.submit("서울").await.unwrap();
    assert!(widget.toggle_location().await.is_err());

    assert!(!widget.is_location_active());
    assert_eq!(widget.state(), UiState::Default);
    assert_eq!(widget.surface().text(Field::City), Some("--"));
    assert!(!widget.surface().location_active);
}

#[tokio::test]
async fn manual_search_leaves_location_mode() {
    let server = MockServer::start().await;
    mount_seoul(&server).await;
    mount_busan_coordinates(&server, 200).await;
    let widget = widget(&server);

    widget.toggle_location().await.unwrap();
    widget.submit("서울").await.unwrap();

    assert_eq!(widget.state(), UiState::Loaded);
    assert!(!widget.is_location_active());
    assert!(!widget.surface().location_active);
}

#[tokio::test]
async fn refresh_without_a_lookup_notifies() {
    let server = MockServer::start().await;
    let widget = widget(&server);

    let err = widget.refresh().await.unwrap_err();

    assert!(matches!(err, WidgetError::NothingToRefresh));
    assert_eq!(widget.surface().notifications, vec!["새로고침할 날씨 정보가 없습니다."]);
}

#[tokio::test]
async fn refresh_repeats_the_last_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Seoul"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(body("Seoul", 23.7, "Clear", "맑음", 2.0)),
        )
        .expect(2)
        .mount(&server)
        .await;
    let widget = widget(&server);

    widget.submit("서울").await.unwrap();
    widget.refresh().await.unwrap();

    assert_eq!(widget.surface().text(Field::City), Some("서울"));
}

#[tokio::test]
async fn refresh_in_location_mode_uses_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("lat", "35.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(busan_body()))
        .expect(2)
        .mount(&server)
        .await;
    let widget = widget(&server);

    widget.toggle_location().await.unwrap();
    widget.refresh().await.unwrap();

    assert_eq!(widget.state(), UiState::LocationActive);
}

#[tokio::test]
async fn stale_response_does_not_overwrite_newer_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Busan"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(busan_body())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount_seoul(&server).await;
    let widget = widget(&server);

    let (slow, fast) = tokio::join!(widget.submit("부산"), widget.submit("서울"));

    assert!(slow.is_ok());
    assert!(fast.is_ok());
    assert_eq!(widget.state(), UiState::Loaded);
    assert_eq!(widget.reading().map(|r| r.display_city_name), Some("서울".to_string()));
    assert_eq!(widget.surface().text(Field::City), Some("서울"));
    assert!(!widget.surface().loading);
}

#[tokio::test]
async fn reset_discards_in_flight_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body("Seoul", 23.7, "Clear", "맑음", 2.0))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let widget = widget(&server);

    let (lookup, ()) = tokio::join!(widget.submit("서울"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(widget.state(), UiState::Loading);
        widget.reset();
        assert_eq!(widget.state(), UiState::Default);
    });

    assert!(lookup.is_ok());
    assert_eq!(widget.state(), UiState::Default);
    assert!(widget.reading().is_none());
    assert_eq!(widget.surface().text(Field::City), Some("--"));
    assert!(!widget.surface().loading);
}

#[tokio::test]
async fn malformed_body_keeps_previous_reading() {
    let server = MockServer::start().await;
    mount_seoul(&server).await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Busan"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;
    let widget = widget(&server);

    widget.submit("서울").await.unwrap();
    let before = widget.reading();

    let err = widget.submit("부산").await.unwrap_err();

    assert!(matches!(err, WidgetError::Fetch(FetchError::Network(_))));
    assert_eq!(widget.reading(), before);
    assert_eq!(widget.state(), UiState::Loaded);

    let panel = widget.surface();
    assert_eq!(panel.text(Field::City), Some("서울"));
    assert_eq!(panel.notifications, vec!["날씨 정보를 가져오는데 실패했습니다."]);
    assert!(!panel.loading);
}

#[tokio::test]
async fn late_location_failure_leaves_newer_lookup_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Seoul"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body("Seoul", 23.7, "Clear", "맑음", 2.0))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let widget = widget_with(&server, Box::new(SlowDeniedLocation));

    let (toggle, lookup) = tokio::join!(widget.toggle_location(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        widget.submit("서울").await
    });

    assert!(matches!(toggle, Err(WidgetError::Geolocation(GeolocationError::Denied))));
    assert!(lookup.is_ok());
    assert_eq!(widget.state(), UiState::Loaded);
    assert!(!widget.is_location_active());
    assert_eq!(widget.reading().map(|r| r.display_city_name), Some("서울".to_string()));

    let panel = widget.surface();
    assert_eq!(panel.text(Field::City), Some("서울"));
    assert!(!panel.location_active);
    assert!(!panel.loading);
}

#[tokio::test]
async fn late_position_does_not_replace_newer_lookup() {
    let server = MockServer::start().await;
    mount_seoul(&server).await;
    mount_busan_coordinates(&server, 200).await;

    #[derive(Debug)]
    struct SlowPosition;

    #[async_trait]
    impl LocationSource for SlowPosition {
        async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(BUSAN)
        }
    }

    let widget = widget_with(&server, Box::new(SlowPosition));

    let (toggle, lookup) = tokio::join!(widget.toggle_location(), widget.submit("서울"));

    assert!(toggle.is_ok());
    assert!(lookup.is_ok());
    assert_eq!(widget.state(), UiState::Loaded);
    assert!(!widget.is_location_active());
    assert_eq!(widget.surface().text(Field::City), Some("서울"));
}
