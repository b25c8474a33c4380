use thiserror::Error;

/// Failure of a single weather request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider answered with a non-2xx status.
    #[error("weather provider rejected the request with status {status}")]
    CityNotFound { status: u16 },

    /// Transport failure or a response body that could not be understood.
    #[error("weather request failed: {0}")]
    Network(String),
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::CityNotFound { .. } => "도시를 찾을 수 없습니다.",
            FetchError::Network(_) => "날씨 정보를 가져오는데 실패했습니다.",
        }
    }
}

#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("location access was denied")]
    Denied,

    #[error("location is unavailable: {0}")]
    Unavailable(String),
}

impl GeolocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::Denied => "위치 정보 접근이 거부되었습니다.",
            GeolocationError::Unavailable(_) => "위치 정보를 가져올 수 없습니다.",
        }
    }
}

/// Anything that can end a user action on the widget.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error("there is no previous lookup to refresh")]
    NothingToRefresh,
}

impl WidgetError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WidgetError::Fetch(e) => e.user_message(),
            WidgetError::Geolocation(e) => e.user_message(),
            WidgetError::NothingToRefresh => "새로고침할 날씨 정보가 없습니다.",
        }
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("city name '{0}' is already in the directory")]
    Duplicate(String),
}
