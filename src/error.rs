use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GeoJSON error: {0}")]
    GeoJson(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),
    #[error("Cannot tell whether coordinates are lng,lat or lat,lng")]
    AmbiguousCoordinateOrder,
    #[error(transparent)]
    Core(#[from] plotnav_core::Error),
}
