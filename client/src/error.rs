use thiserror::Error;

/// Why the overlay failed to come up. Every variant is terminal for the page load.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("host editor did not signal readiness within {0} ms")]
    ReadyTimeout(u32),
    #[error("required page capability `{0}` is missing")]
    MissingCapability(&'static str),
    #[error("sidebar tab registration failed: {0}")]
    TabRegistration(String),
    #[error("settings pane never attached to the document: {0}")]
    PaneDetached(String),
    #[error("host rejected a binding: {0}")]
    HostBinding(String),
    #[error("could not create the overlay map: {0}")]
    MapCreation(String),
    #[error("document is unavailable")]
    NoDocument,
}
