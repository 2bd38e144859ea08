use thiserror::Error;

/// Domain failures the viewer matches on. Everything here is local and
/// recoverable; a missing container degrades the section, it never tears
/// down the page.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("render container '{0}' not found")]
    MissingContainer(String),
    #[error("section '{0}' has no catalog entries")]
    EmptySection(String),
}
