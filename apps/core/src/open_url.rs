use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    EmptyUrl,
    Spawn(String),
}

impl Display for OpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "empty url"),
            Self::Spawn(detail) => write!(f, "failed to open url: {detail}"),
        }
    }
}

impl std::error::Error for OpenError {}

/// Host primitive that actually opens a URL. Activation delegates here after
/// recording the frequency increment; tests install a recording fake.
pub trait UrlOpener: Send + Sync {
    fn open_url(&self, url: &str) -> Result<(), OpenError>;
}

/// Opens URLs through the platform handler.
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open_url(&self, url: &str) -> Result<(), OpenError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(OpenError::EmptyUrl);
        }
        spawn_opener(trimmed)
    }
}

#[cfg(target_os = "windows")]
fn spawn_opener(url: &str) -> Result<(), OpenError> {
    std::process::Command::new("cmd")
        .args(["/C", "start", "", url])
        .spawn()
        .map(|_| ())
        .map_err(|e| OpenError::Spawn(e.to_string()))
}

#[cfg(target_os = "macos")]
fn spawn_opener(url: &str) -> Result<(), OpenError> {
    std::process::Command::new("open")
        .arg(url)
        .spawn()
        .map(|_| ())
        .map_err(|e| OpenError::Spawn(e.to_string()))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn spawn_opener(url: &str) -> Result<(), OpenError> {
    std::process::Command::new("xdg-open")
        .arg(url)
        .spawn()
        .map(|_| ())
        .map_err(|e| OpenError::Spawn(e.to_string()))
}
