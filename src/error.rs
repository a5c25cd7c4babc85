use std::path::PathBuf;

/// Result type alias for fatal, run-aborting failures
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error types. Anything here stops a run before output is written.
#[derive(Debug)]
pub enum Error {
    ConfigRead { path: PathBuf, source: std::io::Error },
    ConfigParse { path: PathBuf, message: String },
    MissingField(&'static str),
    InvalidPattern { field: &'static str, message: String },
    InvalidConfig(String),
    SectorsDirUnreadable { path: PathBuf, message: String },
    NoSectors(PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::ConfigRead { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            Error::ConfigParse { path, message } => {
                write!(f, "failed to parse config {}: {}", path.display(), message)
            }
            Error::MissingField(field) => write!(f, "missing required config field `{}`", field),
            Error::InvalidPattern { field, message } => {
                write!(f, "invalid pattern in `{}`: {}", field, message)
            }
            Error::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            Error::SectorsDirUnreadable { path, message } => {
                write!(f, "cannot read sectors directory {}: {}", path.display(), message)
            }
            Error::NoSectors(path) => write!(
                f,
                "no sectors with endpoints found under {}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ConfigRead { source, .. } => Some(source),
            _ => None,
        }
    }
}
