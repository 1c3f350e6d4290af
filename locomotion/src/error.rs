use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring or constructing a character controller.
///
/// Per-tick simulation never fails; these only surface at setup time.
#[derive(Debug, Error)]
pub enum LocomotionError {
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("invalid setting `{name}` = {value}: {reason}")]
    InvalidSetting {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },

    #[error("failed to read settings from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings from {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
