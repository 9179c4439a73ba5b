//! Conversions from external infrastructure errors into domain errors.

use quick_xml::se::SeError as XmlError;
use reqwest::Error as HttpError;
use scratchforce_domain::ForceError;
use serde_json::Error as JsonError;
use zip::result::ZipError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ForceError);

impl From<InfraError> for ForceError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ForceError> for InfraError {
    fn from(value: ForceError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoForceError {
    fn into_force(self) -> ForceError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ForceError */
/* -------------------------------------------------------------------------- */

impl IntoForceError for HttpError {
    fn into_force(self) -> ForceError {
        if self.is_timeout() {
            return ForceError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return ForceError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => ForceError::Auth(message),
                429 => ForceError::Network(message),
                400..=499 => ForceError::InvalidInput(message),
                _ => ForceError::Network(message),
            };
        }

        if self.is_decode() {
            return ForceError::Internal(format!("Failed to decode HTTP response: {self}"));
        }

        ForceError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_force())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → ForceError */
/* -------------------------------------------------------------------------- */

impl IntoForceError for JsonError {
    fn into_force(self) -> ForceError {
        ForceError::Internal(format!("Unexpected JSON payload: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_force())
    }
}

/* -------------------------------------------------------------------------- */
/* zip / xml / io → ForceError */
/* -------------------------------------------------------------------------- */

impl IntoForceError for ZipError {
    fn into_force(self) -> ForceError {
        match self {
            ZipError::Io(err) => ForceError::Archive(format!("archive I/O failure: {err}")),
            other => ForceError::Archive(other.to_string()),
        }
    }
}

impl From<ZipError> for InfraError {
    fn from(value: ZipError) -> Self {
        InfraError(value.into_force())
    }
}

impl IntoForceError for XmlError {
    fn into_force(self) -> ForceError {
        ForceError::Archive(format!("failed to render metadata XML: {self}"))
    }
}

impl From<XmlError> for InfraError {
    fn from(value: XmlError) -> Self {
        InfraError(value.into_force())
    }
}

impl IntoForceError for std::io::Error {
    fn into_force(self) -> ForceError {
        ForceError::Archive(format!("archive I/O failure: {self}"))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_force())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
