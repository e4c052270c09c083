//! Error taxonomy shared by the facade and every backend.
//!
//! Two tiers:
//! - domain codes (`MeshData*`, `MeshNotCreated`) are detected before any
//!   native call and are fully deterministic
//! - [`RenderError::Internal`] is the single bucket for anything below the
//!   facade; the detail is logged, never encoded in the error value

use thiserror::Error;

use crate::backend::BackendError;

/// Flat result code, one per outcome of a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError,
    InternalError,
    MeshDataBroken,
    MeshDataAttribOverflow,
    MeshDataLengthError,
    MeshNotCreated,
}

impl ErrorCode {
    pub fn is_ok(self) -> bool {
        self == ErrorCode::NoError
    }

    /// Convert back into a `RenderResult`.
    pub fn into_result(self) -> RenderResult<()> {
        match self {
            ErrorCode::NoError => Ok(()),
            ErrorCode::InternalError => Err(RenderError::Internal),
            ErrorCode::MeshDataBroken => Err(RenderError::MeshDataBroken),
            ErrorCode::MeshDataAttribOverflow => Err(RenderError::MeshDataAttribOverflow),
            ErrorCode::MeshDataLengthError => Err(RenderError::MeshDataLengthError),
            ErrorCode::MeshNotCreated => Err(RenderError::MeshNotCreated),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::NoError => "NoError",
            ErrorCode::InternalError => "InternalError",
            ErrorCode::MeshDataBroken => "MeshDataBroken",
            ErrorCode::MeshDataAttribOverflow => "MeshDataAttribOverflow",
            ErrorCode::MeshDataLengthError => "MeshDataLengthError",
            ErrorCode::MeshNotCreated => "MeshNotCreated",
        };
        f.write_str(name)
    }
}

/// Failure of a facade operation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderError {
    #[error("internal backend error")]
    Internal,
    #[error("mesh data is broken")]
    MeshDataBroken,
    #[error("mesh data attribute capacity exceeded")]
    MeshDataAttribOverflow,
    #[error("mesh data length does not match vertex layout")]
    MeshDataLengthError,
    #[error("mesh has no uploaded data")]
    MeshNotCreated,
}

impl RenderError {
    pub fn code(self) -> ErrorCode {
        match self {
            RenderError::Internal => ErrorCode::InternalError,
            RenderError::MeshDataBroken => ErrorCode::MeshDataBroken,
            RenderError::MeshDataAttribOverflow => ErrorCode::MeshDataAttribOverflow,
            RenderError::MeshDataLengthError => ErrorCode::MeshDataLengthError,
            RenderError::MeshNotCreated => ErrorCode::MeshNotCreated,
        }
    }
}

/// Backend failures have no dedicated code: log the detail, surface `Internal`.
impl From<BackendError> for RenderError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::MeshNotCreated(_) => RenderError::MeshNotCreated,
            other => {
                log::error!("{}", other);
                RenderError::Internal
            }
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

impl<T> From<&RenderResult<T>> for ErrorCode {
    fn from(result: &RenderResult<T>) -> Self {
        match result {
            Ok(_) => ErrorCode::NoError,
            Err(err) => err.code(),
        }
    }
}

impl From<RenderError> for ErrorCode {
    fn from(err: RenderError) -> Self {
        err.code()
    }
}
