use std::error::Error;

use thiserror::Error;

/// An error the UI has already shown; callers skip printing it again.
#[derive(Debug, Error)]
#[error("{inner}")]
pub struct SilentError {
    #[source]
    inner: Box<dyn Error + Send + Sync + 'static>,
}

impl SilentError {
    pub fn new(inner: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self {
            inner: inner.into(),
        }
    }
}

/// Whether `error` or anything in its source chain is a [`SilentError`].
#[must_use]
pub fn is_silent(error: &(dyn Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(error) = current {
        if error.is::<SilentError>() {
            return true;
        }
        current = error.source();
    }
    false
}
