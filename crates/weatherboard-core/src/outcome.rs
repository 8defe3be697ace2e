//! Two-variant outcome returned by every use case.

use crate::error::AppError;

/// Result of one use-case invocation.
///
/// Callers branch on the variant (or use the inspection helpers) instead of
/// propagating the error with `?`.
#[derive(Debug)]
#[must_use]
pub enum Outcome<T> {
    Success(T),
    Failure(AppError),
}

impl<T> Outcome<T> {
    /// Run `action` on the payload of a success; returns `self` unchanged.
    pub fn on_success(self, action: impl FnOnce(&T)) -> Self {
        if let Outcome::Success(data) = &self {
            action(data);
        }
        self
    }

    /// Run `action` on the error of a failure; returns `self` unchanged.
    pub fn on_failure(self, action: impl FnOnce(&AppError)) -> Self {
        if let Outcome::Failure(error) = &self {
            action(error);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Success(data) => Some(data),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Outcome::Success(data) => Some(data),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_error(self) -> Option<AppError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(data) => Outcome::Success(f(data)),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }
}

impl<T> From<Result<T, AppError>> for Outcome<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Outcome::Success(data),
            Err(error) => Outcome::Failure(error),
        }
    }
}

impl<T> From<Outcome<T>> for Result<T, AppError> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Outcome::Success(data) => Ok(data),
            Outcome::Failure(error) => Err(error),
        }
    }
}
