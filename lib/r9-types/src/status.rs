/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    InvalidArgument,
    NotFound,
    DeadlineExceeded,
    Unavailable,
    Internal,
}

impl StatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            StatusCode::Unavailable => "UNAVAILABLE",
            StatusCode::Internal => "INTERNAL",
        }
    }
}

/// A status code plus a human readable description.
///
/// The ok value carries no description. A non-ok status is the error half of
/// [`StatusOr`] and of resolution error delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    code: StatusCode,
    message: String,
}

impl Status {
    pub fn ok() -> Self {
        Status {
            code: StatusCode::Ok,
            message: String::new(),
        }
    }

    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Status {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Status::new(StatusCode::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Status::new(StatusCode::NotFound, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Status::new(StatusCode::Unavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Status::new(StatusCode::Internal, message)
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok
    }

    #[inline]
    pub fn code(&self) -> StatusCode {
        self.code
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code.as_str())
        } else {
            write!(f, "{}: {}", self.code.as_str(), self.message)
        }
    }
}

impl std::error::Error for Status {}

/// Exactly one of a value or a non-ok [`Status`].
///
/// The error variant can not be constructed from an ok status, so a reader
/// observing no value always gets a usable error description.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusOr<T>(Inner<T>);

#[derive(Clone, Debug, PartialEq)]
enum Inner<T> {
    Value(T),
    Error(Status),
}

impl<T> StatusOr<T> {
    pub fn from_value(value: T) -> Self {
        StatusOr(Inner::Value(value))
    }

    /// # Panics
    ///
    /// Panics if `status` is ok. Building the error variant from an ok
    /// status is a programming error at the construction site.
    pub fn from_error(status: Status) -> Self {
        assert!(
            !status.is_ok(),
            "cannot build the error variant of StatusOr from an ok status"
        );
        StatusOr(Inner::Error(status))
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self.0, Inner::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match &self.0 {
            Inner::Value(v) => Some(v),
            Inner::Error(_) => None,
        }
    }

    pub fn status(&self) -> Option<&Status> {
        match &self.0 {
            Inner::Value(_) => None,
            Inner::Error(s) => Some(s),
        }
    }

    pub fn into_result(self) -> Result<T, Status> {
        match self.0 {
            Inner::Value(v) => Ok(v),
            Inner::Error(s) => Err(s),
        }
    }
}

impl<T> From<Result<T, Status>> for StatusOr<T> {
    fn from(r: Result<T, Status>) -> Self {
        match r {
            Ok(v) => StatusOr::from_value(v),
            Err(s) => StatusOr::from_error(s),
        }
    }
}
