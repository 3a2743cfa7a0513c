//! Form containers and the transport-facing [`Form`] trait.
//!
//! Containers are assembled with consuming `with_*` builders and then handed
//! to the transport, which calls [`Form::render`] once and [`Form::submit`]
//! when the reply arrives. `submit` takes `&mut self`, so a container serves
//! at most one decode at a time; the transport owns that guarantee across
//! sessions.

pub mod custom;
pub mod menu;
pub mod modal;

pub use custom::CustomForm;
pub use menu::MenuForm;
pub use modal::ModalForm;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::element::DecodeError;
use crate::payload::Payload;

/// Submission failures. None of them invoke a callback.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("malformed reply payload: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("expected a list of {expected} values, got {found}")]
    NotAList {
        expected: usize,
        found: &'static str,
    },
    #[error("expected {expected} elements, got {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("failed to parse element {key}: {source}")]
    Element {
        key: String,
        #[source]
        source: DecodeError,
    },
    #[error("failed to parse button index as int: {found}")]
    NotAnIndex { found: String },
    #[error("button index out of bounds: {index} (buttons: {len})")]
    ButtonOutOfRange { index: i128, len: usize },
    #[error("expected a boolean modal reply, got {found}")]
    NotABoolean { found: &'static str },
}

/// Coarse grouping of [`FormError`] for callers that only care about the
/// failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Shape,
    TypeMismatch,
    Range,
}

impl FormError {
    pub fn class(&self) -> ErrorClass {
        match self {
            FormError::Malformed(_)
            | FormError::NotAList { .. }
            | FormError::LengthMismatch { .. }
            | FormError::NotAnIndex { .. } => ErrorClass::Shape,
            FormError::NotABoolean { .. } => ErrorClass::TypeMismatch,
            FormError::ButtonOutOfRange { .. } => ErrorClass::Range,
            FormError::Element { source, .. } => match source {
                DecodeError::TypeMismatch { .. } | DecodeError::NotIntegral { .. } => {
                    ErrorClass::TypeMismatch
                }
                DecodeError::IndexOutOfRange { .. } | DecodeError::ValueOutOfRange { .. } => {
                    ErrorClass::Range
                }
            },
        }
    }

    /// Key of the element that failed, for per-element errors.
    pub fn key(&self) -> Option<&str> {
        match self {
            FormError::Element { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Result of decoding a reply without dispatching it.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Closed,
    Submitted(T),
}

pub type SubmitFn<S, T> = Box<dyn FnMut(&S, T) + Send>;
pub type CloseFn<S> = Box<dyn FnMut(&S) + Send>;

/// The two operations the transport layer needs from any form.
pub trait Form<S> {
    /// Schema document sent to the client.
    fn render(&self) -> Value;

    /// Decode `payload` and invoke the submit or close callback.
    fn submit(&mut self, session: &S, payload: Payload) -> Result<(), FormError>;

    /// Classify raw wire bytes (`None` when the client sent nothing) and
    /// submit them.
    fn submit_json(&mut self, session: &S, data: Option<&[u8]>) -> Result<(), FormError> {
        let payload = Payload::from_bytes(data)?;
        self.submit(session, payload)
    }
}

pub(crate) struct Callbacks<S, T> {
    on_submit: Option<SubmitFn<S, T>>,
    on_close: Option<CloseFn<S>>,
}

impl<S, T> Default for Callbacks<S, T> {
    fn default() -> Self {
        Self {
            on_submit: None,
            on_close: None,
        }
    }
}

impl<S, T> Callbacks<S, T> {
    pub(crate) fn set_submit(&mut self, callback: SubmitFn<S, T>) {
        self.on_submit = Some(callback);
    }

    pub(crate) fn set_close(&mut self, callback: CloseFn<S>) {
        self.on_close = Some(callback);
    }

    pub(crate) fn dispatch(
        &mut self,
        kind: &'static str,
        title: &str,
        session: &S,
        outcome: Result<Outcome<T>, FormError>,
    ) -> Result<(), FormError> {
        match outcome {
            Ok(Outcome::Closed) => {
                debug!(form = kind, title, "form closed by client");
                if let Some(on_close) = self.on_close.as_mut() {
                    on_close(session);
                }
                Ok(())
            }
            Ok(Outcome::Submitted(result)) => {
                match self.on_submit.as_mut() {
                    Some(on_submit) => {
                        debug!(form = kind, title, "form submitted");
                        on_submit(session, result);
                    }
                    None => debug!(form = kind, title, "form submitted without a callback"),
                }
                Ok(())
            }
            Err(err) => {
                warn!(form = kind, title, error = %err, "rejected form reply");
                Err(err)
            }
        }
    }
}
