use std::collections::BTreeMap;

use serde_json::{Value, json};
use tracing::debug;

use crate::element::{Element, SchemaError};
use crate::form::{Callbacks, Form, FormError, Outcome};
use crate::payload::{Payload, value_kind};
use crate::response::Response;

struct Entry {
    /// `None` once a later registration reused the key.
    key: Option<String>,
    element: Element,
}

/// Keyed, ordered collection of elements. The reply is a JSON array with one
/// entry per registered element, in registration order.
pub struct CustomForm<S> {
    title: String,
    entries: Vec<Entry>,
    reused_keys: Vec<String>,
    callbacks: Callbacks<S, Response>,
}

impl<S> CustomForm<S> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
            reused_keys: Vec::new(),
            callbacks: Callbacks::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Appends `element`. Registering a key twice keeps both slots in the
    /// schema, but only the latest element feeds the response under that key.
    pub fn with_element(mut self, key: impl Into<String>, element: impl Into<Element>) -> Self {
        let key = key.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.key.as_deref() == Some(key.as_str()))
        {
            debug!(
                form = %self.title,
                key = %key,
                "element key registered again; earlier slot is shadowed"
            );
            entry.key = None;
            self.reused_keys.push(key.clone());
        }
        self.entries.push(Entry {
            key: Some(key),
            element: element.into(),
        });
        self
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&S, Response) + Send + 'static,
    {
        self.callbacks.set_submit(Box::new(callback));
        self
    }

    pub fn with_close_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&S) + Send + 'static,
    {
        self.callbacks.set_close(Box::new(callback));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of reply slots, shadowed ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn element(&self, key: &str) -> Option<&Element> {
        self.entries
            .iter()
            .find(|entry| entry.key.as_deref() == Some(key))
            .map(|entry| &entry.element)
    }

    /// Builder-time validation: keys are unique and every element is
    /// well-formed.
    pub fn check(&self) -> Result<(), SchemaError> {
        if let Some(key) = self.reused_keys.first() {
            return Err(SchemaError::DuplicateKey { key: key.clone() });
        }
        for entry in &self.entries {
            let Some(key) = &entry.key else {
                continue;
            };
            entry
                .element
                .check()
                .map_err(|source| SchemaError::InElement {
                    key: key.clone(),
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }

    /// Decode without invoking callbacks. Elements are decoded in
    /// registration order and the first failure aborts the whole reply.
    pub fn decode(&self, payload: Payload) -> Result<Outcome<Response>, FormError> {
        let Payload::Reply(reply) = payload else {
            return Ok(Outcome::Closed);
        };
        let values = match reply {
            Value::Array(values) => values,
            other => {
                return Err(FormError::NotAList {
                    expected: self.entries.len(),
                    found: value_kind(&other),
                });
            }
        };
        if values.len() != self.entries.len() {
            return Err(FormError::LengthMismatch {
                expected: self.entries.len(),
                found: values.len(),
            });
        }

        let mut decoded = BTreeMap::new();
        for (entry, raw) in self.entries.iter().zip(&values) {
            let Some(key) = &entry.key else {
                continue;
            };
            let value = entry
                .element
                .decode(raw)
                .map_err(|source| FormError::Element {
                    key: key.clone(),
                    source,
                })?;
            if let Some(value) = value {
                decoded.insert(key.clone(), value);
            }
        }
        Ok(Outcome::Submitted(Response::new(decoded)))
    }
}

impl<S> Form<S> for CustomForm<S> {
    fn render(&self) -> Value {
        let content = self
            .entries
            .iter()
            .map(|entry| entry.element.render())
            .collect::<Vec<_>>();
        json!({
            "type": "custom_form",
            "title": self.title,
            "content": content,
        })
    }

    fn submit(&mut self, session: &S, payload: Payload) -> Result<(), FormError> {
        let outcome = self.decode(payload);
        self.callbacks
            .dispatch("custom_form", &self.title, session, outcome)
    }
}
