use serde_json::{Value, json};

use crate::form::{Callbacks, Form, FormError, Outcome};
use crate::payload::{Payload, value_kind};

/// Two-button dialog. The reply is `true` when the first button was pressed.
pub struct ModalForm<S> {
    title: String,
    content: String,
    button1: String,
    button2: String,
    callbacks: Callbacks<S, bool>,
}

impl<S> ModalForm<S> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            button1: String::new(),
            button2: String::new(),
            callbacks: Callbacks::default(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_button1(mut self, text: impl Into<String>) -> Self {
        self.button1 = text.into();
        self
    }

    pub fn with_button2(mut self, text: impl Into<String>) -> Self {
        self.button2 = text.into();
        self
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&S, bool) + Send + 'static,
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

    pub fn decode(&self, payload: Payload) -> Result<Outcome<bool>, FormError> {
        match payload {
            Payload::Cancelled => Ok(Outcome::Closed),
            Payload::Reply(Value::Bool(first)) => Ok(Outcome::Submitted(first)),
            Payload::Reply(other) => Err(FormError::NotABoolean {
                found: value_kind(&other),
            }),
        }
    }
}

impl<S> Form<S> for ModalForm<S> {
    fn render(&self) -> Value {
        json!({
            "type": "modal",
            "title": self.title,
            "content": self.content,
            "button1": self.button1,
            "button2": self.button2,
        })
    }

    fn submit(&mut self, session: &S, payload: Payload) -> Result<(), FormError> {
        let outcome = self.decode(payload);
        self.callbacks.dispatch("modal", &self.title, session, outcome)
    }
}
