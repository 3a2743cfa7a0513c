use serde_json::{Value, json};

use crate::element::{Button, SchemaError};
use crate::form::{Callbacks, Form, FormError, Outcome};
use crate::payload::{Payload, as_index};

/// A list of buttons; the reply is the index of the pressed one.
pub struct MenuForm<S> {
    title: String,
    content: String,
    buttons: Vec<Button>,
    callbacks: Callbacks<S, usize>,
}

impl<S> MenuForm<S> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            buttons: Vec::new(),
            callbacks: Callbacks::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Accepts a [`Button`] or plain text.
    pub fn with_button(mut self, button: impl Into<Button>) -> Self {
        self.buttons.push(button.into());
        self
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&S, usize) + Send + 'static,
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

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn check(&self) -> Result<(), SchemaError> {
        if self.buttons.is_empty() {
            return Err(SchemaError::NoButtons);
        }
        Ok(())
    }

    pub fn decode(&self, payload: Payload) -> Result<Outcome<usize>, FormError> {
        let Payload::Reply(reply) = payload else {
            return Ok(Outcome::Closed);
        };
        let index = match &reply {
            Value::Number(number) => as_index(number),
            _ => None,
        };
        let Some(index) = index else {
            return Err(FormError::NotAnIndex {
                found: reply.to_string(),
            });
        };
        if index < 0 || index >= self.buttons.len() as i128 {
            return Err(FormError::ButtonOutOfRange {
                index,
                len: self.buttons.len(),
            });
        }
        Ok(Outcome::Submitted(index as usize))
    }
}

impl<S> Form<S> for MenuForm<S> {
    fn render(&self) -> Value {
        let buttons = self.buttons.iter().map(Button::render).collect::<Vec<_>>();
        json!({
            "type": "form",
            "title": self.title,
            "content": self.content,
            "buttons": buttons,
        })
    }

    fn submit(&mut self, session: &S, payload: Payload) -> Result<(), FormError> {
        let outcome = self.decode(payload);
        self.callbacks.dispatch("form", &self.title, session, outcome)
    }
}
