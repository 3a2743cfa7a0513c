use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::element::{Button, Element, SchemaError};
use crate::form::{CustomForm, Form, FormError, MenuForm, ModalForm, Outcome};
use crate::payload::Payload;
use crate::response::Response;

/// A keyed element of a custom form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ElementDefinition {
    pub key: String,
    pub element: Element,
}

/// Declarative form document. The `"type"` tags match the rendered schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormDefinition {
    CustomForm {
        title: String,
        #[serde(default)]
        elements: Vec<ElementDefinition>,
    },
    #[serde(rename = "form")]
    Menu {
        title: String,
        #[serde(default)]
        content: String,
        #[serde(default)]
        buttons: Vec<Button>,
    },
    Modal {
        title: String,
        #[serde(default)]
        content: String,
        #[serde(default)]
        button1: String,
        #[serde(default)]
        button2: String,
    },
}

/// JSON Schema describing [`FormDefinition`] documents.
pub fn definition_schema() -> Value {
    serde_json::to_value(schema_for!(FormDefinition)).unwrap_or_else(|_| json!({}))
}

impl FormDefinition {
    pub fn title(&self) -> &str {
        match self {
            FormDefinition::CustomForm { title, .. }
            | FormDefinition::Menu { title, .. }
            | FormDefinition::Modal { title, .. } => title,
        }
    }

    pub fn check(&self) -> Result<(), SchemaError> {
        self.clone().build::<()>().check()
    }

    pub fn render(&self) -> Value {
        self.clone().build::<()>().render()
    }

    pub fn decode(&self, payload: Payload) -> Result<DecodedReply, FormError> {
        self.clone().build::<()>().decode(payload)
    }

    /// Build the container without callbacks; attach them through the
    /// variant's builder.
    pub fn build<S>(self) -> BuiltForm<S> {
        match self {
            FormDefinition::CustomForm { title, elements } => BuiltForm::Custom(
                elements
                    .into_iter()
                    .fold(CustomForm::new(title), |form, definition| {
                        form.with_element(definition.key, definition.element)
                    }),
            ),
            FormDefinition::Menu {
                title,
                content,
                buttons,
            } => BuiltForm::Menu(
                buttons
                    .into_iter()
                    .fold(MenuForm::new(title).with_content(content), |form, button| {
                        form.with_button(button)
                    }),
            ),
            FormDefinition::Modal {
                title,
                content,
                button1,
                button2,
            } => BuiltForm::Modal(
                ModalForm::new(title)
                    .with_content(content)
                    .with_button1(button1)
                    .with_button2(button2),
            ),
        }
    }
}

/// A container built from a [`FormDefinition`].
pub enum BuiltForm<S> {
    Custom(CustomForm<S>),
    Menu(MenuForm<S>),
    Modal(ModalForm<S>),
}

/// A decoded reply of any container kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedReply {
    Closed,
    Custom(Response),
    Menu(usize),
    Modal(bool),
}

impl DecodedReply {
    /// Plain JSON view of the submitted result; `null` when closed.
    pub fn to_value(&self) -> Value {
        match self {
            DecodedReply::Closed => Value::Null,
            DecodedReply::Custom(response) => response.to_value(),
            DecodedReply::Menu(index) => json!(index),
            DecodedReply::Modal(first) => json!(first),
        }
    }
}

impl<S> BuiltForm<S> {
    pub fn check(&self) -> Result<(), SchemaError> {
        match self {
            BuiltForm::Custom(form) => form.check(),
            BuiltForm::Menu(form) => form.check(),
            BuiltForm::Modal(_) => Ok(()),
        }
    }

    pub fn decode(&self, payload: Payload) -> Result<DecodedReply, FormError> {
        let reply = match self {
            BuiltForm::Custom(form) => match form.decode(payload)? {
                Outcome::Closed => DecodedReply::Closed,
                Outcome::Submitted(response) => DecodedReply::Custom(response),
            },
            BuiltForm::Menu(form) => match form.decode(payload)? {
                Outcome::Closed => DecodedReply::Closed,
                Outcome::Submitted(index) => DecodedReply::Menu(index),
            },
            BuiltForm::Modal(form) => match form.decode(payload)? {
                Outcome::Closed => DecodedReply::Closed,
                Outcome::Submitted(first) => DecodedReply::Modal(first),
            },
        };
        Ok(reply)
    }
}

impl<S> Form<S> for BuiltForm<S> {
    fn render(&self) -> Value {
        match self {
            BuiltForm::Custom(form) => form.render(),
            BuiltForm::Menu(form) => form.render(),
            BuiltForm::Modal(form) => form.render(),
        }
    }

    fn submit(&mut self, session: &S, payload: Payload) -> Result<(), FormError> {
        match self {
            BuiltForm::Custom(form) => form.submit(session, payload),
            BuiltForm::Menu(form) => form.submit(session, payload),
            BuiltForm::Modal(form) => form.submit(session, payload),
        }
    }
}
