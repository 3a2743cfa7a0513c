use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::payload::{as_index, value_kind};
use crate::response::FormValue;

/// Per-element decode failures. The owning container wraps these with the
/// element key.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("value {value} is not an integer")]
    NotIntegral { value: String },
    #[error("index {index} is out of bounds (options: {len})")]
    IndexOutOfRange { index: i128, len: usize },
    #[error("value {value} is out of bounds [{min}, {max}]")]
    ValueOutOfRange { value: f64, min: f64, max: f64 },
}

impl DecodeError {
    fn mismatch(expected: &'static str, raw: &Value) -> Self {
        DecodeError::TypeMismatch {
            expected,
            found: value_kind(raw),
        }
    }
}

/// Builder-time misconfiguration reported by `check()`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("'{text}' has no options")]
    NoOptions { text: String },
    #[error("default index {index} is out of bounds (options: {len})")]
    DefaultIndexOutOfRange { index: usize, len: usize },
    #[error("slider bounds [{min}, {max}] are invalid")]
    InvalidBounds { min: f64, max: f64 },
    #[error("slider step {step} is invalid")]
    InvalidStep { step: f64 },
    #[error("slider default {value} is out of bounds [{min}, {max}]")]
    DefaultOutOfRange { value: f64, min: f64, max: f64 },
    #[error("menu has no buttons")]
    NoButtons,
    #[error("element key '{key}' is registered more than once")]
    DuplicateKey { key: String },
    #[error("element '{key}': {source}")]
    InElement {
        key: String,
        #[source]
        source: Box<SchemaError>,
    },
}

/// Static text. Occupies a slot in the reply but never contributes a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Label {
    pub text: String,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Free text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Input {
    pub text: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub default: String,
}

impl Input {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            placeholder: String::new(),
            default: String::new(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = value.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Toggle {
    pub text: String,
    #[serde(default)]
    pub default: bool,
}

impl Toggle {
    pub fn new(text: impl Into<String>, default: bool) -> Self {
        Self {
            text: text.into(),
            default,
        }
    }
}

/// Pick one of `options`; submits the chosen index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Dropdown {
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub default: usize,
}

impl Dropdown {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
            default: 0,
        }
    }

    pub fn with_options<I, T>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_index(mut self, index: usize) -> Self {
        self.default = index;
        self
    }
}

/// Same contract as [`Dropdown`], presented as a stepped slider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepSlider {
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub default: usize,
}

impl StepSlider {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
            default: 0,
        }
    }

    pub fn with_options<I, T>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_index(mut self, index: usize) -> Self {
        self.default = index;
        self
    }
}

/// Numeric range. `step` is presentation metadata; decode only enforces
/// `min <= value <= max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Slider {
    pub text: String,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<f64>,
}

impl Slider {
    pub fn new(text: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            text: text.into(),
            min,
            max,
            step: None,
            default: None,
        }
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_default(mut self, value: f64) -> Self {
        self.default = Some(value);
        self
    }

    /// Falls back to `min` when no default was configured.
    pub fn default_or_min(&self) -> f64 {
        self.default.unwrap_or(self.min)
    }
}

/// Where a button image is loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Path,
    Url,
}

impl ImageSource {
    pub fn detect(image: &str) -> Self {
        if image.starts_with("http://") || image.starts_with("https://") {
            ImageSource::Url
        } else {
            ImageSource::Path
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Path => "path",
            ImageSource::Url => "url",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Button {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    /// Texture path or `http(s)://` URL.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn render(&self) -> Value {
        let mut map = Map::new();
        map.insert("text".into(), Value::String(self.text.clone()));
        if let Some(image) = self.image.as_deref().filter(|image| !image.is_empty()) {
            map.insert(
                "image".into(),
                json!({
                    "type": ImageSource::detect(image).as_str(),
                    "data": image,
                }),
            );
        }
        Value::Object(map)
    }
}

impl From<&str> for Button {
    fn from(text: &str) -> Self {
        Button::new(text)
    }
}

impl From<String> for Button {
    fn from(text: String) -> Self {
        Button::new(text)
    }
}

/// One unit of a custom form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Label(Label),
    Input(Input),
    Toggle(Toggle),
    Dropdown(Dropdown),
    Slider(Slider),
    StepSlider(StepSlider),
    Button(Button),
}

impl Element {
    pub fn label(text: impl Into<String>) -> Self {
        Element::Label(Label::new(text))
    }

    pub fn toggle(text: impl Into<String>, default: bool) -> Self {
        Element::Toggle(Toggle::new(text, default))
    }

    /// The schema `"type"` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Label(_) => "label",
            Element::Input(_) => "input",
            Element::Toggle(_) => "toggle",
            Element::Dropdown(_) => "dropdown",
            Element::Slider(_) => "slider",
            Element::StepSlider(_) => "step_slider",
            Element::Button(_) => "button",
        }
    }

    pub fn render(&self) -> Value {
        match self {
            Element::Label(label) => json!({
                "type": "label",
                "text": label.text,
            }),
            Element::Input(input) => json!({
                "type": "input",
                "text": input.text,
                "placeholder": input.placeholder,
                "default": input.default,
            }),
            Element::Toggle(toggle) => json!({
                "type": "toggle",
                "text": toggle.text,
                "default": toggle.default,
            }),
            Element::Dropdown(dropdown) => json!({
                "type": "dropdown",
                "text": dropdown.text,
                "options": dropdown.options,
                "default": dropdown.default,
            }),
            Element::Slider(slider) => json!({
                "type": "slider",
                "text": slider.text,
                "min": slider.min,
                "max": slider.max,
                "step": slider.step.unwrap_or(1.0),
                "default": slider.default_or_min(),
            }),
            Element::StepSlider(step_slider) => json!({
                "type": "step_slider",
                "text": step_slider.text,
                "options": step_slider.options,
                "default": step_slider.default,
            }),
            Element::Button(button) => button.render(),
        }
    }

    /// Validate one positional reply entry. Labels and buttons accept any
    /// placeholder and produce nothing.
    pub fn decode(&self, raw: &Value) -> Result<Option<FormValue>, DecodeError> {
        match self {
            Element::Label(_) | Element::Button(_) => Ok(None),
            // serde_json strings are UTF-8 by construction; invalid byte
            // sequences are rejected when the payload is parsed.
            Element::Input(_) => match raw {
                Value::String(text) => Ok(Some(FormValue::Text(text.clone()))),
                other => Err(DecodeError::mismatch("string", other)),
            },
            Element::Toggle(_) => match raw {
                Value::Bool(flag) => Ok(Some(FormValue::Bool(*flag))),
                other => Err(DecodeError::mismatch("boolean", other)),
            },
            Element::Dropdown(dropdown) => decode_index(raw, dropdown.options.len()).map(Some),
            Element::StepSlider(step_slider) => {
                decode_index(raw, step_slider.options.len()).map(Some)
            }
            Element::Slider(slider) => {
                let Value::Number(number) = raw else {
                    return Err(DecodeError::mismatch("number", raw));
                };
                let Some(value) = number.as_f64() else {
                    return Err(DecodeError::mismatch("number", raw));
                };
                if value < slider.min || value > slider.max {
                    return Err(DecodeError::ValueOutOfRange {
                        value,
                        min: slider.min,
                        max: slider.max,
                    });
                }
                Ok(Some(FormValue::Float(value)))
            }
        }
    }

    /// What an untouched element submits.
    pub fn default_value(&self) -> Option<FormValue> {
        match self {
            Element::Label(_) | Element::Button(_) => None,
            Element::Input(input) => Some(FormValue::Text(input.default.clone())),
            Element::Toggle(toggle) => Some(FormValue::Bool(toggle.default)),
            Element::Dropdown(dropdown) => Some(FormValue::Int(dropdown.default as i64)),
            Element::StepSlider(step_slider) => Some(FormValue::Int(step_slider.default as i64)),
            Element::Slider(slider) => Some(FormValue::Float(slider.default_or_min())),
        }
    }

    pub fn check(&self) -> Result<(), SchemaError> {
        match self {
            Element::Label(_) | Element::Input(_) | Element::Toggle(_) | Element::Button(_) => {
                Ok(())
            }
            Element::Dropdown(dropdown) => {
                check_options(&dropdown.text, dropdown.options.len(), dropdown.default)
            }
            Element::StepSlider(step_slider) => check_options(
                &step_slider.text,
                step_slider.options.len(),
                step_slider.default,
            ),
            Element::Slider(slider) => {
                if !slider.min.is_finite() || !slider.max.is_finite() || slider.min > slider.max {
                    return Err(SchemaError::InvalidBounds {
                        min: slider.min,
                        max: slider.max,
                    });
                }
                if let Some(step) = slider.step
                    && (!step.is_finite() || step < 0.0)
                {
                    return Err(SchemaError::InvalidStep { step });
                }
                let value = slider.default_or_min();
                if !(slider.min..=slider.max).contains(&value) {
                    return Err(SchemaError::DefaultOutOfRange {
                        value,
                        min: slider.min,
                        max: slider.max,
                    });
                }
                Ok(())
            }
        }
    }
}

fn decode_index(raw: &Value, len: usize) -> Result<FormValue, DecodeError> {
    let Value::Number(number) = raw else {
        return Err(DecodeError::mismatch("integer", raw));
    };
    let Some(index) = as_index(number) else {
        return Err(DecodeError::NotIntegral {
            value: number.to_string(),
        });
    };
    if index < 0 || index >= len as i128 {
        return Err(DecodeError::IndexOutOfRange { index, len });
    }
    Ok(FormValue::Int(index as i64))
}

fn check_options(text: &str, len: usize, default: usize) -> Result<(), SchemaError> {
    if len == 0 {
        return Err(SchemaError::NoOptions {
            text: text.to_string(),
        });
    }
    if default >= len {
        return Err(SchemaError::DefaultIndexOutOfRange {
            index: default,
            len,
        });
    }
    Ok(())
}

impl From<Label> for Element {
    fn from(label: Label) -> Self {
        Element::Label(label)
    }
}

impl From<Input> for Element {
    fn from(input: Input) -> Self {
        Element::Input(input)
    }
}

impl From<Toggle> for Element {
    fn from(toggle: Toggle) -> Self {
        Element::Toggle(toggle)
    }
}

impl From<Dropdown> for Element {
    fn from(dropdown: Dropdown) -> Self {
        Element::Dropdown(dropdown)
    }
}

impl From<Slider> for Element {
    fn from(slider: Slider) -> Self {
        Element::Slider(slider)
    }
}

impl From<StepSlider> for Element {
    fn from(step_slider: StepSlider) -> Self {
        Element::StepSlider(step_slider)
    }
}

impl From<Button> for Element {
    fn from(button: Button) -> Self {
        Element::Button(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> Element {
        Dropdown::new("Select your favourite color")
            .with_options(["Red", "Green", "Blue"])
            .into()
    }

    #[test]
    fn dropdown_accepts_indices_inside_options() {
        let element = colors();
        assert_eq!(element.decode(&json!(0)).unwrap(), Some(FormValue::Int(0)));
        assert_eq!(element.decode(&json!(2)).unwrap(), Some(FormValue::Int(2)));
    }

    #[test]
    fn dropdown_rejects_indices_at_both_edges() {
        let element = colors();
        assert_eq!(
            element.decode(&json!(-1)).unwrap_err(),
            DecodeError::IndexOutOfRange { index: -1, len: 3 }
        );
        assert_eq!(
            element.decode(&json!(3)).unwrap_err(),
            DecodeError::IndexOutOfRange { index: 3, len: 3 }
        );
    }

    #[test]
    fn step_slider_rejects_indices_at_both_edges() {
        let element: Element = StepSlider::new("Select a number")
            .with_options(["1", "2", "3"])
            .into();
        assert_eq!(
            element.decode(&json!(-1)).unwrap_err(),
            DecodeError::IndexOutOfRange { index: -1, len: 3 }
        );
        assert_eq!(
            element.decode(&json!(3)).unwrap_err(),
            DecodeError::IndexOutOfRange { index: 3, len: 3 }
        );
        assert_eq!(element.decode(&json!(0)).unwrap(), Some(FormValue::Int(0)));
        assert_eq!(element.decode(&json!(2)).unwrap(), Some(FormValue::Int(2)));
    }

    #[test]
    fn negative_zero_selects_first_option() {
        let Value::Array(reply) = serde_json::from_str::<Value>("[-0]").unwrap() else {
            panic!("expected an array");
        };
        assert_eq!(colors().decode(&reply[0]).unwrap(), Some(FormValue::Int(0)));
    }

    #[test]
    fn dropdown_rejects_fractional_and_string_indices() {
        let element = colors();
        assert!(matches!(
            element.decode(&json!(1.0)).unwrap_err(),
            DecodeError::NotIntegral { .. }
        ));
        assert!(matches!(
            element.decode(&json!("1")).unwrap_err(),
            DecodeError::TypeMismatch {
                expected: "integer",
                found: "string"
            }
        ));
    }

    #[test]
    fn huge_unsigned_index_is_out_of_range() {
        let element = colors();
        let err = element.decode(&json!(u64::MAX)).unwrap_err();
        assert!(matches!(err, DecodeError::IndexOutOfRange { .. }));
    }

    #[test]
    fn slider_bounds_are_inclusive() {
        let element: Element = Slider::new("Your age", 0.0, 200.0).into();
        assert_eq!(
            element.decode(&json!(0)).unwrap(),
            Some(FormValue::Float(0.0))
        );
        assert_eq!(
            element.decode(&json!(200)).unwrap(),
            Some(FormValue::Float(200.0))
        );
        assert!(matches!(
            element.decode(&json!(-0.01)).unwrap_err(),
            DecodeError::ValueOutOfRange { .. }
        ));
        assert!(matches!(
            element.decode(&json!(200.01)).unwrap_err(),
            DecodeError::ValueOutOfRange { .. }
        ));
    }

    #[test]
    fn slider_ignores_step_when_decoding() {
        let element: Element = Slider::new("Volume", 0.0, 10.0).with_step(2.0).into();
        assert_eq!(
            element.decode(&json!(3.5)).unwrap(),
            Some(FormValue::Float(3.5))
        );
    }

    #[test]
    fn input_rejects_non_strings() {
        let element: Element = Input::new("Your name").into();
        for raw in [json!(1), json!(true), Value::Null] {
            assert!(matches!(
                element.decode(&raw).unwrap_err(),
                DecodeError::TypeMismatch {
                    expected: "string",
                    ..
                }
            ));
        }
    }

    #[test]
    fn toggle_requires_boolean() {
        let element = Element::toggle("Enable something", false);
        assert_eq!(
            element.decode(&json!(true)).unwrap(),
            Some(FormValue::Bool(true))
        );
        assert!(element.decode(&json!(1)).is_err());
    }

    #[test]
    fn label_discards_placeholder_entries() {
        let element = Element::label("Welcome");
        assert_eq!(element.decode(&Value::Null).unwrap(), None);
        assert_eq!(element.decode(&json!("anything")).unwrap(), None);
    }

    #[test]
    fn button_image_source_is_detected_by_prefix() {
        let path = Button::new("Lobby").with_image("textures/items/compass");
        let url = Button::new("Shop").with_image("https://example.com/shop.png");
        assert_eq!(path.render()["image"]["type"], "path");
        assert_eq!(url.render()["image"]["type"], "url");
        assert_eq!(url.render()["image"]["data"], "https://example.com/shop.png");
        assert!(Button::new("Plain").render().get("image").is_none());
    }

    #[test]
    fn slider_render_uses_min_when_default_missing() {
        let rendered = Element::from(Slider::new("Age", 5.0, 10.0)).render();
        assert_eq!(rendered["type"], "slider");
        assert_eq!(rendered["default"], 5.0);
    }

    #[test]
    fn check_flags_empty_options_and_bad_defaults() {
        assert!(matches!(
            Element::from(Dropdown::new("Empty")).check().unwrap_err(),
            SchemaError::NoOptions { .. }
        ));
        assert!(matches!(
            Element::from(StepSlider::new("Num").with_options(["1"]).with_default_index(1))
                .check()
                .unwrap_err(),
            SchemaError::DefaultIndexOutOfRange { index: 1, len: 1 }
        ));
        assert!(matches!(
            Element::from(Slider::new("Bad", 10.0, 0.0)).check().unwrap_err(),
            SchemaError::InvalidBounds { .. }
        ));
        assert!(matches!(
            Element::from(Slider::new("Age", 0.0, 200.0).with_default(250.0))
                .check()
                .unwrap_err(),
            SchemaError::DefaultOutOfRange { .. }
        ));
        assert!(colors().check().is_ok());
    }
}
