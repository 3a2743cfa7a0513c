#![allow(missing_docs)]

pub mod bind;
pub mod definition;
pub mod element;
pub mod form;
pub mod payload;
pub mod response;

pub use bind::{BindError, BindField, Bindable, FieldSlot};
pub use definition::{BuiltForm, DecodedReply, ElementDefinition, FormDefinition, definition_schema};
pub use element::{
    Button, DecodeError, Dropdown, Element, ImageSource, Input, Label, SchemaError, Slider,
    StepSlider, Toggle,
};
pub use form::{
    CloseFn, CustomForm, ErrorClass, Form, FormError, MenuForm, ModalForm, Outcome, SubmitFn,
};
pub use payload::Payload;
pub use response::{FormValue, Response, ResponseError};
