//! Projection of a [`Response`] onto caller-defined structs.
//!
//! A destination lists its fields through [`Bindable::fields`], each with the
//! response key it reads from. The [`bindable!`](crate::bindable) macro writes
//! that list for plain structs:
//!
//! ```
//! use form_spec::bindable;
//!
//! #[derive(Default)]
//! struct Profile {
//!     name: String,
//!     age: u32,
//!     note: String,
//! }
//!
//! bindable!(Profile {
//!     name => "name",
//!     age => "age",
//! });
//! ```
//!
//! Fields that are not listed (like `note` above) are never touched.

use thiserror::Error;
use tracing::trace;

use crate::response::{FormValue, Response};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    #[error("cannot assign {found} value of '{key}' to {expected} field {field}")]
    Incompatible {
        field: &'static str,
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("value of '{key}' does not fit field {field}")]
    OutOfRange { field: &'static str, key: String },
    #[error("unsupported field type {type_name} for field {field}")]
    Unsupported {
        field: &'static str,
        type_name: &'static str,
    },
}

/// Mutable view of one destination field.
#[derive(Debug)]
pub enum FieldSlot<'a> {
    Text(&'a mut String),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Bool(&'a mut bool),
    Unsupported { type_name: &'static str },
}

impl FieldSlot<'_> {
    /// Slot for a field type the binder cannot assign. Binding a tagged field
    /// of this kind fails with [`BindError::Unsupported`].
    pub fn unsupported<T: ?Sized>() -> Self {
        FieldSlot::Unsupported {
            type_name: std::any::type_name::<T>(),
        }
    }
}

macro_rules! slot_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a mut $ty> for FieldSlot<'a> {
                fn from(field: &'a mut $ty) -> Self {
                    FieldSlot::$variant(field)
                }
            }
        )*
    };
}

slot_from!(
    String => Text,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    bool => Bool,
);

/// One entry of a destination's field table.
#[derive(Debug)]
pub struct BindField<'a> {
    pub name: &'static str,
    pub tag: Option<&'static str>,
    pub slot: FieldSlot<'a>,
}

impl<'a> BindField<'a> {
    pub fn tagged(
        name: &'static str,
        tag: &'static str,
        slot: impl Into<FieldSlot<'a>>,
    ) -> Self {
        Self {
            name,
            tag: Some(tag),
            slot: slot.into(),
        }
    }

    pub fn untagged(name: &'static str, slot: impl Into<FieldSlot<'a>>) -> Self {
        Self {
            name,
            tag: None,
            slot: slot.into(),
        }
    }
}

/// A record that can receive response values.
pub trait Bindable {
    fn fields(&mut self) -> Vec<BindField<'_>>;
}

/// Implements [`Bindable`] for a struct from a `field => "key"` list.
#[macro_export]
macro_rules! bindable {
    ($ty:ty { $($field:ident => $tag:expr),* $(,)? }) => {
        impl $crate::bind::Bindable for $ty {
            fn fields(&mut self) -> ::std::vec::Vec<$crate::bind::BindField<'_>> {
                ::std::vec![
                    $($crate::bind::BindField::tagged(
                        ::std::stringify!($field),
                        $tag,
                        &mut self.$field,
                    )),*
                ]
            }
        }
    };
}

/// Fields are assigned in table order. A failure stops the pass; fields
/// assigned before it keep their new values.
pub fn bind<T: Bindable + ?Sized>(
    response: &Response,
    destination: &mut T,
) -> Result<(), BindError> {
    for field in destination.fields() {
        let Some(key) = field.tag else {
            continue;
        };
        let Some(value) = response.get(key) else {
            trace!(field = field.name, key, "no submitted value; field left as is");
            continue;
        };
        assign(field.name, key, field.slot, value)?;
    }
    Ok(())
}

fn assign(
    field: &'static str,
    key: &str,
    slot: FieldSlot<'_>,
    value: &FormValue,
) -> Result<(), BindError> {
    match slot {
        FieldSlot::Text(target) => match value {
            FormValue::Text(text) => {
                target.clone_from(text);
                Ok(())
            }
            other => Err(incompatible(field, key, "string", other)),
        },
        FieldSlot::Bool(target) => match value {
            FormValue::Bool(flag) => {
                *target = *flag;
                Ok(())
            }
            other => Err(incompatible(field, key, "bool", other)),
        },
        FieldSlot::F64(target) => {
            *target = float(field, key, value)?;
            Ok(())
        }
        FieldSlot::F32(target) => {
            let number = float(field, key, value)?;
            if number.is_finite() && number.abs() > f64::from(f32::MAX) {
                return Err(BindError::OutOfRange {
                    field,
                    key: key.to_string(),
                });
            }
            *target = number as f32;
            Ok(())
        }
        FieldSlot::I8(target) => set_integer(target, field, key, value),
        FieldSlot::I16(target) => set_integer(target, field, key, value),
        FieldSlot::I32(target) => set_integer(target, field, key, value),
        FieldSlot::I64(target) => set_integer(target, field, key, value),
        FieldSlot::Isize(target) => set_integer(target, field, key, value),
        FieldSlot::U8(target) => set_integer(target, field, key, value),
        FieldSlot::U16(target) => set_integer(target, field, key, value),
        FieldSlot::U32(target) => set_integer(target, field, key, value),
        FieldSlot::U64(target) => set_integer(target, field, key, value),
        FieldSlot::Usize(target) => set_integer(target, field, key, value),
        FieldSlot::Unsupported { type_name } => Err(BindError::Unsupported { field, type_name }),
    }
}

fn float(field: &'static str, key: &str, value: &FormValue) -> Result<f64, BindError> {
    match value {
        FormValue::Float(number) => Ok(*number),
        FormValue::Int(number) => Ok(*number as f64),
        other => Err(incompatible(field, key, "float", other)),
    }
}

/// Floats truncate toward zero.
fn set_integer<T: TryFrom<i64>>(
    target: &mut T,
    field: &'static str,
    key: &str,
    value: &FormValue,
) -> Result<(), BindError> {
    let out_of_range = || BindError::OutOfRange {
        field,
        key: key.to_string(),
    };
    let number = match value {
        FormValue::Int(number) => *number,
        FormValue::Float(number) => {
            let truncated = number.trunc();
            if !truncated.is_finite()
                || truncated < i64::MIN as f64
                || truncated >= i64::MAX as f64
            {
                return Err(out_of_range());
            }
            truncated as i64
        }
        other => return Err(incompatible(field, key, "integer", other)),
    };
    *target = T::try_from(number).map_err(|_| out_of_range())?;
    Ok(())
}

fn incompatible(
    field: &'static str,
    key: &str,
    expected: &'static str,
    found: &FormValue,
) -> BindError {
    BindError::Incompatible {
        field,
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}
