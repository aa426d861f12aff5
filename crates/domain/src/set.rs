use std::fmt;

use derive_more::{Deref, Display, Into};
use uuid::Uuid;

use crate::InvalidInput;

#[derive(Debug, Clone, PartialEq)]
pub struct Set {
    pub id: SetID,
    pub weight: Option<Weight>,
    pub reps: Option<Reps>,
    pub effort: Option<Effort>,
    pub completed: bool,
}

impl Set {
    #[must_use]
    pub fn blank(id: SetID) -> Self {
        Self {
            id,
            weight: None,
            reps: None,
            effort: None,
            completed: false,
        }
    }

    /// `weight * reps`, if both are present. Completion is not considered.
    #[must_use]
    pub fn volume(&self) -> Option<f32> {
        match (self.weight, self.reps) {
            #[allow(clippy::cast_precision_loss)]
            (Some(weight), Some(reps)) => Some(f32::from(weight) * u32::from(reps) as f32),
            _ => None,
        }
    }

    /// A completed set with both weight and reps. Only such sets count towards volume and
    /// can be the best set of an exercise.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.completed && self.volume().is_some()
    }

    pub fn update(&mut self, field: SetField, value: FieldValue) -> Result<(), InvalidInput> {
        match field {
            SetField::Weight => self.weight = value.parse_number(field, Weight::parse)?,
            SetField::Reps => self.reps = value.parse_number(field, Reps::parse)?,
            SetField::Effort => self.effort = value.parse_number(field, Effort::parse)?,
            SetField::Completed => match value {
                FieldValue::Flag(completed) => self.completed = completed,
                _ => return Err(InvalidInput::FieldType(field, "flag")),
            },
        }
        Ok(())
    }
}

#[derive(Deref, Display, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SetID(Uuid);

impl SetID {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for SetID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for SetID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    Weight,
    Reps,
    Effort,
    Completed,
}

impl fmt::Display for SetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetField::Weight => "weight",
            SetField::Reps => "reps",
            SetField::Effort => "effort",
            SetField::Completed => "completed",
        };
        write!(f, "{name}")
    }
}

/// A value entered for a set field, either typed or as raw text from an input box.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Flag(bool),
    Empty,
}

impl FieldValue {
    fn parse_number<T>(
        self,
        field: SetField,
        parse: impl Fn(f64) -> Result<T, InvalidInput>,
    ) -> Result<Option<T>, InvalidInput> {
        match self {
            FieldValue::Number(value) => parse(value).map(Some),
            FieldValue::Text(text) => {
                let text = text.replace(',', ".");
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                match text.parse::<f64>() {
                    Ok(value) => parse(value).map(Some),
                    Err(_) => Err(InvalidInput::FieldType(field, "number")),
                }
            }
            FieldValue::Empty => Ok(None),
            FieldValue::Flag(_) => Err(InvalidInput::FieldType(field, "number")),
        }
    }
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..10_000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        Ok(Self(value))
    }

    fn parse(value: f64) -> Result<Self, InvalidInput> {
        if !(0.0..10_000.0).contains(&value) {
            return Err(WeightError::OutOfRange.into());
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Weight::new(value as f32)?)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0 to 9999.9")]
    OutOfRange,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }

    fn parse(value: f64) -> Result<Self, InvalidInput> {
        if !(0.0..1000.0).contains(&value) {
            return Err(RepsError::OutOfRange.into());
        }
        if value.fract() != 0.0 {
            return Err(RepsError::ParseError.into());
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Reps::new(value as u32)?)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

/// Perceived effort on a scale from 0 to 10, stored in tenths.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Effort(u8);

impl Effort {
    pub const ZERO: Effort = Effort(0);
    pub const FIVE: Effort = Effort(50);
    pub const SEVEN: Effort = Effort(70);
    pub const EIGHT: Effort = Effort(80);
    pub const NINE: Effort = Effort(90);
    pub const TEN: Effort = Effort(100);

    pub fn new(value: f32) -> Result<Self, EffortError> {
        if !(0.0..=10.0).contains(&value) {
            return Err(EffortError::OutOfRange);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self((value * 10.0).round() as u8))
    }

    fn parse(value: f64) -> Result<Self, InvalidInput> {
        if !(0.0..=10.0).contains(&value) {
            return Err(EffortError::OutOfRange.into());
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Effort::new(value as f32)?)
    }
}

impl From<Effort> for f32 {
    fn from(value: Effort) -> Self {
        f32::from(value.0) / 10.0
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", f32::from(*self))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EffortError {
    #[error("Effort must be in the range 0 to 10")]
    OutOfRange,
}
