use std::{fmt, slice::Iter};

use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{Name, Set, SetID};

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub sets: Vec<Set>,
    pub notes: String,
    pub weight_unit: Option<WeightUnit>,
    pub equipment: Option<Equipment>,
}

impl Exercise {
    /// A new exercise with exactly one blank set.
    #[must_use]
    pub fn new(id: ExerciseID, name: Name) -> Self {
        Self {
            id,
            name,
            sets: vec![Set::blank(SetID::random())],
            notes: String::new(),
            weight_unit: None,
            equipment: None,
        }
    }

    #[must_use]
    pub fn total_sets(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn completed_sets(&self) -> usize {
        self.sets.iter().filter(|s| s.completed).count()
    }

    /// The measured set with the highest volume. The earliest set wins on equal volume.
    #[must_use]
    pub fn best_set(&self) -> Option<&Set> {
        self.sets
            .iter()
            .filter(|s| s.is_measured())
            .fold(None, |best: Option<&Set>, set| match best {
                Some(b) if set.volume() <= b.volume() => Some(b),
                _ => Some(set),
            })
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        self.sets
            .iter()
            .filter(|s| s.completed)
            .filter_map(Set::volume)
            .sum()
    }

    /// A copy with fresh ids whose sets are either blank or keep their values, but are never
    /// completed.
    #[must_use]
    pub(crate) fn duplicate(&self, keep_values: bool) -> Self {
        Self {
            id: ExerciseID::random(),
            name: self.name.clone(),
            sets: self
                .sets
                .iter()
                .map(|s| {
                    if keep_values {
                        Set {
                            id: SetID::random(),
                            completed: false,
                            ..s.clone()
                        }
                    } else {
                        Set::blank(SetID::random())
                    }
                })
                .collect(),
            notes: self.notes.clone(),
            weight_unit: self.weight_unit,
            equipment: self.equipment,
        }
    }
}

#[derive(Deref, Display, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(Uuid);

impl ExerciseID {
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

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WeightUnit {
    Lbs,
    Kg,
}

impl WeightUnit {
    pub fn iter() -> Iter<'static, WeightUnit> {
        static UNITS: [WeightUnit; 2] = [WeightUnit::Lbs, WeightUnit::Kg];
        UNITS.iter()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            WeightUnit::Lbs => "lbs",
            WeightUnit::Kg => "kg",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<&str> for WeightUnit {
    type Error = UnknownValue;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        WeightUnit::iter()
            .find(|u| u.name() == value)
            .copied()
            .ok_or_else(|| UnknownValue(value.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Machine,
    Bodyweight,
    Other,
}

impl Equipment {
    pub fn iter() -> Iter<'static, Equipment> {
        static EQUIPMENT: [Equipment; 5] = [
            Equipment::Barbell,
            Equipment::Dumbbell,
            Equipment::Machine,
            Equipment::Bodyweight,
            Equipment::Other,
        ];
        EQUIPMENT.iter()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Equipment::Barbell => "barbell",
            Equipment::Dumbbell => "dumbbell",
            Equipment::Machine => "machine",
            Equipment::Bodyweight => "bodyweight",
            Equipment::Other => "other",
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<&str> for Equipment {
    type Error = UnknownValue;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Equipment::iter()
            .find(|e| e.name() == value)
            .copied()
            .ok_or_else(|| UnknownValue(value.to_string()))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("unknown value \"{0}\"")]
pub struct UnknownValue(pub String);
