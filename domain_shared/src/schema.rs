//! Schema variants and by-name field access.
//!
//! Each generation domain is one variant of [`DomainSchema`]. The lifecycle
//! code in [`crate::lifecycle`] only talks to the schema through field names
//! and [`FieldValue`]s, so adding a domain means adding a variant and a
//! [`field_table!`] invocation for its struct.

use std::fmt;
use std::str::FromStr;

use crate::bossfight::BossfightConfig;
use crate::error::DomainError;
use crate::value::FieldValue;

/// Why a by-name assignment was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetFieldError {
    /// The schema declares no field with that name.
    Unknown,
    /// The value cannot be stored in the field.
    WrongType { expected: &'static str },
}

/// A bound that a field value violates.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Conversion between a typed struct field and a [`FieldValue`].
pub(crate) trait FieldSlot {
    fn to_value(&self) -> FieldValue;
    fn assign(&mut self, value: &FieldValue) -> Result<(), SetFieldError>;
}

impl FieldSlot for i64 {
    fn to_value(&self) -> FieldValue {
        FieldValue::Int(*self)
    }

    fn assign(&mut self, value: &FieldValue) -> Result<(), SetFieldError> {
        *self = value
            .as_int()
            .ok_or(SetFieldError::WrongType { expected: "int" })?;
        Ok(())
    }
}

impl FieldSlot for f64 {
    fn to_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }

    fn assign(&mut self, value: &FieldValue) -> Result<(), SetFieldError> {
        *self = value
            .as_float()
            .ok_or(SetFieldError::WrongType { expected: "float" })?;
        Ok(())
    }
}

impl FieldSlot for String {
    fn to_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }

    fn assign(&mut self, value: &FieldValue) -> Result<(), SetFieldError> {
        let text = value
            .as_text()
            .ok_or(SetFieldError::WrongType { expected: "string" })?;
        *self = text.to_string();
        Ok(())
    }
}

/// Generates `FIELD_NAMES`, `get_field` and `set_field` for a schema struct.
macro_rules! field_table {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $ty {
            /// Declared field names, in declaration order.
            pub const FIELD_NAMES: &'static [&'static str] = &[$(stringify!($field)),*];

            pub fn get_field(&self, name: &str) -> Option<$crate::value::FieldValue> {
                use $crate::schema::FieldSlot;
                match name {
                    $(stringify!($field) => Some(self.$field.to_value()),)*
                    _ => None,
                }
            }

            pub fn set_field(
                &mut self,
                name: &str,
                value: &$crate::value::FieldValue,
            ) -> Result<(), $crate::schema::SetFieldError> {
                use $crate::schema::FieldSlot;
                match name {
                    $(stringify!($field) => self.$field.assign(value),)*
                    _ => Err($crate::schema::SetFieldError::Unknown),
                }
            }
        }
    };
}

pub(crate) use field_table;

/// Supported generation domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKind {
    Bossfight,
}

impl DomainKind {
    pub const ALL: &'static [DomainKind] = &[DomainKind::Bossfight];

    /// Name the engine expects in the `game` key.
    pub fn name(self) -> &'static str {
        match self {
            DomainKind::Bossfight => "dc_bossfight",
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DomainKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DomainKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| DomainError::UnknownDomain(s.to_string()))
    }
}

/// Field set of one generation domain.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainSchema {
    Bossfight(BossfightConfig),
}

impl DomainSchema {
    /// Schema of `kind` with every field at its default.
    pub fn defaults(kind: DomainKind) -> Self {
        match kind {
            DomainKind::Bossfight => DomainSchema::Bossfight(BossfightConfig::default()),
        }
    }

    pub fn kind(&self) -> DomainKind {
        match self {
            DomainSchema::Bossfight(_) => DomainKind::Bossfight,
        }
    }

    pub fn domain_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            DomainSchema::Bossfight(_) => BossfightConfig::FIELD_NAMES,
        }
    }

    pub fn get(&self, name: &str) -> Option<FieldValue> {
        match self {
            DomainSchema::Bossfight(c) => c.get_field(name),
        }
    }

    pub fn set(&mut self, name: &str, value: &FieldValue) -> Result<(), SetFieldError> {
        match self {
            DomainSchema::Bossfight(c) => c.set_field(name, value),
        }
    }

    /// All declared fields with their current values, in declaration order.
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        self.field_names()
            .iter()
            .filter_map(|name| self.get(name).map(|v| (*name, v)))
            .collect()
    }

    /// Bounds the engine enforces when it loads the file.
    pub fn validate(&self) -> Vec<Violation> {
        match self {
            DomainSchema::Bossfight(c) => c.validate(),
        }
    }
}

impl From<BossfightConfig> for DomainSchema {
    fn from(c: BossfightConfig) -> Self {
        DomainSchema::Bossfight(c)
    }
}
