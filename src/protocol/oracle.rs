//! Parameter oracle: the name ↔ id ↔ type table for control parameters.

use serde::{Deserialize, Serialize};

use crate::error::ParamRejection;

use super::params::{ParamType, ParamValue, Parameter};

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub id: u8,
    #[serde(rename = "type")]
    pub kind: ParamType,
}

/// How a caller names a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKey<'a> {
    Id(u8),
    Name(&'a str),
}

impl From<u8> for ParamKey<'_> {
    fn from(id: u8) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a str> for ParamKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParameterOracle {
    specs: Vec<ParameterSpec>,
}

impl ParameterOracle {
    /// Build the table.  Uniqueness of ids and names is checked by config
    /// validation; on duplicates the first declaration wins.
    pub fn new(specs: impl IntoIterator<Item = ParameterSpec>) -> Self {
        Self {
            specs: specs.into_iter().collect(),
        }
    }

    pub fn by_name(&self, name: &str) -> Option<&ParameterSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn by_id(&self, id: u8) -> Option<&ParameterSpec> {
        self.specs.iter().find(|s| s.id == id)
    }

    pub fn resolve(&self, key: ParamKey<'_>) -> Result<&ParameterSpec, ParamRejection> {
        match key {
            ParamKey::Id(id) => self.by_id(id).ok_or(ParamRejection::UnknownId(id)),
            ParamKey::Name(name) => self
                .by_name(name)
                .ok_or_else(|| ParamRejection::UnknownName(name.to_owned())),
        }
    }

    /// Resolve `key`, type-check `value` against the declaration and encode it.
    pub fn encode(
        &self,
        key: ParamKey<'_>,
        value: ParamValue,
    ) -> Result<Parameter, ParamRejection> {
        let spec = self.resolve(key)?;
        if value.kind() != spec.kind {
            return Err(ParamRejection::TypeMismatch {
                id: spec.id,
                expected: spec.kind,
                found: value.kind(),
            });
        }
        Ok(Parameter {
            id: spec.id,
            data: value.to_bytes(),
        })
    }
}
