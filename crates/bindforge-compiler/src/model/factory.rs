//! Factories and the constructors synthesized from them.

use crate::docs::Documentation;

use super::{Enumeration, Overload};

/// A free function producing an instance of `interface`.
#[derive(Debug, Clone, PartialEq)]
pub struct Factory {
    pub interface: String,
    pub tag: String,
    pub function: String,
    pub overload: Overload,
    pub documentation: Documentation,
}

/// One entry of a constructor's dispatch table.
#[derive(Debug, Clone, PartialEq)]
pub struct FactoryDispatch {
    pub function: String,
    pub tag: String,
}

/// A synthetic constructor standing for all factories of one interface.
#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub interface: String,
    /// Present only when several factories need a tag to disambiguate.
    pub tag_enum: Option<Enumeration>,
    pub overload: Overload,
    pub dispatch: Vec<FactoryDispatch>,
}

impl Constructor {
    pub fn is_tagged(&self) -> bool {
        self.tag_enum.is_some()
    }

    /// The signature without the leading tag argument, for binding layers
    /// that dispatch on argument shape.
    pub fn to_wrapped_overload(&self) -> Overload {
        let mut overload = self.overload.clone();
        if self.is_tagged() && !overload.arguments.is_empty() {
            overload.arguments.remove(0);
        }
        overload
    }
}
