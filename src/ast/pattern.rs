//! Assignment targets.

use strum::IntoStaticStr;

use crate::ast::{Expression, Loc};

/// The target of an assignment.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum Pattern {
    /// Named binding
    Identifier {
        /// Source location
        loc: Loc,
        /// Binding name
        name: String,
    },
    /// `base[key]`
    Member {
        /// Source location
        loc: Loc,
        /// Object
        base: Expression,
        /// Computed key
        key: Expression,
    },
    /// Register write
    OpRegister {
        /// Source location
        loc: Loc,
        /// Register number
        register: u8,
    },
    /// Temporary write
    OpTemporary {
        /// Source location
        loc: Loc,
        /// Temporary id
        id: u32,
    },
}

impl Pattern {
    /// Returns the variant tag of this pattern.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Creates a [`Pattern::Identifier`].
    pub fn identifier(name: impl Into<String>) -> Self {
        Pattern::Identifier {
            loc: Loc::default(),
            name: name.into(),
        }
    }

    /// Creates a [`Pattern::Member`].
    #[must_use]
    pub fn member(base: Expression, key: Expression) -> Self {
        Pattern::Member {
            loc: Loc::default(),
            base,
            key,
        }
    }

    /// Creates a [`Pattern::OpRegister`].
    #[must_use]
    pub fn register(register: u8) -> Self {
        Pattern::OpRegister {
            loc: Loc::default(),
            register,
        }
    }

    /// Creates a [`Pattern::OpTemporary`].
    #[must_use]
    pub fn temporary(id: u32) -> Self {
        Pattern::OpTemporary {
            loc: Loc::default(),
            id,
        }
    }
}
