//! Kinds classify type-level variables (spec.md §3, "Kinds").

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Type,
    Int,
    Order,
    Effect,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Kind::Type => "Type",
            Kind::Int => "Int",
            Kind::Order => "Order",
            Kind::Effect => "Effect",
        };
        write!(f, "{s}")
    }
}
