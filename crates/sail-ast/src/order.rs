//! Bit-vector direction (spec.md §3, "Kinds": `Order`).

use crate::ident::Id;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Order {
    Inc,
    Dec,
    Var(Id),
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::Inc => write!(f, "inc"),
            Order::Dec => write!(f, "dec"),
            Order::Var(id) => write!(f, "{id}"),
        }
    }
}
