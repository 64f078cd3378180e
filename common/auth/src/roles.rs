use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of staff roles. There is deliberately no catch-all variant:
/// a token carrying an unrecognized role string still authenticates, but
/// its bearer can never pass a role allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperOwner,
    Admin,
    Manager,
    Cashier,
}

impl Role {
    /// Case-insensitive parse of the wire form. Unknown strings map to `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SUPER_OWNER" => Some(Role::SuperOwner),
            "ADMIN" => Some(Role::Admin),
            "MANAGER" => Some(Role::Manager),
            "CASHIER" => Some(Role::Cashier),
            _ => None,
        }
    }

    /// Whether this role clears every allow-list without a membership check.
    pub fn bypasses_all(self) -> bool {
        matches!(self, Role::SuperOwner)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperOwner => "SUPER_OWNER",
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Cashier => "CASHIER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
