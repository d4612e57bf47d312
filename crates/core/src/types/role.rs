//! Session roles.
//!
//! The remote service historically emitted both `"CUSTOMER"` and `"USER"`
//! for non-admin accounts, and call sites compared raw strings. Role is a
//! closed enum with a single normalization point instead: every inbound
//! role string passes through [`Role::normalize`] when the session is
//! written, and everything downstream matches on the enum.

use serde::{Deserialize, Serialize};

/// Authorization role attached to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular shopper. The default for anything unrecognized.
    #[default]
    Customer,
    /// Elevated role; required for catalog mutation views.
    Admin,
}

impl Role {
    /// Normalize a raw role string from the remote service.
    ///
    /// `"ADMIN"` (any casing) maps to [`Role::Admin`]; `"CUSTOMER"`,
    /// the legacy `"USER"`, and any unknown value map to
    /// [`Role::Customer`]. Normalizing never fails: an unrecognized role
    /// must degrade to the least-privileged one.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("ADMIN") {
            Self::Admin
        } else {
            Self::Customer
        }
    }

    /// Canonical wire/storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Admin => "ADMIN",
        }
    }

    /// Whether this role satisfies a required role.
    ///
    /// Admin satisfies everything; Customer satisfies only Customer.
    #[must_use]
    pub const fn satisfies(&self, required: Self) -> bool {
        match required {
            Self::Customer => true,
            Self::Admin => matches!(self, Self::Admin),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
