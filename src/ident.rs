//! Identifier types and validation
//! -------------------------------
//! Database and table names are case-sensitive and limited to ASCII letters, digits and
//! underscores. Tables whose name starts with `_` are hidden from default listings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AdminError;

pub type DatabaseId = Uuid;
pub type TableId = Uuid;

pub fn is_valid_name(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

macro_rules! name_type {
    ($ty:ident, $what:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $ty(String);

        impl $ty {
            pub fn new(s: impl Into<String>) -> Result<Self, AdminError> {
                let s = s.into();
                if is_valid_name(&s) {
                    Ok(Self(s))
                } else {
                    Err(AdminError::invalid(format!(
                        "{} name `{}` invalid (Use A-Z, a-z, 0-9, and _ only).",
                        $what, s
                    )))
                }
            }

            /// For names known at compile time. Panics on an invalid name.
            pub fn guarantee_valid(s: &str) -> Self {
                assert!(is_valid_name(s), "invalid {} name `{}`", $what, s);
                Self(s.to_string())
            }

            pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $ty {
            type Err = AdminError;
            fn from_str(s: &str) -> Result<Self, Self::Err> { Self::new(s) }
        }

        impl TryFrom<String> for $ty {
            type Error = AdminError;
            fn try_from(s: String) -> Result<Self, Self::Error> { Self::new(s) }
        }

        impl From<$ty> for String {
            fn from(n: $ty) -> String { n.0 }
        }

        impl PartialEq<str> for $ty {
            fn eq(&self, other: &str) -> bool { self.0 == other }
        }

        impl PartialEq<&str> for $ty {
            fn eq(&self, other: &&str) -> bool { self.0 == *other }
        }
    };
}

name_type!(DatabaseName, "Database");
name_type!(TableName, "Table");

impl TableName {
    /// Hidden tables are resolvable by exact name but left out of `table_list`.
    pub fn is_hidden(&self) -> bool { self.0.starts_with('_') }
}

/// Which addressing scheme a system table uses for the identifiers it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierFormat {
    #[default]
    Name,
    Uuid,
}

impl IdentifierFormat {
    pub const ALL: [IdentifierFormat; 2] = [IdentifierFormat::Name, IdentifierFormat::Uuid];
}

impl FromStr for IdentifierFormat {
    type Err = AdminError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(IdentifierFormat::Name),
            "uuid" => Ok(IdentifierFormat::Uuid),
            other => Err(AdminError::invalid(format!(
                "Identifier format `{}` unrecognized (options are \"name\" and \"uuid\").",
                other
            ))),
        }
    }
}
