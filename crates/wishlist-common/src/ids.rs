//! Typed ID wrappers for the persisted entities.
//!
//! Each ID is a newtype around the SQLite `INTEGER PRIMARY KEY` of its table.
//! Parsing from a string rejects anything that is not a base-10 integer with
//! [`Error::InvalidInput`], which is how malformed ids coming in over the
//! query API are turned away before any lookup happens.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// The raw row id.
            #[must_use]
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| Error::invalid_input(format!("{} id '{}' is not an integer", $label, s)))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

integer_id!(
    /// Unique identifier for a client account.
    ClientId,
    "client"
);

integer_id!(
    /// Unique identifier for a viewing profile belonging to a client.
    ProfileId,
    "profile"
);

integer_id!(
    /// Unique identifier for a movie saved to the local catalog.
    MovieId,
    "movie"
);
