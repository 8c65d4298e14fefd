//! Newtype IDs for type-safe entity references.
//!
//! Records are keyed by short human-readable identifiers (`CMP001`,
//! `USER001`, `worker3`). Use the `define_id!` macro to create wrappers that
//! prevent accidentally mixing IDs from different entity types.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use civic_desk_core::define_id;
/// define_id!(TicketId);
/// define_id!(OfficeId);
///
/// let ticket = TicketId::new("T001");
/// let office = OfficeId::new("T001");
///
/// // These are different types, so this won't compile:
/// // let _: TicketId = office;
/// assert_eq!(ticket.as_str(), office.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the owned string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ComplaintId);
define_id!(CitizenId);
define_id!(AdminUserId);

/// Identifier sequences backed by a per-collection counter.
///
/// Each sequence renders the next counter value with a fixed prefix and
/// zero-padding width, so complaint 6 becomes `CMP006` and worker 5 becomes
/// `worker5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdSequence {
    /// `CMP` + three digits.
    Complaints,
    /// `USER` + three digits.
    Citizens,
    /// `worker` + unpadded number.
    Workers,
}

impl IdSequence {
    /// Counter name as stored in the `id_counters` table.
    #[must_use]
    pub const fn counter_name(self) -> &'static str {
        match self {
            Self::Complaints => "complaints",
            Self::Citizens => "users",
            Self::Workers => "admin_users",
        }
    }

    /// Counter value already consumed by the fixture rows.
    #[must_use]
    pub const fn fixture_floor(self) -> i64 {
        match self {
            Self::Complaints | Self::Citizens => 5,
            Self::Workers => 4,
        }
    }

    /// Render a counter value as an identifier.
    #[must_use]
    pub fn format(self, value: i64) -> String {
        match self {
            Self::Complaints => format!("CMP{value:03}"),
            Self::Citizens => format!("USER{value:03}"),
            Self::Workers => format!("worker{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_formatting() {
        assert_eq!(IdSequence::Complaints.format(6), "CMP006");
        assert_eq!(IdSequence::Citizens.format(12), "USER012");
        assert_eq!(IdSequence::Workers.format(5), "worker5");
        assert_eq!(IdSequence::Complaints.format(1234), "CMP1234");
    }

    #[test]
    fn test_next_ids_follow_fixtures() {
        let next = |seq: IdSequence| seq.format(seq.fixture_floor() + 1);
        assert_eq!(next(IdSequence::Complaints), "CMP006");
        assert_eq!(next(IdSequence::Citizens), "USER006");
        assert_eq!(next(IdSequence::Workers), "worker5");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = ComplaintId::new("CMP001");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"CMP001\""));
        assert_eq!(id.to_string(), "CMP001");
    }
}
