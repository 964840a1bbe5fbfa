//! Newtype IDs for type-safe entity references.
//!
//! Both upstream sources key their entities by opaque strings (Lamoda SKUs,
//! Twitch numeric-string IDs). Use the `define_id!` macro to create wrappers
//! that prevent accidentally mixing IDs from different entity types.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use tlparser_core::define_id;
/// define_id!(GameId);
/// define_id!(StreamId);
///
/// let game_id = GameId::new("509658");
/// let stream_id = StreamId::new("509658");
///
/// // These are different types, so this won't compile:
/// // let _: GameId = stream_id;
/// assert_eq!(game_id.as_str(), stream_id.as_str());
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

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
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

// Lamoda
define_id!(ProductSku);

// Twitch
define_id!(GameId);
define_id!(TwitchUserId);
define_id!(StreamId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_as_str() {
        let sku = ProductSku::new("MP002XW0F8B5");
        assert_eq!(sku.as_str(), "MP002XW0F8B5");
        assert_eq!(sku.to_string(), "MP002XW0F8B5");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = GameId::new("509658");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"509658\"");

        let parsed: GameId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_conversions() {
        let id: StreamId = "40952121085".into();
        let raw: String = id.clone().into();
        assert_eq!(raw, "40952121085");
        assert_eq!(StreamId::from(raw), id);
    }
}
