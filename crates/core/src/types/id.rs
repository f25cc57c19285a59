//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create string-backed ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Stored documents use
//! short opaque strings ("1", "o1", "user_1"), so the wrappers accept any
//! non-empty string and generate fresh ids from a v4 UUID.

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `generate()`, `as_str()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use glokart_core::define_id;
/// define_id!(ShelfId);
/// define_id!(BinId);
///
/// let shelf = ShelfId::new("a1");
/// let bin = BinId::new("a1");
/// assert_eq!(shelf.as_str(), bin.as_str());
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = bin;
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
            /// Wrap an existing identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn generate() -> Self {
                let uuid = ::uuid::Uuid::new_v4().simple().to_string();
                Self(uuid.chars().take(12).collect())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ListingId);
define_id!(OfferId);
