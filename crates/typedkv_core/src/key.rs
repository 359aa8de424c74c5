//! Storage key derivation.
//!
//! # Responsibility
//! - Map a value to the storage slot it occupies.
//! - Provide the named-key override without runtime reflection.
//!
//! # Invariants
//! - Two values of the same type without an override share one slot.
//! - Keys are non-empty and at most [`MAX_KEY_BYTES`] bytes.
//! - Derivation is pure: no I/O, no global state besides a compiled regex.

use crate::error::{StoreError, StoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;

/// Upper bound of the `kv_key` column (`varchar(128)`).
pub const MAX_KEY_BYTES: usize = 128;

static PATH_QUALIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[\p{XID_Start}_]\p{XID_Continue}*::)+").expect("valid path qualifier regex")
});

/// A value that can be persisted in a [`crate::Store`].
///
/// The default key is the type's declared name (see [`type_key`]). Overriding
/// [`Storable::storage_key`] is the named capability: it lets several values
/// of one type, or of generic wrappers, occupy distinct slots.
///
/// Use [`crate::storable!`] for the common cases.
pub trait Storable: Serialize + DeserializeOwned + Default {
    /// Returns the storage slot for this value.
    fn storage_key(&self) -> Cow<'_, str> {
        Cow::Owned(type_key::<Self>())
    }
}

/// Returns the declared name of `T` with module paths removed.
///
/// Generic arguments keep their shape, so `Vec<alloc::string::String>` becomes
/// `Vec<String>`. The text comes from [`std::any::type_name`], which is stable
/// for a given compiler release; pin keys with a named override when stored
/// data must outlive toolchain upgrades.
pub fn type_key<T: ?Sized>() -> String {
    PATH_QUALIFIER_RE
        .replace_all(std::any::type_name::<T>(), "")
        .into_owned()
}

/// Checks that a key fits the `kv_key` column.
pub fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason: "key must not be empty",
        });
    }
    if key.len() > MAX_KEY_BYTES {
        return Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason: "key exceeds 128 bytes",
        });
    }
    Ok(())
}

/// Implements [`Storable`] for one or more types.
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Profile {
///     name: String,
/// }
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Counter(i64);
///
/// typedkv_core::storable!(Profile);
/// typedkv_core::storable!(Counter => "visit_counter");
/// ```
#[macro_export]
macro_rules! storable {
    ($($ty:ty => $name:expr),+ $(,)?) => {
        $(
            impl $crate::Storable for $ty {
                fn storage_key(&self) -> ::std::borrow::Cow<'_, str> {
                    ::std::borrow::Cow::Borrowed($name)
                }
            }
        )+
    };
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Storable for $ty {}
        )+
    };
}
