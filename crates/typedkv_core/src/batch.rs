//! Typed batch descriptors for store calls.
//!
//! # Responsibility
//! - Collect heterogeneous values or targets for one round trip.
//! - Resolve each entry's key when it is added.
//!
//! # Invariants
//! - Entry order is insertion order.
//! - Batches borrow caller memory; they never own values.

use crate::key::Storable;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Type-erased write side of a batch entry.
pub(crate) trait Encode {
    fn encode(&self) -> serde_json::Result<String>;
}

impl<T: Serialize> Encode for T {
    fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Type-erased read side of a batch entry.
pub(crate) trait Decode {
    /// Verifies that the payload decodes into the target type without
    /// touching the target.
    fn check(&self, payload: &str) -> serde_json::Result<()>;
    /// Replaces the target with the decoded payload.
    fn decode_from(&mut self, payload: &str) -> serde_json::Result<()>;
    /// Resets the target to its type's default value.
    fn reset(&mut self);
}

impl<T: DeserializeOwned + Default> Decode for T {
    fn check(&self, payload: &str) -> serde_json::Result<()> {
        serde_json::from_str::<T>(payload).map(|_| ())
    }

    fn decode_from(&mut self, payload: &str) -> serde_json::Result<()> {
        *self = serde_json::from_str(payload)?;
        Ok(())
    }

    fn reset(&mut self) {
        *self = T::default();
    }
}

pub(crate) struct WriteEntry<'a> {
    pub(crate) key: String,
    pub(crate) value: &'a dyn Encode,
}

pub(crate) struct ReadEntry<'a> {
    pub(crate) key: String,
    pub(crate) target: &'a mut dyn Decode,
}

/// Values to upsert in one statement.
#[derive(Default)]
pub struct WriteBatch<'a> {
    entries: Vec<WriteEntry<'a>>,
}

impl<'a> WriteBatch<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value under its derived key.
    pub fn add<T: Storable>(self, value: &'a T) -> Self {
        let key = value.storage_key().into_owned();
        self.add_keyed(key, value)
    }

    /// Adds a value under a key chosen at the call site.
    pub fn add_keyed<T: Serialize>(mut self, key: impl Into<String>, value: &'a T) -> Self {
        self.entries.push(WriteEntry {
            key: key.into(),
            value,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns entry keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub(crate) fn into_entries(self) -> Vec<WriteEntry<'a>> {
        self.entries
    }
}

/// Targets to populate from one query.
///
/// Every target whose key is not found is reset to its default value.
#[derive(Default)]
pub struct ReadBatch<'a> {
    entries: Vec<ReadEntry<'a>>,
}

impl<'a> ReadBatch<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a target under its derived key.
    ///
    /// The key is taken from the target's current value, which matters only
    /// for types whose named override depends on their contents.
    pub fn add<T: Storable>(self, target: &'a mut T) -> Self {
        let key = target.storage_key().into_owned();
        self.add_keyed(key, target)
    }

    /// Adds a target under a key chosen at the call site.
    pub fn add_keyed<T: DeserializeOwned + Default>(
        mut self,
        key: impl Into<String>,
        target: &'a mut T,
    ) -> Self {
        self.entries.push(ReadEntry {
            key: key.into(),
            target,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + use<'_, 'a> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub(crate) fn into_entries(self) -> Vec<ReadEntry<'a>> {
        self.entries
    }
}

/// Keys to delete in one statement. Only identity matters here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBatch {
    keys: Vec<String>,
}

impl KeyBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the derived key of `value`.
    pub fn add<T: Storable>(mut self, value: &T) -> Self {
        self.keys.push(value.storage_key().into_owned());
        self
    }

    /// Adds the key a default-constructed `T` derives.
    pub fn add_type<T: Storable>(self) -> Self {
        self.add(&T::default())
    }

    pub fn add_keyed(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub(crate) fn into_keys(self) -> Vec<String> {
        self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::{Decode, Encode, KeyBatch, ReadBatch, WriteBatch};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        age: u32,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter(i64);

    crate::storable!(Profile);
    crate::storable!(Counter => "visit_counter");

    #[test]
    fn write_batch_keeps_insertion_order_and_derived_keys() {
        let profile = Profile::default();
        let counter = Counter(3);
        let raw = vec![1_u8, 2, 3];

        let batch = WriteBatch::new()
            .add(&counter)
            .add(&profile)
            .add_keyed("raw_bytes", &raw);

        assert_eq!(batch.len(), 3);
        assert_eq!(
            batch.keys().collect::<Vec<_>>(),
            vec!["visit_counter", "Profile", "raw_bytes"]
        );
    }

    #[test]
    fn read_batch_derives_keys_from_targets() {
        let mut profile = Profile::default();
        let mut counter = Counter::default();
        let batch = ReadBatch::new().add(&mut profile).add(&mut counter);

        assert_eq!(
            batch.keys().collect::<Vec<_>>(),
            vec!["Profile", "visit_counter"]
        );
    }

    #[test]
    fn key_batch_accepts_types_values_and_explicit_keys() {
        let batch = KeyBatch::new()
            .add_type::<Profile>()
            .add(&Counter(9))
            .add_keyed("custom");

        assert_eq!(
            batch.keys().collect::<Vec<_>>(),
            vec!["Profile", "visit_counter", "custom"]
        );
        assert!(!batch.is_empty());
    }

    #[test]
    fn decode_replaces_and_reset_zeroes_target() {
        let mut profile = Profile {
            name: "Kate".to_string(),
            age: 43,
        };

        profile.decode_from(r#"{"name":"John","age":42}"#).unwrap();
        assert_eq!(
            profile,
            Profile {
                name: "John".to_string(),
                age: 42,
            }
        );

        profile.reset();
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn check_validates_payload_without_touching_target() {
        let profile = Profile {
            name: "Kate".to_string(),
            age: 43,
        };

        assert!(profile.check(r#"{"name":"John","age":42}"#).is_ok());
        assert!(profile.check(r#""not a profile""#).is_err());
        assert_eq!(profile.name, "Kate");
        assert_eq!(profile.age, 43);
    }

    #[test]
    fn read_batch_keys_can_be_listed_while_targets_are_borrowed() {
        let mut counter = Counter(1);
        let batch = ReadBatch::new().add_keyed("first", &mut counter);
        let keys: Vec<&str> = batch.keys().collect();
        assert_eq!(keys, vec!["first"]);
    }

    #[test]
    fn encode_produces_json_text() {
        assert_eq!(Counter(42).encode().unwrap(), "42");
        assert_eq!(
            vec!["hello", "world"].encode().unwrap(),
            r#"["hello","world"]"#
        );
    }
}
