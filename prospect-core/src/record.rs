//! Records of metrics emitted by agents during training.
use crate::error::ProspectError;
use chrono::prelude::{DateTime, Local};
use std::{
    collections::{
        hash_map::{IntoIter, Iter, Keys},
        HashMap,
    },
    convert::Into,
};

/// Possible types of values in a [`Record`].
#[derive(Debug, Clone)]
pub enum RecordValue {
    /// Scalar, typically a loss or a reward.
    Scalar(f32),

    /// Date and time.
    DateTime(DateTime<Local>),

    /// String.
    String(String),
}

/// Key-value pairs of metrics.
///
/// The learning core returns a [`Record`] from every optimization step; the
/// training driver aggregates or forwards it to whatever visualization layer
/// it uses. The core itself has no awareness of plotting.
#[derive(Debug, Clone)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Returns an iterator that consumes the record.
    pub fn into_iter_in_record(self) -> IntoIter<String, RecordValue> {
        self.0.into_iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges two records, consuming both.
    ///
    /// On duplicate keys the value of `record` wins.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Gets scalar value.
    pub fn get_scalar(&self, k: &str) -> Result<f32, ProspectError> {
        if let Some(v) = self.0.get(k) {
            match v {
                RecordValue::Scalar(v) => Ok(*v),
                _ => Err(ProspectError::RecordValueTypeError("Scalar".into())),
            }
        } else {
            Err(ProspectError::RecordKeyError(k.into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, RecordValue};

    #[test]
    fn test_get_scalar() {
        let mut record = Record::from_scalar("loss_critic", 0.5);
        record.insert("note", RecordValue::String("warmup".into()));

        assert_eq!(record.get_scalar("loss_critic").unwrap(), 0.5);
        assert!(record.get_scalar("loss_actor").is_err());
        assert!(record.get_scalar("note").is_err());
    }

    #[test]
    fn test_merge() {
        let r1 = Record::from_scalar("loss_critic", 1.0);
        let r2 = Record::from_scalar("loss_actor", 2.0);
        let r = r1.merge(r2);
        assert_eq!(r.get_scalar("loss_critic").unwrap(), 1.0);
        assert_eq!(r.get_scalar("loss_actor").unwrap(), 2.0);
    }
}
