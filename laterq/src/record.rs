use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueueError;

/// A claimed-but-not-yet-completed unit of work.
///
/// Stored in the processing set as a JSON blob; the serialized string is
/// itself the removal handle. Records outlive their claiming process: if a
/// consumer dies before cleanup the record stays put, and an external sweep
/// decides via [`descriptor`](ProcessingRecord::descriptor) whether to
/// re-schedule the item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessingRecord {
    /// The decoded item payload.
    pub item: String,
    /// Epoch seconds when the claim occurred.
    pub claimed_at: i64,
    /// Opaque consumer-supplied value, round-tripped unexamined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<serde_json::Value>,
}

impl ProcessingRecord {
    /// Build a record for an item claimed at `claimed_at`.
    pub fn new(
        item: impl Into<String>,
        claimed_at: DateTime<Utc>,
        descriptor: Option<serde_json::Value>,
    ) -> Self {
        Self {
            item: item.into(),
            claimed_at: claimed_at.timestamp(),
            descriptor,
        }
    }

    /// Serialize into the set-member string.
    pub fn to_member(&self) -> Result<String, QueueError> {
        serde_json::to_string(self).map_err(QueueError::Encode)
    }

    /// Decode a set member; a non-conforming blob is a corrupt entry.
    pub fn from_member(raw: &str) -> Result<Self, QueueError> {
        serde_json::from_str(raw).map_err(|_| QueueError::CorruptEntry {
            raw: raw.to_string(),
        })
    }

    /// The claim time as a timestamp.
    pub fn claimed_at_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.claimed_at, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn member_round_trip() {
        let record = ProcessingRecord::new(
            "resize:42",
            Utc::now(),
            Some(json!({"worker": "w-1", "attempt": 3})),
        );
        let member = record.to_member().unwrap();
        assert_eq!(ProcessingRecord::from_member(&member).unwrap(), record);
    }

    #[test]
    fn descriptor_is_omitted_when_absent() {
        let record = ProcessingRecord::new("a", Utc::now(), None);
        let member = record.to_member().unwrap();
        assert!(!member.contains("descriptor"));
        assert_eq!(ProcessingRecord::from_member(&member).unwrap().descriptor, None);
    }

    #[test]
    fn garbage_member_is_corrupt() {
        let err = ProcessingRecord::from_member("not json").unwrap_err();
        assert!(matches!(err, QueueError::CorruptEntry { .. }));
    }
}
