use serde::{Deserialize, Serialize};

use crate::error::QueueError;

/// How schedule entries are encoded into sorted-set members.
///
/// The mode is fixed for the lifetime of a namespace. Mixing modes against
/// the same namespace is a caller-contract violation and is not defended
/// against here.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Every schedule call creates an independent entry tagged with a
    /// store-assigned sequence id, encoded as `"{sequence}:{item}"`. The
    /// embedded id makes equal-time entries sort in insertion order.
    #[default]
    Sequenced,
    /// An item appears at most once; re-scheduling updates its ready time.
    /// Members are the bare item string.
    Unique,
}

impl Mode {
    /// Encode an item into its sorted-set member representation.
    ///
    /// Sequenced mode requires the sequence id obtained from the namespace
    /// counter; unique mode ignores it and returns the item verbatim.
    pub fn encode(&self, item: &str, sequence: Option<u64>) -> String {
        match (self, sequence) {
            (Mode::Sequenced, Some(seq)) => format!("{seq}:{item}"),
            _ => item.to_string(),
        }
    }

    /// Decode a sorted-set member back into the item payload.
    ///
    /// Sequenced members must match `digits ':' payload` exactly; anything
    /// else is a corrupt entry. Unique decoding is the identity.
    pub fn decode<'a>(&self, member: &'a str) -> Result<&'a str, QueueError> {
        match self {
            Mode::Unique => Ok(member),
            Mode::Sequenced => {
                let corrupt = || QueueError::CorruptEntry {
                    raw: member.to_string(),
                };
                let (digits, item) = member.split_once(':').ok_or_else(corrupt)?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(corrupt());
                }
                Ok(item)
            }
        }
    }
}
