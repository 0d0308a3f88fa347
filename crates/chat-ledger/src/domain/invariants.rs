//! # Domain Invariants
//!
//! Structural invariants of a chat and its message log. The ledger never
//! produces a violating state; these checks exist for audits over a stored
//! ledger and for tests.
//!
//! | Invariant | Check |
//! |-----------|-------|
//! | Count matches log | `message_count == log.len()` |
//! | Dense indices | `log[i].index == i` |
//! | Log ownership | every entry carries the chat's id |
//! | Authors are participants | every sender is in the chat |
//! | Reverse index | both participants list the chat exactly once |

use crate::domain::access::is_participant;
use crate::domain::entities::{Chat, Message};
use crate::domain::value_objects::{ChatId, Identity};

/// A single invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// `message_count` differs from the number of stored entries.
    CountMismatch { message_count: u64, stored: u64 },
    /// An entry sits at the wrong position.
    IndexGap { position: u64, index: u64 },
    /// An entry belongs to another chat.
    ForeignEntry { index: u64 },
    /// An entry was authored by a non-participant.
    OutsideSender { index: u64 },
    /// A participant's chat list does not hold the chat exactly once.
    NotIndexed { identity: Identity, occurrences: usize },
}

/// Result of checking a chat against its log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants were violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// True if no violation was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Checks `chat` against its full log, given in index order.
#[must_use]
pub fn check_chat_log(chat: &Chat, log: &[Message]) -> InvariantCheckResult {
    let mut violations = Vec::new();

    let stored = log.len() as u64;
    if stored != chat.message_count {
        violations.push(InvariantViolation::CountMismatch {
            message_count: chat.message_count,
            stored,
        });
    }

    for (position, message) in (0u64..).zip(log) {
        if message.index != position {
            violations.push(InvariantViolation::IndexGap {
                position,
                index: message.index,
            });
        }
        if message.chat_id != chat.id {
            violations.push(InvariantViolation::ForeignEntry {
                index: message.index,
            });
        }
        if !is_participant(chat, &message.sender) {
            violations.push(InvariantViolation::OutsideSender {
                index: message.index,
            });
        }
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

/// Checks that `identity`'s chat list holds `chat` exactly once.
#[must_use]
pub fn check_indexed(
    chat: &Chat,
    identity: Identity,
    chats: &[ChatId],
) -> Option<InvariantViolation> {
    let occurrences = chats.iter().filter(|id| **id == chat.id).count();
    (occurrences != 1).then_some(InvariantViolation::NotIndexed {
        identity,
        occurrences,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Identity = Identity([0xAA; 20]);
    const B: Identity = Identity([0xBB; 20]);

    fn chat_with(count: u64) -> Chat {
        let mut chat = Chat::new(ChatId::new([7u8; 32]), A, B, 0);
        chat.message_count = count;
        chat
    }

    fn entry(index: u64, sender: Identity) -> Message {
        Message::new(ChatId::new([7u8; 32]), index, sender, "m".to_string(), 0)
    }

    #[test]
    fn test_valid_log() {
        let chat = chat_with(2);
        let mut deleted = entry(1, B);
        deleted.delete().unwrap();
        let log = vec![entry(0, A), deleted];
        assert!(check_chat_log(&chat, &log).is_valid());
    }

    #[test]
    fn test_empty_log() {
        assert!(check_chat_log(&chat_with(0), &[]).is_valid());
    }

    #[test]
    fn test_count_mismatch() {
        let result = check_chat_log(&chat_with(3), &[entry(0, A)]);
        assert_eq!(
            result,
            InvariantCheckResult::Invalid(vec![InvariantViolation::CountMismatch {
                message_count: 3,
                stored: 1,
            }])
        );
    }

    #[test]
    fn test_gap_and_outsider() {
        let outsider = Identity::new([0xCC; 20]);
        let result = check_chat_log(&chat_with(2), &[entry(0, A), entry(2, outsider)]);
        let InvariantCheckResult::Invalid(violations) = result else {
            panic!("expected violations");
        };
        assert!(violations.contains(&InvariantViolation::IndexGap {
            position: 1,
            index: 2
        }));
        assert!(violations.contains(&InvariantViolation::OutsideSender { index: 2 }));
    }

    #[test]
    fn test_reverse_index() {
        let chat = chat_with(0);
        assert_eq!(
            check_indexed(&chat, A, &[ChatId::new([1u8; 32]), chat.id]),
            None
        );
        assert_eq!(
            check_indexed(&chat, B, &[]),
            Some(InvariantViolation::NotIndexed {
                identity: B,
                occurrences: 0
            })
        );
        assert!(check_indexed(&chat, A, &[chat.id, chat.id]).is_some());
    }
}
