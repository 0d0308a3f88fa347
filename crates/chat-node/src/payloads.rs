//! # Wire Payloads
//!
//! JSON-lines protocol between the node and its client.
//!
//! Request (one per line):
//!
//! ```text
//! {"caller":"0x…","request":{"op":"send_message","chat_id":"0x…","content":"hi","payment":"100"}}
//! ```
//!
//! Response (one per line):
//!
//! ```text
//! {"correlation_id":"…","op":"send_message","outcome":{"status":"ok","body":{…}},"events":[…]}
//! ```
//!
//! Amounts travel as decimal strings so they survive JSON number limits.

use chat_ledger::domain::entities::{Chat, MessageView};
use chat_ledger::domain::value_objects::{Amount, ChatId, Identity};
use chat_ledger::errors::{LedgerError, LedgerErrorPayload};
use chat_ledger::events::LedgerEvent;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Page size used when a `get_messages` request omits `limit`.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

// =============================================================================
// CORRELATION
// =============================================================================

/// Identifies one request/response pair in the node's logs and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a new random correlation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// AMOUNTS
// =============================================================================

/// Parses a decimal or `0x`-prefixed hex amount.
pub fn parse_amount(s: &str) -> Result<Amount, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Amount::from_str_radix(hex, 16).map_err(|e| format!("invalid hex amount {s:?}: {e:?}"))
    } else {
        Amount::from_dec_str(s).map_err(|e| format!("invalid amount {s:?}: {e:?}"))
    }
}

/// An [`Amount`] on the wire: a decimal string out, a string or integer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WireAmount(pub Amount);

impl From<Amount> for WireAmount {
    fn from(amount: Amount) -> Self {
        Self(amount)
    }
}

impl Serialize for WireAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for WireAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl Visitor<'_> for AmountVisitor {
            type Value = WireAmount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or a decimal/hex string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(WireAmount(Amount::from(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map(|v| WireAmount(Amount::from(v)))
                    .map_err(|_| E::custom("amount must not be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                parse_amount(v).map(WireAmount).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// One line of input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RequestEnvelope {
    /// Identity the host vouches for. Required for writes, ignored for reads.
    #[serde(default)]
    pub caller: Option<Identity>,
    pub request: Request,
}

/// Ledger operations, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    // ═══════════════════════════════════════════════════════════════════════
    // WRITES
    // ═══════════════════════════════════════════════════════════════════════
    CreateChat {
        other: Identity,
    },
    SendMessage {
        chat_id: ChatId,
        content: String,
        payment: WireAmount,
    },
    EditMessage {
        chat_id: ChatId,
        index: u64,
        content: String,
    },
    DeleteMessage {
        chat_id: ChatId,
        index: u64,
    },
    SetMessageFee {
        fee: WireAmount,
    },
    SetMaxMessageLength {
        max_length: usize,
    },
    WithdrawFees,
    TransferOwnership {
        new_owner: Identity,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // READS
    // ═══════════════════════════════════════════════════════════════════════
    GetChatId {
        a: Identity,
        b: Identity,
    },
    GetChat {
        chat_id: ChatId,
    },
    GetUserChats {
        identity: Identity,
    },
    GetMessages {
        chat_id: ChatId,
        #[serde(default)]
        offset: u64,
        #[serde(default = "default_page_size")]
        limit: u64,
    },
    GetMessage {
        chat_id: ChatId,
        index: u64,
    },
    GetMessageCount {
        chat_id: ChatId,
    },
    GetMessageFee,
    GetMaxMessageLength,
    GetOwner,
    GetFeePool,
    GetVersion,
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Request {
    /// True for operations that change the ledger.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::CreateChat { .. }
                | Self::SendMessage { .. }
                | Self::EditMessage { .. }
                | Self::DeleteMessage { .. }
                | Self::SetMessageFee { .. }
                | Self::SetMaxMessageLength { .. }
                | Self::WithdrawFees
                | Self::TransferOwnership { .. }
        )
    }

    /// The `op` tag.
    pub fn op(&self) -> &'static str {
        match self {
            Self::CreateChat { .. } => "create_chat",
            Self::SendMessage { .. } => "send_message",
            Self::EditMessage { .. } => "edit_message",
            Self::DeleteMessage { .. } => "delete_message",
            Self::SetMessageFee { .. } => "set_message_fee",
            Self::SetMaxMessageLength { .. } => "set_max_message_length",
            Self::WithdrawFees => "withdraw_fees",
            Self::TransferOwnership { .. } => "transfer_ownership",
            Self::GetChatId { .. } => "get_chat_id",
            Self::GetChat { .. } => "get_chat",
            Self::GetUserChats { .. } => "get_user_chats",
            Self::GetMessages { .. } => "get_messages",
            Self::GetMessage { .. } => "get_message",
            Self::GetMessageCount { .. } => "get_message_count",
            Self::GetMessageFee => "get_message_fee",
            Self::GetMaxMessageLength => "get_max_message_length",
            Self::GetOwner => "get_owner",
            Self::GetFeePool => "get_fee_pool",
            Self::GetVersion => "get_version",
        }
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// One line of output.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub correlation_id: CorrelationId,
    /// `op` of the request, absent if the line could not be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<&'static str>,
    pub outcome: Outcome,
    /// Events committed by this request.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<LedgerEvent>,
}

impl ResponseEnvelope {
    /// Response for a line that never reached the ledger.
    pub fn rejected(correlation_id: CorrelationId, err: &LedgerError) -> Self {
        Self {
            correlation_id,
            op: None,
            outcome: Outcome::Error(err.into()),
            events: Vec::new(),
        }
    }
}

/// Result of a request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum Outcome {
    Ok(ResponseData),
    Error(LedgerErrorPayload),
}

impl Outcome {
    /// True for `Ok`.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// Successful response data.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResponseData {
    ChatId(ChatId),
    Chat(Chat),
    ChatIds(Vec<ChatId>),
    Message(MessageView),
    Messages(Vec<MessageView>),
    Count(u64),
    Amount(WireAmount),
    Length(usize),
    Identity(Identity),
    Version(&'static str),
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_ledger::errors::ErrorKind;

    #[test]
    fn test_parse_send_message_request() {
        let line = r#"{
            "caller": "0x00000000000000000000000000000000000000aa",
            "request": {
                "op": "send_message",
                "chat_id": "0x0101010101010101010101010101010101010101010101010101010101010101",
                "content": "hi",
                "payment": "100000000000000000000"
            }
        }"#;
        let envelope: RequestEnvelope = serde_json::from_str(line).unwrap();
        assert!(envelope.caller.is_some());
        let Request::SendMessage { payment, .. } = &envelope.request else {
            panic!("expected send_message");
        };
        assert_eq!(
            payment.0,
            Amount::from(100_000_000_000_000_000_000u128)
        );
        assert!(envelope.request.is_write());
        assert_eq!(envelope.request.op(), "send_message");
    }

    #[test]
    fn test_amount_forms() {
        let from_number: WireAmount = serde_json::from_str("42").unwrap();
        let from_hex: WireAmount = serde_json::from_str("\"0x2a\"").unwrap();
        let from_dec: WireAmount = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(from_number, from_hex);
        assert_eq!(from_hex, from_dec);
        assert!(serde_json::from_str::<WireAmount>("-1").is_err());
        assert!(serde_json::from_str::<WireAmount>("\"ten\"").is_err());
        assert_eq!(serde_json::to_string(&from_dec).unwrap(), "\"42\"");
    }

    #[test]
    fn test_get_messages_defaults() {
        let request: Request = serde_json::from_str(
            r#"{"op":"get_messages","chat_id":"0x0202020202020202020202020202020202020202020202020202020202020202"}"#,
        )
        .unwrap();
        let Request::GetMessages { offset, limit, .. } = request else {
            panic!("expected get_messages");
        };
        assert_eq!(offset, 0);
        assert_eq!(limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_unit_ops_parse() {
        let request: Request = serde_json::from_str(r#"{"op":"withdraw_fees"}"#).unwrap();
        assert_eq!(request, Request::WithdrawFees);
        assert!(!serde_json::from_str::<Request>(r#"{"op":"get_owner"}"#)
            .unwrap()
            .is_write());
        assert!(serde_json::from_str::<Request>(r#"{"op":"mint"}"#).is_err());
    }

    #[test]
    fn test_response_shape() {
        let response = ResponseEnvelope {
            correlation_id: CorrelationId::new(),
            op: Some("get_message_count"),
            outcome: Outcome::Ok(ResponseData::Count(3)),
            events: Vec::new(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["outcome"]["status"], "ok");
        assert_eq!(json["outcome"]["body"]["kind"], "count");
        assert_eq!(json["outcome"]["body"]["value"], 3);
        assert!(json.get("events").is_none());
    }

    #[test]
    fn test_error_response_shape() {
        let err = LedgerError::MalformedInput("bad line".into());
        let json = serde_json::to_value(ResponseEnvelope::rejected(CorrelationId::new(), &err))
            .unwrap();
        assert_eq!(json["outcome"]["status"], "error");
        assert_eq!(json["outcome"]["body"]["kind"], "validation");
        assert!(json.get("op").is_none());
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
