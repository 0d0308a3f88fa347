//! # Request Handler
//!
//! Sequences requests against one ledger. Writes run one at a time under the
//! write lock; reads share the read lock and always see the last committed
//! state.

use crate::payloads::{
    CorrelationId, Outcome, Request, RequestEnvelope, ResponseData, ResponseEnvelope, WireAmount,
};
use chat_ledger::adapters::RecordingPublisher;
use chat_ledger::domain::entities::MessageView;
use chat_ledger::domain::value_objects::Identity;
use chat_ledger::errors::{LedgerError, LedgerResult};
use chat_ledger::events::LedgerEvent;
use chat_ledger::ports::inbound::{LedgerCommands, LedgerQueries};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared front door to a ledger.
pub struct RequestHandler<L> {
    ledger: Arc<RwLock<L>>,
    events: Arc<RecordingPublisher>,
}

impl<L> Clone for RequestHandler<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            events: Arc::clone(&self.events),
        }
    }
}

impl<L> RequestHandler<L>
where
    L: LedgerCommands + LedgerQueries,
{
    /// Wraps `ledger`, which must publish into `events`.
    pub fn new(ledger: L, events: Arc<RecordingPublisher>) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            events,
        }
    }

    /// Parses and executes one input line.
    pub fn handle_line(&self, line: &str) -> ResponseEnvelope {
        match serde_json::from_str::<RequestEnvelope>(line) {
            Ok(envelope) => self.handle(envelope),
            Err(err) => {
                let correlation_id = CorrelationId::new();
                let err = LedgerError::MalformedInput(err.to_string());
                warn!(%correlation_id, error = %err, "Unparseable request");
                ResponseEnvelope::rejected(correlation_id, &err)
            }
        }
    }

    /// Executes one parsed request.
    pub fn handle(&self, envelope: RequestEnvelope) -> ResponseEnvelope {
        let correlation_id = CorrelationId::new();
        let op = envelope.request.op();

        let (result, events) = if envelope.request.is_write() {
            match envelope.caller {
                Some(caller) => self.execute_write(caller, envelope.request),
                None => (
                    Err(LedgerError::MalformedInput(format!("{op} requires a caller"))),
                    Vec::new(),
                ),
            }
        } else {
            (self.execute_read(envelope.request), Vec::new())
        };

        let outcome = match result {
            Ok(data) => {
                debug!(%correlation_id, op, events = events.len(), "Request served");
                Outcome::Ok(data)
            }
            Err(err) => {
                info!(%correlation_id, op, kind = ?err.kind(), error = %err, "Request failed");
                Outcome::Error(err.into())
            }
        };

        ResponseEnvelope {
            correlation_id,
            op: Some(op),
            outcome,
            events,
        }
    }

    /// Runs a write and collects the events it committed.
    fn execute_write(
        &self,
        caller: Identity,
        request: Request,
    ) -> (LedgerResult<ResponseData>, Vec<LedgerEvent>) {
        let mut ledger = self.ledger.write();
        // Anything left over belongs to no request.
        self.events.drain();

        let result = match request {
            Request::CreateChat { other } => {
                ledger.create_chat(caller, other).map(ResponseData::ChatId)
            }
            Request::SendMessage {
                chat_id,
                content,
                payment,
            } => ledger
                .send_message(caller, chat_id, content, payment.0)
                .map(|message| ResponseData::Message(MessageView::from(&message))),
            Request::EditMessage {
                chat_id,
                index,
                content,
            } => ledger
                .edit_message(caller, chat_id, index, content)
                .map(|()| ResponseData::Done),
            Request::DeleteMessage { chat_id, index } => ledger
                .delete_message(caller, chat_id, index)
                .map(|()| ResponseData::Done),
            Request::SetMessageFee { fee } => ledger
                .set_message_fee(caller, fee.0)
                .map(|()| ResponseData::Done),
            Request::SetMaxMessageLength { max_length } => ledger
                .set_max_message_length(caller, max_length)
                .map(|()| ResponseData::Done),
            Request::WithdrawFees => ledger
                .withdraw_fees(caller)
                .map(|amount| ResponseData::Amount(WireAmount(amount))),
            Request::TransferOwnership { new_owner } => ledger
                .transfer_ownership(caller, new_owner)
                .map(|()| ResponseData::Done),
            read => Err(LedgerError::MalformedInput(format!(
                "{} is not a write",
                read.op()
            ))),
        };

        (result, self.events.drain())
    }

    fn execute_read(&self, request: Request) -> LedgerResult<ResponseData> {
        let ledger = self.ledger.read();
        match request {
            Request::GetChatId { a, b } => ledger.get_chat_id(a, b).map(ResponseData::ChatId),
            Request::GetChat { chat_id } => ledger.get_chat(chat_id).map(ResponseData::Chat),
            Request::GetUserChats { identity } => {
                ledger.get_user_chats(identity).map(ResponseData::ChatIds)
            }
            Request::GetMessages {
                chat_id,
                offset,
                limit,
            } => ledger.get_messages(chat_id, offset, limit).map(|page| {
                ResponseData::Messages(page.iter().map(MessageView::from).collect())
            }),
            Request::GetMessage { chat_id, index } => ledger
                .get_message(chat_id, index)
                .map(|message| ResponseData::Message(MessageView::from(&message))),
            Request::GetMessageCount { chat_id } => {
                ledger.get_message_count(chat_id).map(ResponseData::Count)
            }
            Request::GetMessageFee => ledger
                .get_message_fee()
                .map(|fee| ResponseData::Amount(WireAmount(fee))),
            Request::GetMaxMessageLength => {
                ledger.get_max_message_length().map(ResponseData::Length)
            }
            Request::GetOwner => ledger.get_owner().map(ResponseData::Identity),
            Request::GetFeePool => ledger
                .get_fee_pool()
                .map(|pool| ResponseData::Amount(WireAmount(pool))),
            Request::GetVersion => Ok(ResponseData::Version(ledger.get_version())),
            write => Err(LedgerError::MalformedInput(format!(
                "{} is not a read",
                write.op()
            ))),
        }
    }
}
