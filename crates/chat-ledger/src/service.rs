//! # Chat Ledger Service
//!
//! The transactional state machine over a [`KeyValueStore`].
//!
//! Every write follows the same path:
//!
//! 1. Load the records it touches from the store
//! 2. Run permission, content and fee checks in a fixed order
//! 3. Stage all changed records and events into one [`WriteBatch`]
//! 4. Commit with a single `atomic_batch_write`, then publish the events
//!
//! A failure at any step returns before step 4 (or inside it), so the store
//! holds either all of an operation's effects or none of them.

use crate::adapters::{InMemoryKVStore, NoOpPublisher};
use crate::domain::access::{require_original_sender, require_owner, require_participant};
use crate::domain::entities::{LedgerConfig, LedgerSettings, Message, SCHEMA_VERSION};
use crate::domain::fees::FeeGate;
use crate::domain::invariants::{
    check_chat_log, check_indexed, InvariantCheckResult, InvariantViolation,
};
use crate::domain::value_objects::{Amount, ChatId, Identity};
use crate::errors::{LedgerError, LedgerResult, StoreError};
use crate::events::LedgerEvent;
use crate::ledger::keys::{read_record, SETTINGS_KEY};
use crate::ledger::{ChatRegistry, MessageLog, WriteBatch};
use crate::ports::inbound::LedgerCommands;
use crate::ports::outbound::{EventPublisher, KeyValueStore, SystemTimeSource, TimeSource};
use tracing::{debug, info, instrument, warn};

/// Counters for the writes a ledger has processed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LedgerStats {
    /// Batches written to the store.
    pub committed_writes: u64,
    /// Writes rejected by a check or a failed commit.
    pub rejected_writes: u64,
    /// Events handed to the publisher.
    pub events_published: u64,
    /// Events the publisher refused.
    pub publish_failures: u64,
}

/// Outcome of [`ChatLedger::audit`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub chats_checked: usize,
    pub messages_checked: u64,
    pub violations: Vec<(ChatId, InvariantViolation)>,
}

impl AuditReport {
    /// True if no invariant is violated.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// The chat ledger.
///
/// Writes take `&mut self` and reads take `&self`; the ledger does no
/// locking of its own. Hosts that share it across tasks wrap it in a lock.
pub struct ChatLedger<S, T = SystemTimeSource, P = NoOpPublisher>
where
    S: KeyValueStore,
    T: TimeSource,
    P: EventPublisher,
{
    store: S,
    clock: T,
    publisher: P,
    stats: LedgerStats,
}

impl ChatLedger<InMemoryKVStore> {
    /// Volatile ledger on the system clock, for tests and tooling.
    pub fn in_memory(config: LedgerConfig) -> LedgerResult<Self> {
        Self::open(InMemoryKVStore::new(), SystemTimeSource, NoOpPublisher, config)
    }
}

impl<S, T, P> ChatLedger<S, T, P>
where
    S: KeyValueStore,
    T: TimeSource,
    P: EventPublisher,
{
    /// Opens a ledger over `store`.
    ///
    /// An empty store is initialized from `config`; otherwise the persisted
    /// settings win and `config` is ignored.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ZeroIdentity`] / [`LedgerError::InvalidMaxLength`]
    ///   if an empty store is opened with an unusable config
    /// - [`LedgerError::Store`] on I/O failure or an unknown schema version
    pub fn open(
        mut store: S,
        clock: T,
        publisher: P,
        config: LedgerConfig,
    ) -> LedgerResult<Self> {
        match read_record::<_, LedgerSettings>(&store, SETTINGS_KEY)? {
            Some(settings) => {
                if settings.schema_version != SCHEMA_VERSION {
                    return Err(StoreError::Corruption {
                        message: format!(
                            "unsupported schema version {} (expected {})",
                            settings.schema_version, SCHEMA_VERSION
                        ),
                    }
                    .into());
                }
                info!(owner = %settings.owner, "Opened existing ledger");
            }
            None => {
                if config.owner.is_zero() {
                    return Err(LedgerError::ZeroIdentity);
                }
                if config.max_message_length == 0 {
                    return Err(LedgerError::InvalidMaxLength);
                }
                let settings = LedgerSettings::from(&config);
                let mut batch = WriteBatch::new();
                batch.put(SETTINGS_KEY.to_vec(), &settings)?;
                let (operations, _) = batch.into_parts();
                store.atomic_batch_write(operations)?;
                info!(
                    owner = %settings.owner,
                    message_fee = %settings.message_fee,
                    max_message_length = settings.max_message_length,
                    "Initialized new ledger"
                );
            }
        }

        Ok(Self {
            store,
            clock,
            publisher,
            stats: LedgerStats::default(),
        })
    }

    /// The persisted settings record.
    pub fn settings(&self) -> LedgerResult<LedgerSettings> {
        read_record(&self.store, SETTINGS_KEY)?.ok_or_else(|| {
            LedgerError::from(StoreError::Corruption {
                message: "settings record missing".to_string(),
            })
        })
    }

    /// Write counters since this ledger was opened.
    #[must_use]
    pub fn stats(&self) -> &LedgerStats {
        &self.stats
    }

    /// The event publisher.
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Closes the ledger, handing back its store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Checks every stored chat against its log and the reverse index.
    pub fn audit(&self) -> LedgerResult<AuditReport> {
        let registry = ChatRegistry::new(&self.store);
        let log = MessageLog::new(&self.store);
        let mut report = AuditReport::default();

        for chat in registry.all()? {
            let entries = log.scan(&chat.id)?;
            report.chats_checked += 1;
            report.messages_checked += entries.len() as u64;

            if let InvariantCheckResult::Invalid(violations) = check_chat_log(&chat, &entries) {
                report
                    .violations
                    .extend(violations.into_iter().map(|v| (chat.id, v)));
            }
            for participant in [chat.participant_a, chat.participant_b] {
                let chats = registry.user_chats(&participant)?;
                if let Some(violation) = check_indexed(&chat, participant, &chats) {
                    report.violations.push((chat.id, violation));
                }
            }
        }

        debug!(
            chats = report.chats_checked,
            messages = report.messages_checked,
            violations = report.violations.len(),
            "Audit finished"
        );
        Ok(report)
    }

    /// Writes `batch` in one call, then publishes its events.
    fn commit(&mut self, batch: WriteBatch) -> LedgerResult<()> {
        let (operations, events) = batch.into_parts();
        let writes = operations.len();
        self.store.atomic_batch_write(operations)?;
        self.stats.committed_writes += 1;
        debug!(writes, events = events.len(), "Batch committed");

        for event in &events {
            match self.publisher.publish(event) {
                Ok(()) => self.stats.events_published += 1,
                Err(err) => {
                    self.stats.publish_failures += 1;
                    warn!(event = event.name(), error = %err, "Event not published");
                }
            }
        }
        Ok(())
    }

    /// Logs and counts a rejected write.
    fn finish<R>(&mut self, operation: &'static str, result: LedgerResult<R>) -> LedgerResult<R> {
        if let Err(err) = &result {
            self.stats.rejected_writes += 1;
            warn!(operation, kind = ?err.kind(), error = %err, "Write rejected");
        }
        result
    }

    fn try_create_chat(&mut self, caller: Identity, other: Identity) -> LedgerResult<ChatId> {
        let now = self.clock.now();
        let mut batch = WriteBatch::new();
        let chat = ChatRegistry::new(&self.store).stage_create(caller, other, now, &mut batch)?;
        self.commit(batch)?;
        info!(chat_id = %chat.id, "Chat created");
        Ok(chat.id)
    }

    fn try_send_message(
        &mut self,
        caller: Identity,
        chat_id: ChatId,
        content: String,
        payment: Amount,
    ) -> LedgerResult<Message> {
        let registry = ChatRegistry::new(&self.store);
        let mut chat = registry.get(&chat_id)?;
        require_participant(&chat, &caller)?;

        let settings = self.settings()?;
        let gate = FeeGate::new(&settings);
        gate.validate_content(&content)?;
        let settings = gate.collect(payment)?;

        let now = self.clock.now();
        let mut batch = WriteBatch::new();
        let message = MessageLog::new(&self.store).stage_append(
            &mut chat,
            caller,
            content,
            now,
            &mut batch,
        )?;
        registry.stage_update(&chat, &mut batch)?;
        batch.put(SETTINGS_KEY.to_vec(), &settings)?;
        batch.emit(LedgerEvent::MessageSent {
            chat_id,
            index: message.index,
            sender: caller,
            fee_paid: payment,
            timestamp: now,
        });

        self.commit(batch)?;
        info!(index = message.index, fee_pool = %settings.fee_pool, "Message sent");
        Ok(message)
    }

    /// Loads a message the caller may modify.
    fn authored_message(
        &self,
        caller: Identity,
        chat_id: ChatId,
        index: u64,
    ) -> LedgerResult<Message> {
        ChatRegistry::new(&self.store).get(&chat_id)?;
        let message = MessageLog::new(&self.store).get(&chat_id, index)?;
        require_original_sender(&message, &caller)?;
        Ok(message)
    }

    fn try_edit_message(
        &mut self,
        caller: Identity,
        chat_id: ChatId,
        index: u64,
        new_content: String,
    ) -> LedgerResult<()> {
        let mut message = self.authored_message(caller, chat_id, index)?;
        let settings = self.settings()?;

        // Deleted is checked before content, so a deleted message reports
        // its state even for invalid content.
        message.edit(new_content, self.clock.now())?;
        FeeGate::new(&settings).validate_content(message.content())?;

        let mut batch = WriteBatch::new();
        MessageLog::new(&self.store).stage_update(&message, &mut batch)?;
        batch.emit(LedgerEvent::MessageEdited {
            chat_id,
            index,
            sender: caller,
            timestamp: message.updated_at(),
        });

        self.commit(batch)?;
        info!(updated_at = message.updated_at(), "Message edited");
        Ok(())
    }

    fn try_delete_message(
        &mut self,
        caller: Identity,
        chat_id: ChatId,
        index: u64,
    ) -> LedgerResult<()> {
        let mut message = self.authored_message(caller, chat_id, index)?;
        message.delete()?;

        let mut batch = WriteBatch::new();
        MessageLog::new(&self.store).stage_update(&message, &mut batch)?;
        batch.emit(LedgerEvent::MessageDeleted {
            chat_id,
            index,
            sender: caller,
            timestamp: self.clock.now(),
        });

        self.commit(batch)?;
        info!("Message deleted");
        Ok(())
    }

    /// Applies an owner-only change to the settings record.
    fn update_settings<R>(
        &mut self,
        caller: Identity,
        change: impl FnOnce(&mut LedgerSettings) -> LedgerResult<(R, LedgerEvent)>,
    ) -> LedgerResult<R> {
        let mut settings = self.settings()?;
        require_owner(&settings, &caller)?;
        let (output, event) = change(&mut settings)?;

        let mut batch = WriteBatch::new();
        batch.put(SETTINGS_KEY.to_vec(), &settings)?;
        batch.emit(event);
        self.commit(batch)?;
        Ok(output)
    }
}

impl<S, T, P> LedgerCommands for ChatLedger<S, T, P>
where
    S: KeyValueStore,
    T: TimeSource,
    P: EventPublisher,
{
    #[instrument(skip_all, fields(caller = %caller, other = %other))]
    fn create_chat(&mut self, caller: Identity, other: Identity) -> LedgerResult<ChatId> {
        let result = self.try_create_chat(caller, other);
        self.finish("create_chat", result)
    }

    #[instrument(
        skip_all,
        fields(caller = %caller, chat_id = %chat_id, len = content.len())
    )]
    fn send_message(
        &mut self,
        caller: Identity,
        chat_id: ChatId,
        content: String,
        payment: Amount,
    ) -> LedgerResult<Message> {
        let result = self.try_send_message(caller, chat_id, content, payment);
        self.finish("send_message", result)
    }

    #[instrument(skip_all, fields(caller = %caller, chat_id = %chat_id))]
    fn edit_message(
        &mut self,
        caller: Identity,
        chat_id: ChatId,
        index: u64,
        new_content: String,
    ) -> LedgerResult<()> {
        let result = self.try_edit_message(caller, chat_id, index, new_content);
        self.finish("edit_message", result)
    }

    #[instrument(skip_all, fields(caller = %caller, chat_id = %chat_id))]
    fn delete_message(
        &mut self,
        caller: Identity,
        chat_id: ChatId,
        index: u64,
    ) -> LedgerResult<()> {
        let result = self.try_delete_message(caller, chat_id, index);
        self.finish("delete_message", result)
    }

    #[instrument(skip_all, fields(caller = %caller, fee = %fee))]
    fn set_message_fee(&mut self, caller: Identity, fee: Amount) -> LedgerResult<()> {
        let result = self.update_settings(caller, |settings| {
            let old_fee = std::mem::replace(&mut settings.message_fee, fee);
            Ok((
                (),
                LedgerEvent::MessageFeeUpdated {
                    old_fee,
                    new_fee: fee,
                },
            ))
        });
        self.finish("set_message_fee", result)
    }

    #[instrument(skip_all, fields(caller = %caller))]
    fn set_max_message_length(
        &mut self,
        caller: Identity,
        max_length: usize,
    ) -> LedgerResult<()> {
        let result = self.update_settings(caller, |settings| {
            if max_length == 0 {
                return Err(LedgerError::InvalidMaxLength);
            }
            let old_length = std::mem::replace(&mut settings.max_message_length, max_length);
            Ok((
                (),
                LedgerEvent::MaxMessageLengthUpdated {
                    old_length,
                    new_length: max_length,
                },
            ))
        });
        self.finish("set_max_message_length", result)
    }

    #[instrument(skip_all, fields(caller = %caller))]
    fn withdraw_fees(&mut self, caller: Identity) -> LedgerResult<Amount> {
        let result = self.update_settings(caller, |settings| {
            let amount = std::mem::take(&mut settings.fee_pool);
            Ok((
                amount,
                LedgerEvent::FeesWithdrawn {
                    owner: caller,
                    amount,
                },
            ))
        });
        if let Ok(amount) = &result {
            info!(amount = %amount, "Fees withdrawn");
        }
        self.finish("withdraw_fees", result)
    }

    #[instrument(skip_all, fields(caller = %caller, new_owner = %new_owner))]
    fn transfer_ownership(&mut self, caller: Identity, new_owner: Identity) -> LedgerResult<()> {
        let result = self.update_settings(caller, |settings| {
            if new_owner.is_zero() {
                return Err(LedgerError::ZeroIdentity);
            }
            let previous_owner = std::mem::replace(&mut settings.owner, new_owner);
            Ok((
                (),
                LedgerEvent::OwnershipTransferred {
                    previous_owner,
                    new_owner,
                },
            ))
        });
        self.finish("transfer_ownership", result)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::RecordingPublisher;
    use crate::errors::ErrorKind;
    use crate::ledger::keys::{chat_key, message_key};
    use crate::ports::outbound::{BatchOperation, MockTimeSource};
    use std::sync::Arc;

    const OWNER: Identity = Identity([0x01; 20]);
    const A: Identity = Identity([0xAA; 20]);
    const B: Identity = Identity([0xBB; 20]);
    const C: Identity = Identity([0xCC; 20]);

    type TestLedger = ChatLedger<InMemoryKVStore, Arc<MockTimeSource>, Arc<RecordingPublisher>>;

    struct Harness {
        ledger: TestLedger,
        clock: Arc<MockTimeSource>,
        events: Arc<RecordingPublisher>,
    }

    fn fee() -> Amount {
        Amount::from(100u64)
    }

    fn create_test_ledger() -> Harness {
        let clock = Arc::new(MockTimeSource::new(1_000));
        let events = Arc::new(RecordingPublisher::new());
        let config = LedgerConfig {
            owner: OWNER,
            message_fee: fee(),
            max_message_length: 16,
        };
        let ledger = ChatLedger::open(
            InMemoryKVStore::new(),
            Arc::clone(&clock),
            Arc::clone(&events),
            config,
        )
        .unwrap();
        Harness {
            ledger,
            clock,
            events,
        }
    }

    fn with_chat() -> (Harness, ChatId) {
        let mut h = create_test_ledger();
        let chat_id = h.ledger.create_chat(A, B).unwrap();
        h.events.drain();
        (h, chat_id)
    }

    #[test]
    fn test_open_rejects_unusable_config() {
        let zero_owner = ChatLedger::in_memory(LedgerConfig::default());
        assert!(matches!(zero_owner, Err(LedgerError::ZeroIdentity)));

        let zero_len = ChatLedger::in_memory(LedgerConfig {
            owner: OWNER,
            max_message_length: 0,
            ..LedgerConfig::default()
        });
        assert!(matches!(zero_len, Err(LedgerError::InvalidMaxLength)));
    }

    #[test]
    fn test_reopen_keeps_persisted_settings() {
        let mut h = create_test_ledger();
        h.ledger.set_message_fee(OWNER, Amount::from(5u64)).unwrap();
        let store = h.ledger.into_store();

        let reopened = ChatLedger::open(
            store,
            SystemTimeSource,
            NoOpPublisher,
            LedgerConfig {
                owner: C,
                ..LedgerConfig::default()
            },
        )
        .unwrap();
        let settings = reopened.settings().unwrap();
        assert_eq!(settings.owner, OWNER);
        assert_eq!(settings.message_fee, Amount::from(5u64));
    }

    #[test]
    fn test_create_chat_emits_event() {
        let mut h = create_test_ledger();
        let chat_id = h.ledger.create_chat(A, B).unwrap();
        assert_eq!(
            h.events.drain(),
            vec![LedgerEvent::ChatCreated {
                chat_id,
                creator: A,
                other: B,
                timestamp: 1_000,
            }]
        );
        assert_eq!(h.ledger.stats().committed_writes, 1);
    }

    #[test]
    fn test_send_collects_fee_and_appends() {
        let (mut h, chat_id) = with_chat();
        let message = h
            .ledger
            .send_message(B, chat_id, "hi".into(), Amount::from(150u64))
            .unwrap();
        assert_eq!(message.index, 0);
        assert_eq!(message.sender, B);
        assert_eq!(message.created_at, 1_000);

        let settings = h.ledger.settings().unwrap();
        assert_eq!(settings.fee_pool, Amount::from(150u64));
        assert_eq!(h.events.drain().len(), 1);

        let chat = ChatRegistry::new(h.ledger.store()).get(&chat_id).unwrap();
        assert_eq!(chat.message_count, 1);
        assert!(h.ledger.audit().unwrap().is_clean());
    }

    #[test]
    fn test_send_check_order() {
        let (mut h, chat_id) = with_chat();
        // Outsider with bad content and no payment: permission wins.
        let err = h
            .ledger
            .send_message(C, chat_id, String::new(), Amount::zero())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);

        // Participant with bad content and no payment: validation wins.
        let err = h
            .ledger
            .send_message(A, chat_id, String::new(), Amount::zero())
            .unwrap_err();
        assert_eq!(err, LedgerError::EmptyContent);

        let err = h
            .ledger
            .send_message(A, chat_id, "ok".into(), Amount::from(99u64))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Payment);
        assert_eq!(h.ledger.stats().rejected_writes, 3);
        assert!(h.events.drain().is_empty());
    }

    #[test]
    fn test_send_to_unknown_chat() {
        let mut h = create_test_ledger();
        let unknown = ChatId::new([3u8; 32]);
        assert_eq!(
            h.ledger.send_message(A, unknown, "x".into(), fee()),
            Err(LedgerError::ChatNotFound(unknown))
        );
    }

    #[test]
    fn test_edit_sets_monotonic_timestamp() {
        let (mut h, chat_id) = with_chat();
        h.ledger.send_message(A, chat_id, "one".into(), fee()).unwrap();

        h.clock.set(2_000);
        h.ledger.edit_message(A, chat_id, 0, "two".into()).unwrap();
        // A clock that moves backwards never rewinds updated_at.
        h.clock.set(1_500);
        h.ledger.edit_message(A, chat_id, 0, "three".into()).unwrap();

        let message = MessageLog::new(h.ledger.store()).get(&chat_id, 0).unwrap();
        assert_eq!(message.content(), "three");
        assert_eq!(message.updated_at(), 2_000);
        assert_eq!(message.created_at, 1_000);
    }

    #[test]
    fn test_edit_deleted_reports_state_before_content() {
        let (mut h, chat_id) = with_chat();
        h.ledger.send_message(A, chat_id, "one".into(), fee()).unwrap();
        h.ledger.delete_message(A, chat_id, 0).unwrap();

        let err = h
            .ledger
            .edit_message(A, chat_id, 0, String::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn test_edit_rejects_oversize_content() {
        let (mut h, chat_id) = with_chat();
        h.ledger.send_message(A, chat_id, "one".into(), fee()).unwrap();
        let err = h
            .ledger
            .edit_message(A, chat_id, 0, "x".repeat(17))
            .unwrap_err();
        assert_eq!(err, LedgerError::ContentTooLong { len: 17, max: 16 });

        let message = MessageLog::new(h.ledger.store()).get(&chat_id, 0).unwrap();
        assert_eq!(message.content(), "one");
        assert_eq!(message.updated_at(), 0);
    }

    #[test]
    fn test_delete_keeps_position_and_edit_time() {
        let (mut h, chat_id) = with_chat();
        h.ledger.send_message(A, chat_id, "one".into(), fee()).unwrap();
        h.clock.set(1_200);
        h.ledger.edit_message(A, chat_id, 0, "two".into()).unwrap();
        h.clock.set(1_300);
        h.ledger.delete_message(A, chat_id, 0).unwrap();

        let message = MessageLog::new(h.ledger.store()).get(&chat_id, 0).unwrap();
        assert!(message.is_deleted());
        assert_eq!(message.content(), "");
        assert_eq!(message.updated_at(), 1_200);
        assert_eq!(message.created_at, 1_000);

        assert_eq!(
            h.ledger.delete_message(A, chat_id, 0),
            Err(LedgerError::MessageDeleted { chat_id, index: 0 })
        );
    }

    #[test]
    fn test_admin_ops_owner_only() {
        let mut h = create_test_ledger();
        assert_eq!(
            h.ledger.set_message_fee(A, Amount::one()),
            Err(LedgerError::NotOwner(A))
        );
        assert_eq!(
            h.ledger.set_max_message_length(A, 5),
            Err(LedgerError::NotOwner(A))
        );
        assert_eq!(h.ledger.withdraw_fees(A), Err(LedgerError::NotOwner(A)));
        assert_eq!(
            h.ledger.transfer_ownership(A, A),
            Err(LedgerError::NotOwner(A))
        );
        assert_eq!(h.ledger.settings().unwrap().owner, OWNER);
    }

    #[test]
    fn test_admin_validation() {
        let mut h = create_test_ledger();
        assert_eq!(
            h.ledger.set_max_message_length(OWNER, 0),
            Err(LedgerError::InvalidMaxLength)
        );
        assert_eq!(
            h.ledger.transfer_ownership(OWNER, Identity::ZERO),
            Err(LedgerError::ZeroIdentity)
        );
        assert!(h.events.drain().is_empty());
    }

    #[test]
    fn test_withdraw_empties_pool() {
        let (mut h, chat_id) = with_chat();
        h.ledger.send_message(A, chat_id, "a".into(), fee()).unwrap();
        h.ledger.send_message(B, chat_id, "b".into(), fee()).unwrap();

        assert_eq!(h.ledger.withdraw_fees(OWNER).unwrap(), Amount::from(200u64));
        assert_eq!(h.ledger.settings().unwrap().fee_pool, Amount::zero());
        assert_eq!(h.ledger.withdraw_fees(OWNER).unwrap(), Amount::zero());
    }

    #[test]
    fn test_transfer_ownership_moves_admin_rights() {
        let mut h = create_test_ledger();
        h.ledger.transfer_ownership(OWNER, C).unwrap();
        assert_eq!(
            h.ledger.set_message_fee(OWNER, Amount::one()),
            Err(LedgerError::NotOwner(OWNER))
        );
        h.ledger.set_message_fee(C, Amount::one()).unwrap();
        assert_eq!(h.ledger.settings().unwrap().message_fee, Amount::one());
    }

    #[test]
    fn test_audit_clean_ledger() {
        let (mut h, chat_id) = with_chat();
        h.ledger.create_chat(A, C).unwrap();
        h.ledger.send_message(A, chat_id, "a".into(), fee()).unwrap();
        h.ledger.send_message(B, chat_id, "b".into(), fee()).unwrap();
        h.ledger.delete_message(B, chat_id, 1).unwrap();

        let report = h.ledger.audit().unwrap();
        assert!(report.is_clean(), "{:?}", report.violations);
        assert_eq!(report.chats_checked, 2);
        assert_eq!(report.messages_checked, 2);
    }

    #[test]
    fn test_audit_detects_tampering() {
        let (mut h, chat_id) = with_chat();
        h.ledger.send_message(A, chat_id, "a".into(), fee()).unwrap();

        // Forge a chat record that claims two messages.
        let mut chat = ChatRegistry::new(h.ledger.store()).get(&chat_id).unwrap();
        chat.message_count = 2;
        let forged = crate::ledger::keys::encode(&chat).unwrap();
        h.ledger
            .store
            .atomic_batch_write(vec![BatchOperation::put(chat_key(&chat_id), forged)])
            .unwrap();

        let report = h.ledger.audit().unwrap();
        assert_eq!(
            report.violations,
            vec![(
                chat_id,
                InvariantViolation::CountMismatch {
                    message_count: 2,
                    stored: 1
                }
            )]
        );
        assert!(h
            .ledger
            .store()
            .exists(&message_key(&chat_id, 0))
            .unwrap());
    }
}
