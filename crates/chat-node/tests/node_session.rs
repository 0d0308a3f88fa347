//! # Node Session Tests
//!
//! Runs scripted JSON-lines sessions against a file-backed ledger, the way
//! the binary does, and checks that state carries over between sessions.

use chat_ledger::adapters::{FileBackedKVStore, RecordingPublisher};
use chat_ledger::domain::entities::LedgerConfig;
use chat_ledger::domain::value_objects::Amount;
use chat_ledger::ports::outbound::SystemTimeSource;
use chat_ledger::service::ChatLedger;
use chat_node::config::load_config_from;
use chat_node::{serve, RequestHandler};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

const OWNER: &str = "0x00000000000000000000000000000000000000f0";
const ALICE: &str = "0x00000000000000000000000000000000000000a1";
const BOB: &str = "0x00000000000000000000000000000000000000b2";

fn open_handler(
    path: &Path,
    config: LedgerConfig,
) -> RequestHandler<ChatLedger<FileBackedKVStore, SystemTimeSource, Arc<RecordingPublisher>>> {
    let events = Arc::new(RecordingPublisher::new());
    let store = FileBackedKVStore::open(path).unwrap();
    let ledger = ChatLedger::open(store, SystemTimeSource, Arc::clone(&events), config).unwrap();
    RequestHandler::new(ledger, events)
}

async fn run_session<L>(handler: &RequestHandler<L>, script: &[String]) -> Vec<Value>
where
    L: chat_ledger::ports::inbound::LedgerCommands + chat_ledger::ports::inbound::LedgerQueries,
{
    let input = script.join("\n");
    let mut output = Vec::new();
    serve(handler, input.as_bytes(), &mut output).await.unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_session_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let node_config = load_config_from(|var| match var {
        "CHAT_DATA_DIR" => Some(dir.path().display().to_string()),
        "CHAT_OWNER" => Some(OWNER.to_string()),
        "CHAT_MESSAGE_FEE" => Some("1000".to_string()),
        _ => None,
    })
    .unwrap();
    node_config.validate().unwrap();
    let path = node_config.ledger_path();

    let chat_id = {
        let handler = open_handler(&path, node_config.ledger.clone());
        let created = run_session(
            &handler,
            &[format!(
                r#"{{"caller":"{ALICE}","request":{{"op":"create_chat","other":"{BOB}"}}}}"#
            )],
        )
        .await;
        let chat_id = created[0]["outcome"]["body"]["value"]
            .as_str()
            .unwrap()
            .to_string();

        let responses = run_session(
            &handler,
            &[
                format!(
                    r#"{{"caller":"{ALICE}","request":{{"op":"send_message","chat_id":"{chat_id}","content":"hi","payment":"1000"}}}}"#
                ),
                format!(
                    r#"{{"caller":"{BOB}","request":{{"op":"edit_message","chat_id":"{chat_id}","index":0,"content":"nope"}}}}"#
                ),
                format!(
                    r#"{{"caller":"{ALICE}","request":{{"op":"edit_message","chat_id":"{chat_id}","index":0,"content":"hi there"}}}}"#
                ),
                format!(
                    r#"{{"caller":"{ALICE}","request":{{"op":"delete_message","chat_id":"{chat_id}","index":0}}}}"#
                ),
            ],
        )
        .await;

        let statuses: Vec<_> = responses
            .iter()
            .map(|r| r["outcome"]["status"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(statuses, vec!["ok", "error", "ok", "ok"]);
        assert_eq!(responses[1]["outcome"]["body"]["kind"], "permission");
        assert_eq!(responses[3]["events"][0]["event"], "message_deleted");
        chat_id
    };

    // Restart with a different environment: persisted settings win.
    let handler = open_handler(&path, LedgerConfig::default());
    let responses = run_session(
        &handler,
        &[
            format!(r#"{{"request":{{"op":"get_message","chat_id":"{chat_id}","index":0}}}}"#),
            r#"{"request":{"op":"get_fee_pool"}}"#.to_string(),
            r#"{"request":{"op":"get_owner"}}"#.to_string(),
            format!(r#"{{"request":{{"op":"get_user_chats","identity":"{BOB}"}}}}"#),
        ],
    )
    .await;

    let message = &responses[0]["outcome"]["body"]["value"];
    assert_eq!(message["deleted"], true);
    assert_eq!(message["content"], "");
    assert!(message["updated_at"].as_u64().unwrap() > 0);
    assert_eq!(responses[1]["outcome"]["body"]["value"], "1000");
    assert_eq!(responses[2]["outcome"]["body"]["value"], OWNER);
    assert_eq!(responses[3]["outcome"]["body"]["value"][0], chat_id.as_str());

    assert_eq!(
        node_config.ledger.message_fee,
        Amount::from(1000u64),
        "fee came from CHAT_MESSAGE_FEE"
    );
}
