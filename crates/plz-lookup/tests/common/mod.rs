#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use plz_lookup::config::LookupConfig;
use plz_lookup::directory::{
    AddressDirectory, DirectoryError, LocalityQuery, LocalityRecord, Page, RegionRef,
};
use plz_lookup::AddressLookupController;
use tokio::sync::oneshot;

pub const DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub enum Reply {
    Records(Vec<LocalityRecord>),
    Unavailable,
}

#[derive(Debug, Clone)]
struct Script {
    reply: Reply,
    latency: Duration,
}

/// Directory double with canned replies and per-query latency. Unknown
/// queries answer with an empty list after 50 ms. A held query answers only
/// when the test releases it.
#[derive(Debug, Default)]
pub struct ScriptedDirectory {
    scripts: Mutex<HashMap<LocalityQuery, Script>>,
    held: Mutex<HashMap<LocalityQuery, oneshot::Receiver<Reply>>>,
    calls: Mutex<Vec<(LocalityQuery, Page)>>,
}

impl ScriptedDirectory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, query: LocalityQuery, records: Vec<LocalityRecord>) {
        self.script(query, Reply::Records(records), Duration::from_millis(50));
    }

    pub fn script(&self, query: LocalityQuery, reply: Reply, latency: Duration) {
        self.scripts
            .lock()
            .expect("scripts mutex")
            .insert(query, Script { reply, latency });
    }

    /// The next search for `query` waits for the returned sender. Dropping
    /// the sender answers with an empty list.
    pub fn hold(&self, query: LocalityQuery) -> oneshot::Sender<Reply> {
        let (release, reply) = oneshot::channel();
        self.held.lock().expect("held mutex").insert(query, reply);
        release
    }

    pub fn calls(&self) -> Vec<(LocalityQuery, Page)> {
        self.calls.lock().expect("calls mutex").clone()
    }

    pub fn queries(&self) -> Vec<LocalityQuery> {
        self.calls().into_iter().map(|(query, _)| query).collect()
    }
}

#[async_trait]
impl AddressDirectory for ScriptedDirectory {
    async fn search(
        &self,
        query: &LocalityQuery,
        page: Page,
    ) -> Result<Vec<LocalityRecord>, DirectoryError> {
        self.calls
            .lock()
            .expect("calls mutex")
            .push((query.clone(), page));

        let held = self.held.lock().expect("held mutex").remove(query);
        if let Some(reply) = held {
            let reply = reply.await.unwrap_or(Reply::Records(Vec::new()));
            return answer(reply);
        }

        let script = self
            .scripts
            .lock()
            .expect("scripts mutex")
            .get(query)
            .cloned()
            .unwrap_or(Script {
                reply: Reply::Records(Vec::new()),
                latency: Duration::from_millis(50),
            });

        tokio::time::sleep(script.latency).await;
        answer(script.reply)
    }
}

fn answer(reply: Reply) -> Result<Vec<LocalityRecord>, DirectoryError> {
    match reply {
        Reply::Records(records) => Ok(records),
        Reply::Unavailable => Err(DirectoryError::Status {
            status: 503,
            body: "upstream maintenance".to_string(),
        }),
    }
}

pub fn lookup_controller(
    directory: &Arc<ScriptedDirectory>,
) -> AddressLookupController<Arc<ScriptedDirectory>> {
    AddressLookupController::new(
        Arc::clone(directory),
        LookupConfig {
            debounce: DEBOUNCE,
            min_query_len: 3,
        },
    )
}

pub fn name(value: &str) -> LocalityQuery {
    LocalityQuery::Name(value.to_string())
}

pub fn postal_code(value: &str) -> LocalityQuery {
    LocalityQuery::PostalCode(value.to_string())
}

pub fn record(postal_code: &str, name: &str, state_key: &str, state_name: &str) -> LocalityRecord {
    LocalityRecord {
        postal_code: postal_code.to_string(),
        name: name.to_string(),
        municipality: RegionRef {
            key: format!("{state_key}000000"),
            name: name.to_string(),
        },
        federal_state: RegionRef {
            key: state_key.to_string(),
            name: state_name.to_string(),
        },
    }
}

pub fn berlin_records() -> Vec<LocalityRecord> {
    vec![
        record("13353", "Berlin", "11", "Berlin"),
        record("10115", "Berlin", "11", "Berlin"),
        record("14195", "Berlin", "11", "Berlin"),
    ]
}
