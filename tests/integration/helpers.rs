//! Shared test helpers for integration tests.
//!
//! [`FakeStore`] is an in-process axum server speaking the remote store's
//! REST dialect: temporary tokens, schema reads, record queries with
//! `where` clauses, upserts and deletes. Tests drive it through the real
//! reqwest transport via [`Services`].

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::{Json, Router};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use codepage_cli::Services;
use codepage_core::config::AppConfig;
use codepage_core::types::id::CollectionId;

/// Realm every request must name.
pub const REALM: &str = "acme.quickbase.com";
/// The only user token the fake accepts.
pub const USER_TOKEN: &str = "b7x3_user_token";
/// Codepages collection id.
pub const CODEPAGES: &str = "bqcodepages";
/// Versions collection id.
pub const VERSIONS: &str = "bqversions";

const CODEPAGE_SCHEMA: &[(u32, &str)] = &[
    (1, "Date Created"),
    (2, "Date Modified"),
    (3, "Record ID#"),
    (6, "Name"),
    (7, "Code"),
    (8, "Description"),
    (9, "Version"),
    (10, "Tags"),
    (11, "Dependencies"),
    (12, "Target Table ID"),
    (13, "Active"),
];

const VERSION_SCHEMA: &[(u32, &str)] = &[
    (1, "Date Created"),
    (2, "Date Modified"),
    (3, "Record ID#"),
    (6, "Codepage ID"),
    (7, "Version Label"),
    (8, "Code Snapshot"),
    (9, "Change Log"),
];

const RECORD_ID: u32 = 3;

type Row = HashMap<u32, Value>;

#[derive(Debug)]
struct Table {
    fields: Vec<(u32, &'static str)>,
    rows: BTreeMap<u64, Row>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, Table>,
    next_id: u64,
    tick: i64,
    /// Valid temporary tokens and the table each was issued for.
    tokens: HashMap<String, String>,
    issued: usize,
    data_requests: usize,
    failures: VecDeque<u16>,
    stalls: usize,
}

/// In-memory remote record store.
#[derive(Debug)]
pub struct FakeStore {
    inner: Mutex<Inner>,
    epoch: DateTime<Utc>,
}

impl FakeStore {
    fn new() -> Self {
        let mut inner = Inner::default();
        for (id, fields) in [(CODEPAGES, CODEPAGE_SCHEMA), (VERSIONS, VERSION_SCHEMA)] {
            inner.tables.insert(
                id.to_string(),
                Table {
                    fields: fields.to_vec(),
                    rows: BTreeMap::new(),
                },
            );
        }
        Self {
            inner: Mutex::new(inner),
            epoch: Utc::now() - Duration::days(1),
        }
    }

    /// Answer the next data requests with these statuses, in order.
    pub fn fail_next(&self, statuses: &[u16]) {
        self.inner
            .lock()
            .unwrap()
            .failures
            .extend(statuses.iter().copied());
    }

    /// Hold the next `count` data requests longer than a client's 1 s timeout.
    pub fn stall_next(&self, count: usize) {
        self.inner.lock().unwrap().stalls += count;
    }

    /// Invalidate every issued temporary token.
    pub fn revoke_tokens(&self) {
        self.inner.lock().unwrap().tokens.clear();
    }

    /// Number of temporary tokens issued so far.
    pub fn tokens_issued(&self) -> usize {
        self.inner.lock().unwrap().issued
    }

    /// Number of non-token requests received, failed ones included.
    pub fn data_requests(&self) -> usize {
        self.inner.lock().unwrap().data_requests
    }

    /// Remove columns from a table's schema by label. Must run before the
    /// table's schema is first read.
    pub fn drop_columns(&self, table: &str, labels: &[&str]) {
        if let Some(t) = self.inner.lock().unwrap().tables.get_mut(table) {
            t.fields.retain(|(_, label)| !labels.contains(label));
        }
    }

    /// Number of rows stored in a table.
    pub fn row_count(&self, table: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .tables
            .get(table)
            .map_or(0, |t| t.rows.len())
    }

    fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/auth/temporary/{table}", get(issue_token))
            .route("/fields", get(fields))
            .route("/records/query", post(query_records))
            .route("/records", post(upsert_records).delete(delete_records))
            .with_state(self)
    }

    /// Sleep through a queued stall, counting it as a data request.
    /// Returns whether the request was stalled.
    async fn stall(&self) -> bool {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.stalls == 0 {
                return false;
            }
            inner.stalls -= 1;
            inner.data_requests += 1;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        true
    }

    /// Count a data request and authorize it for `table`.
    fn admit(&self, headers: &HeaderMap, table: &str) -> Result<(), Response> {
        let mut inner = self.inner.lock().unwrap();
        inner.data_requests += 1;

        if let Some(status) = inner.failures.pop_front() {
            return Err(reply(status, json!({ "message": "Injected failure" })));
        }
        if header(headers, "QB-Realm-Hostname") != Some(REALM) {
            return Err(reply(401, json!({ "message": "Missing realm" })));
        }
        let token = header(headers, "Authorization").and_then(|v| v.strip_prefix("QB-TEMP-TOKEN "));
        match token.and_then(|t| inner.tokens.get(t)) {
            Some(issued_for) if issued_for == table => Ok(()),
            _ => Err(reply(401, json!({ "message": "Invalid or expired temporary token" }))),
        }
    }

    fn timestamp(&self, tick: i64) -> Value {
        json!((self.epoch + Duration::seconds(tick)).to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn reply(status: u16, body: Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

async fn issue_token(
    State(store): State<Arc<FakeStore>>,
    Path(table): Path<String>,
    headers: HeaderMap,
) -> Response {
    let expected = format!("QB-USER-TOKEN {USER_TOKEN}");
    if header(&headers, "Authorization") != Some(expected.as_str())
        || header(&headers, "QB-Realm-Hostname") != Some(REALM)
    {
        return reply(401, json!({ "message": "Invalid user token" }));
    }

    let mut inner = store.inner.lock().unwrap();
    if !inner.tables.contains_key(&table) {
        return reply(404, json!({ "message": "No such table" }));
    }
    inner.issued += 1;
    let token = format!("tmp-{}-{}", table, inner.issued);
    inner.tokens.insert(token.clone(), table);
    reply(200, json!({ "temporaryAuthorization": token }))
}

async fn fields(
    State(store): State<Arc<FakeStore>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let table = params.get("tableId").cloned().unwrap_or_default();
    if store.stall().await {
        return reply(504, json!({ "message": "Stalled" }));
    }
    if let Err(response) = store.admit(&headers, &table) {
        return response;
    }
    let inner = store.inner.lock().unwrap();
    match inner.tables.get(&table) {
        Some(t) => {
            let schema: Vec<Value> = t
                .fields
                .iter()
                .map(|(id, label)| json!({ "id": id, "label": label }))
                .collect();
            reply(200, Value::Array(schema))
        }
        None => reply(404, json!({ "message": "No such table" })),
    }
}

async fn query_records(
    State(store): State<Arc<FakeStore>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let table = body["from"].as_str().unwrap_or_default().to_string();
    if store.stall().await {
        return reply(504, json!({ "message": "Stalled" }));
    }
    if let Err(response) = store.admit(&headers, &table) {
        return response;
    }
    let clause = match body["where"].as_str() {
        Some(text) => match Clause::parse(text) {
            Some(c) => Some(c),
            None => return reply(400, json!({ "message": "Bad where clause" })),
        },
        None => None,
    };
    let select: Vec<u32> = body["select"]
        .as_array()
        .map(|ids| ids.iter().filter_map(|v| v.as_u64()).map(|v| v as u32).collect())
        .unwrap_or_default();
    let sort: Vec<(u32, bool)> = body["sortBy"]
        .as_array()
        .map(|keys| {
            keys.iter()
                .filter_map(|k| Some((k["fieldId"].as_u64()? as u32, k["order"] == "DESC")))
                .collect()
        })
        .unwrap_or_default();

    let inner = store.inner.lock().unwrap();
    let Some(t) = inner.tables.get(&table) else {
        return reply(404, json!({ "message": "No such table" }));
    };
    let mut rows: Vec<&Row> = t
        .rows
        .values()
        .filter(|row| clause.as_ref().is_none_or(|c| c.matches(row)))
        .collect();
    rows.sort_by(|a, b| {
        sort.iter()
            .map(|(fid, desc)| {
                let ord = compare(a.get(fid), b.get(fid));
                if *desc { ord.reverse() } else { ord }
            })
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some(top) = body["options"]["top"].as_u64() {
        rows.truncate(top as usize);
    }

    let data: Vec<Value> = rows
        .into_iter()
        .map(|row| {
            let mut out = Map::new();
            for (fid, value) in row {
                if select.is_empty() || select.contains(fid) {
                    out.insert(fid.to_string(), json!({ "value": value }));
                }
            }
            Value::Object(out)
        })
        .collect();
    reply(200, json!({ "data": data }))
}

async fn upsert_records(
    State(store): State<Arc<FakeStore>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let table = body["to"].as_str().unwrap_or_default().to_string();
    if store.stall().await {
        return reply(504, json!({ "message": "Stalled" }));
    }
    if let Err(response) = store.admit(&headers, &table) {
        return response;
    }

    let mut inner = store.inner.lock().unwrap();
    let mut created = Vec::new();
    let mut updated = Vec::new();
    let mut line_errors = Map::new();

    let records = body["data"].as_array().cloned().unwrap_or_default();
    for (line, record) in records.iter().enumerate() {
        let values: Row = record
            .as_object()
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|(fid, cell)| Some((fid.parse().ok()?, cell["value"].clone())))
                    .collect()
            })
            .unwrap_or_default();

        inner.tick += 1;
        let now = store.timestamp(inner.tick);

        match values.get(&RECORD_ID).and_then(Value::as_u64) {
            Some(id) => {
                let Some(row) = inner.tables.get_mut(&table).and_then(|t| t.rows.get_mut(&id)) else {
                    line_errors.insert(
                        (line + 1).to_string(),
                        json!([format!("Record ID# {id} does not exist")]),
                    );
                    continue;
                };
                row.extend(values);
                row.insert(2, now);
                updated.push(id);
            }
            None => {
                inner.next_id += 1;
                let id = inner.next_id;
                let mut row = values;
                row.insert(RECORD_ID, json!(id));
                row.insert(1, now.clone());
                row.insert(2, now);
                if let Some(t) = inner.tables.get_mut(&table) {
                    t.rows.insert(id, row);
                }
                created.push(id);
            }
        }
    }

    reply(
        200,
        json!({
            "metadata": {
                "createdRecordIds": created,
                "updatedRecordIds": updated,
                "unchangedRecordIds": [],
                "lineErrors": line_errors,
            }
        }),
    )
}

async fn delete_records(
    State(store): State<Arc<FakeStore>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let table = body["from"].as_str().unwrap_or_default().to_string();
    if store.stall().await {
        return reply(504, json!({ "message": "Stalled" }));
    }
    if let Err(response) = store.admit(&headers, &table) {
        return response;
    }
    let Some(clause) = body["where"].as_str().and_then(Clause::parse) else {
        return reply(400, json!({ "message": "Bad where clause" }));
    };

    let mut inner = store.inner.lock().unwrap();
    let Some(t) = inner.tables.get_mut(&table) else {
        return reply(404, json!({ "message": "No such table" }));
    };
    let before = t.rows.len();
    t.rows.retain(|_, row| !clause.matches(row));
    reply(200, json!({ "numberOfRecordsDeleted": before - t.rows.len() }))
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    match (a.and_then(Value::as_f64), b.and_then(Value::as_f64)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => text(a).cmp(&text(b)),
    }
}

/// Parsed `where` clause: `{fid.OP.'value'}` terms joined left to right
/// by `AND` / `OR`, with parenthesised groups.
#[derive(Debug)]
enum Clause {
    Term { fid: u32, op: String, value: String },
    And(Box<Clause>, Box<Clause>),
    Or(Box<Clause>, Box<Clause>),
}

impl Clause {
    fn parse(text: &str) -> Option<Self> {
        let mut parser = Parser {
            chars: text.chars().collect(),
            pos: 0,
        };
        let clause = parser.expr()?;
        parser.skip_ws();
        (parser.pos == parser.chars.len()).then_some(clause)
    }

    fn matches(&self, row: &Row) -> bool {
        match self {
            Clause::Term { fid, op, value } => {
                let actual = text(row.get(fid));
                match op.as_str() {
                    "EX" => actual.eq_ignore_ascii_case(value),
                    "CT" => actual.to_lowercase().contains(&value.to_lowercase()),
                    "HAS" => actual
                        .split([',', ';'])
                        .any(|item| item.trim().eq_ignore_ascii_case(value.trim())),
                    _ => false,
                }
            }
            Clause::And(a, b) => a.matches(row) && b.matches(row),
            Clause::Or(a, b) => a.matches(row) || b.matches(row),
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn skip_ws(&mut self) {
        while self.chars.get(self.pos).is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let end = self.pos + keyword.len();
        if end <= self.chars.len() && self.chars[self.pos..end].iter().copied().eq(keyword.chars()) {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Option<Clause> {
        let mut left = self.primary()?;
        loop {
            if self.eat("AND") {
                left = Clause::And(Box::new(left), Box::new(self.primary()?));
            } else if self.eat("OR") {
                left = Clause::Or(Box::new(left), Box::new(self.primary()?));
            } else {
                return Some(left);
            }
        }
    }

    fn primary(&mut self) -> Option<Clause> {
        if self.eat("(") {
            let inner = self.expr()?;
            return self.eat(")").then_some(inner);
        }
        if !self.eat("{") {
            return None;
        }
        let fid = self.until('.')?.parse().ok()?;
        let op = self.until('.')?;
        let value = if self.chars.get(self.pos) == Some(&'\'') {
            self.pos += 1;
            let mut value = String::new();
            loop {
                match *self.chars.get(self.pos)? {
                    '\\' => {
                        value.push(*self.chars.get(self.pos + 1)?);
                        self.pos += 2;
                    }
                    '\'' => {
                        self.pos += 1;
                        break;
                    }
                    c => {
                        value.push(c);
                        self.pos += 1;
                    }
                }
            }
            if self.chars.get(self.pos) != Some(&'}') {
                return None;
            }
            self.pos += 1;
            value
        } else {
            self.until('}')?
        };
        Some(Clause::Term { fid, op, value })
    }

    /// Consume up to and including `stop`, returning the text before it.
    fn until(&mut self, stop: char) -> Option<String> {
        let start = self.pos;
        let offset = self.chars[start..].iter().position(|c| *c == stop)?;
        self.pos = start + offset + 1;
        Some(self.chars[start..start + offset].iter().collect())
    }
}

/// Test application context
pub struct TestApp {
    /// The fake remote store
    pub store: Arc<FakeStore>,
    /// Configuration pointing at the fake
    pub config: AppConfig,
    /// Services wired through the real HTTP transport
    pub services: Services,
}

impl TestApp {
    /// Start a fake store and wire services against it
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Like [`TestApp::new`], adjusting the configuration first
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let store = Arc::new(FakeStore::new());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake store");
        let addr = listener.local_addr().expect("Fake store address");
        let router = store.clone().router();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Fake store crashed");
        });

        let mut config = test_config(&format!("http://{addr}"));
        adjust(&mut config);
        let services = Services::from_config(&config).expect("Failed to wire services");

        Self {
            store,
            config,
            services,
        }
    }

    /// The codepages collection
    pub fn codepages(&self) -> &CollectionId {
        self.services.codepage_collection()
    }
}

/// Configuration for a store at `base_url` with a 1 ms backoff unit.
pub fn test_config(base_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.store.base_url = base_url.to_string();
    config.store.realm_hostname = REALM.to_string();
    config.store.request_timeout_seconds = 5;
    config.auth.user_token = Some(USER_TOKEN.to_string());
    config.retry.backoff_unit_ms = 1;
    config.collections.codepages = CollectionId::new(CODEPAGES);
    config.collections.versions = CollectionId::new(VERSIONS);
    config
}
