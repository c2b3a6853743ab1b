#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use rehab_tracker::charts::ChartConfig;
use rehab_tracker::ui::{ChartHandle, ChartRenderer, Prompt};
use rehab_tracker::{Dashboard, ResourceClient};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Exercises,
    Sessions,
}

impl Collection {
    fn path(self) -> &'static str {
        match self {
            Self::Exercises => "exercises",
            Self::Sessions => "sessions",
        }
    }

    fn not_found(self) -> Response {
        let detail = match self {
            Self::Exercises => "Exercise not found",
            Self::Sessions => "Session not found",
        };
        detail_response(StatusCode::NOT_FOUND, detail)
    }
}

fn detail_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn record_id(record: &Value) -> i64 {
    record["id"].as_i64().unwrap_or_default()
}

#[derive(Default)]
struct Store {
    exercises: Vec<Value>,
    sessions: Vec<Value>,
    next_id: i64,
    requests: Vec<String>,
    bodies: Vec<(String, Value)>,
    forced_failure: Option<(StatusCode, String)>,
    failing_list: Option<Collection>,
}

impl Store {
    fn records(&mut self, collection: Collection) -> &mut Vec<Value> {
        match collection {
            Collection::Exercises => &mut self.exercises,
            Collection::Sessions => &mut self.sessions,
        }
    }

    fn insert(&mut self, collection: Collection, mut record: Value) -> i64 {
        let id = match record["id"].as_i64() {
            Some(id) => id,
            None => self.next_id + 1,
        };
        self.next_id = self.next_id.max(id);
        record["id"] = json!(id);
        self.records(collection).push(record);
        id
    }

    fn exercise_exists(&self, id: i64) -> bool {
        self.exercises.iter().any(|record| record_id(record) == id)
    }
}

/// In-memory stand-in for the REST backend.
#[derive(Clone, Default)]
pub struct MockBackend {
    store: Arc<Mutex<Store>>,
}

impl MockBackend {
    pub fn seed_exercise(&self, record: Value) -> i64 {
        let record = exercise_record(record);
        self.store.lock().unwrap().insert(Collection::Exercises, record)
    }

    pub fn seed_session(&self, record: Value) -> i64 {
        let record = session_record(record);
        self.store.lock().unwrap().insert(Collection::Sessions, record)
    }

    pub fn exercise(&self, id: i64) -> Option<Value> {
        let store = self.store.lock().unwrap();
        store.exercises.iter().find(|r| record_id(r) == id).cloned()
    }

    pub fn session(&self, id: i64) -> Option<Value> {
        let store = self.store.lock().unwrap();
        store.sessions.iter().find(|r| record_id(r) == id).cloned()
    }

    /// Requests seen so far, as "METHOD /path".
    pub fn requests(&self) -> Vec<String> {
        self.store.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.store.lock().unwrap().requests.clear();
    }

    /// JSON body of the latest request whose "METHOD /path" starts with `prefix`.
    pub fn last_body(&self, prefix: &str) -> Option<Value> {
        let store = self.store.lock().unwrap();
        store
            .bodies
            .iter()
            .rev()
            .find(|(request, _)| request.starts_with(prefix))
            .map(|(_, body)| body.clone())
    }

    /// The next create, update or delete answers with this status and text.
    pub fn fail_next_mutation(&self, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.store.lock().unwrap().forced_failure = Some((status, body.to_string()));
    }

    /// The next list of `collection` answers 500.
    pub fn fail_next_list(&self, collection: Collection) {
        self.store.lock().unwrap().failing_list = Some(collection);
    }

    fn log(&self, request: String) {
        self.store.lock().unwrap().requests.push(request);
    }

    fn take_failure(&self) -> Option<Response> {
        let failure = self.store.lock().unwrap().forced_failure.take();
        failure.map(|(status, body)| (status, body).into_response())
    }

    fn list(&self, collection: Collection, query: HashMap<String, String>) -> Response {
        let mut store = self.store.lock().unwrap();
        if store.failing_list == Some(collection) {
            store.failing_list = None;
            return detail_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
        let mut records = store.records(collection).clone();
        if collection == Collection::Sessions {
            records.retain(|record| session_matches(record, &query));
        }
        match collection {
            Collection::Exercises => records.sort_by_key(record_id),
            Collection::Sessions => records.sort_by(|a, b| {
                let a_key = (a["date"].as_str().unwrap_or_default().to_string(), record_id(a));
                let b_key = (b["date"].as_str().unwrap_or_default().to_string(), record_id(b));
                b_key.cmp(&a_key)
            }),
        }
        Json(Value::Array(records)).into_response()
    }

    fn get(&self, collection: Collection, id: i64) -> Response {
        let mut store = self.store.lock().unwrap();
        match store.records(collection).iter().find(|r| record_id(r) == id) {
            Some(record) => Json(record.clone()).into_response(),
            None => collection.not_found(),
        }
    }

    fn create(&self, collection: Collection, body: Value) -> Response {
        self.store
            .lock()
            .unwrap()
            .bodies
            .push((format!("POST /{}", collection.path()), body.clone()));
        if let Some(failure) = self.take_failure() {
            return failure;
        }

        let mut store = self.store.lock().unwrap();
        let mut record = match collection {
            Collection::Exercises => {
                if let Err(response) = check_exercise(&body, true) {
                    return response;
                }
                exercise_record(body)
            }
            Collection::Sessions => {
                let exercise_id = body["exercise_id"].as_i64().unwrap_or_default();
                if !store.exercise_exists(exercise_id) {
                    return detail_response(StatusCode::BAD_REQUEST, "Exercise does not exist");
                }
                if let Err(response) = check_session(&body) {
                    return response;
                }
                session_record(body)
            }
        };
        if let Some(object) = record.as_object_mut() {
            object.remove("id");
        }
        let id = store.insert(collection, record);
        let created = store
            .records(collection)
            .iter()
            .find(|r| record_id(r) == id)
            .cloned()
            .unwrap_or_default();
        Json(created).into_response()
    }

    fn update(&self, collection: Collection, id: i64, body: Value) -> Response {
        self.store
            .lock()
            .unwrap()
            .bodies
            .push((format!("PUT /{}/{id}", collection.path()), body.clone()));
        if let Some(failure) = self.take_failure() {
            return failure;
        }

        let check = match collection {
            Collection::Exercises => check_exercise(&body, false),
            Collection::Sessions => check_session(&body),
        };
        if let Err(response) = check {
            return response;
        }

        let mut store = self.store.lock().unwrap();
        let Some(record) = store
            .records(collection)
            .iter_mut()
            .find(|r| record_id(r) == id)
        else {
            return collection.not_found();
        };
        // Every key that was sent is applied, explicit nulls included.
        if let (Some(target), Some(changes)) = (record.as_object_mut(), body.as_object()) {
            for (key, value) in changes {
                if key != "id" {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        Json(record.clone()).into_response()
    }

    fn delete(&self, collection: Collection, id: i64) -> Response {
        if let Some(failure) = self.take_failure() {
            return failure;
        }
        let mut store = self.store.lock().unwrap();
        let records = store.records(collection);
        let before = records.len();
        records.retain(|r| record_id(r) != id);
        if records.len() == before {
            return collection.not_found();
        }
        StatusCode::NO_CONTENT.into_response()
    }
}

fn session_matches(record: &Value, query: &HashMap<String, String>) -> bool {
    let date = record["date"].as_str().unwrap_or_default();
    if let Some(from) = query.get("from_date") {
        if date < from.as_str() {
            return false;
        }
    }
    if let Some(to) = query.get("to_date") {
        if date > to.as_str() {
            return false;
        }
    }
    if let Some(exercise_id) = query.get("exercise_id") {
        if record["exercise_id"].as_i64().map(|id| id.to_string()).as_deref()
            != Some(exercise_id.as_str())
        {
            return false;
        }
    }
    true
}

fn exercise_record(mut body: Value) -> Value {
    for key in ["target_sets", "target_reps", "target_hold_sec"] {
        if body.get(key).is_none() {
            body[key] = Value::Null;
        }
    }
    if body["schedule_dow"].is_null() {
        body["schedule_dow"] = json!([]);
    }
    body
}

fn session_record(mut body: Value) -> Value {
    for key in ["sets", "reps", "hold_sec", "pain_0_10", "rom_deg"] {
        if body.get(key).is_none() {
            body[key] = Value::Null;
        }
    }
    body
}

fn check_exercise(body: &Value, creating: bool) -> Result<(), Response> {
    let unprocessable = |detail: &str| detail_response(StatusCode::UNPROCESSABLE_ENTITY, detail);
    match body.get("name") {
        Some(Value::String(name)) if name.chars().count() >= 2 => {}
        None if !creating => {}
        _ => return Err(unprocessable("name: String should have at least 2 characters")),
    }
    match body.get("side").and_then(Value::as_str) {
        Some("left" | "right" | "both") => {}
        None if !creating => {}
        _ => return Err(unprocessable("side: Input should be 'left', 'right' or 'both'")),
    }
    match body.get("category").and_then(Value::as_str) {
        Some("strength" | "mobility" | "balance") => {}
        None if !creating => {}
        _ => {
            return Err(unprocessable(
                "category: Input should be 'strength', 'mobility' or 'balance'",
            ));
        }
    }
    Ok(())
}

fn check_session(body: &Value) -> Result<(), Response> {
    if let Some(pain) = body.get("pain_0_10").and_then(Value::as_i64) {
        if !(0..=10).contains(&pain) {
            return Err(detail_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "pain_0_10: Input should be less than or equal to 10",
            ));
        }
    }
    if let Some(rom) = body.get("rom_deg").and_then(Value::as_i64) {
        if !(0..=180).contains(&rom) {
            return Err(detail_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "rom_deg: Input should be less than or equal to 180",
            ));
        }
    }
    Ok(())
}

async fn record_request(
    State(backend): State<MockBackend>,
    request: Request,
    next: Next,
) -> Response {
    backend.log(format!("{} {}", request.method(), request.uri().path()));
    next.run(request).await
}

fn router(backend: MockBackend) -> Router {
    let mut app: Router<MockBackend> = Router::new().route(
        "/health",
        get(|| async { Json(json!({ "status": "ok", "db": "ok" })) }),
    );

    for collection in [Collection::Exercises, Collection::Sessions] {
        let base = format!("/{}", collection.path());
        app = app
            .route(
                &base,
                get(
                    move |State(backend): State<MockBackend>,
                          Query(query): Query<HashMap<String, String>>| async move {
                        backend.list(collection, query)
                    },
                )
                .post(
                    move |State(backend): State<MockBackend>, Json(body): Json<Value>| async move {
                        backend.create(collection, body)
                    },
                ),
            )
            .route(
                &format!("{base}/:id"),
                get(
                    move |State(backend): State<MockBackend>, Path(id): Path<i64>| async move {
                        backend.get(collection, id)
                    },
                )
                .put(
                    move |State(backend): State<MockBackend>,
                          Path(id): Path<i64>,
                          Json(body): Json<Value>| async move {
                        backend.update(collection, id, body)
                    },
                )
                .delete(
                    move |State(backend): State<MockBackend>, Path(id): Path<i64>| async move {
                        backend.delete(collection, id)
                    },
                ),
            );
    }

    app.layer(middleware::from_fn_with_state(backend.clone(), record_request))
        .with_state(backend)
}

pub struct TestServer {
    pub base_url: String,
    pub backend: MockBackend,
}

impl TestServer {
    pub fn client(&self) -> ResourceClient {
        ResourceClient::new(self.base_url.clone())
    }

    pub fn dashboard(&self) -> Dashboard<RecordingRenderer, ScriptedPrompt> {
        Dashboard::new(
            self.client(),
            RecordingRenderer::default(),
            ScriptedPrompt::default(),
        )
    }
}

pub async fn spawn_server() -> TestServer {
    let backend = MockBackend::default();
    let app = router(backend.clone());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind random port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend stopped");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        backend,
    }
}

/// Chart renderer that remembers every draw and which instances are live.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next: u64,
    pub live: Vec<(String, ChartHandle)>,
    pub draws: Vec<(String, ChartConfig)>,
    pub destroyed: Vec<ChartHandle>,
    pub max_live_per_canvas: usize,
}

impl RecordingRenderer {
    pub fn live_on(&self, canvas: &str) -> usize {
        self.live.iter().filter(|(c, _)| c == canvas).count()
    }

    pub fn draws_on(&self, canvas: &str) -> usize {
        self.draws.iter().filter(|(c, _)| c == canvas).count()
    }

    pub fn last_config(&self, canvas: &str) -> Option<&ChartConfig> {
        self.draws
            .iter()
            .rev()
            .find(|(c, _)| c == canvas)
            .map(|(_, config)| config)
    }
}

impl ChartRenderer for RecordingRenderer {
    fn draw(&mut self, canvas: &str, config: &ChartConfig) -> Option<ChartHandle> {
        self.next += 1;
        let handle = ChartHandle(self.next);
        self.live.push((canvas.to_string(), handle));
        self.draws.push((canvas.to_string(), config.clone()));
        self.max_live_per_canvas = self.max_live_per_canvas.max(self.live_on(canvas));
        Some(handle)
    }

    fn destroy(&mut self, handle: ChartHandle) {
        self.live.retain(|(_, live)| *live != handle);
        self.destroyed.push(handle);
    }
}

/// Prompt answering confirmations from a script; unscripted ones are declined.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    pub answers: VecDeque<bool>,
    pub confirmations: Vec<String>,
    pub alerts: Vec<String>,
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        self.confirmations.push(message.to_string());
        self.answers.pop_front().unwrap_or(false)
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
