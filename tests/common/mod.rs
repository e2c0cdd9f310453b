//! In-memory stand-in for the todo manager service
//!
//! Serves the same routes, status codes and body shapes as the reference
//! service, including its quirks: flags serialized as strings, item reads
//! wrapped in a one-element listing, only todo/project links mirrored, and
//! relation listings of absent owners answering 200.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use graphcheck_http::{HttpConfig, RestClient};
use graphcheck_model::{Relation, ResourceKind};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::debug;

type Fields = BTreeMap<String, String>;

/// A running mock bound to an ephemeral local port
pub struct MockService {
    pub addr: SocketAddr,
    store: Arc<Mutex<Store>>,
    stop: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl MockService {
    pub async fn start() -> anyhow::Result<Self> {
        let store = Arc::new(Mutex::new(Store::seeded()));
        let stop = Arc::new(Notify::new());

        let app = Router::new()
            .route("/", get(root))
            .route("/shutdown", get(shutdown))
            .fallback(dispatch)
            .with_state(AppState {
                store: store.clone(),
                stop: stop.clone(),
            });

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let signal = stop.clone();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move { signal.notified().await })
                .await;
        });

        Ok(Self {
            addr,
            store,
            stop,
            handle,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn client(&self) -> RestClient {
        RestClient::new(HttpConfig::with_endpoint(self.endpoint())).expect("client builds")
    }

    /// Number of stored resources of `kind`
    pub async fn count(&self, kind: ResourceKind) -> usize {
        self.store.lock().await.items.get(&kind).map_or(0, BTreeMap::len)
    }

    /// Wait for the server task to end after a `/shutdown` request
    pub async fn stopped(self) {
        let _ = self.handle.await;
    }

    pub async fn stop(self) {
        self.stop.notify_one();
        let _ = self.handle.await;
    }
}

/// Endpoint nothing listens on
pub fn dead_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/", addr)
}

#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<Store>>,
    stop: Arc<Notify>,
}

async fn root() -> &'static str {
    "todo manager mock"
}

async fn shutdown(State(state): State<AppState>) -> StatusCode {
    state.stop.notify_one();
    StatusCode::OK
}

#[derive(Default)]
struct Store {
    next_id: HashMap<ResourceKind, u64>,
    items: HashMap<ResourceKind, BTreeMap<u64, Fields>>,
    /// (relation, owner id, target id)
    links: HashSet<(Relation, u64, u64)>,
}

fn mirrored(relation: Relation) -> bool {
    matches!(relation, Relation::TaskProjects | Relation::ProjectTasks)
}

fn fields(pairs: &[(&str, &str)]) -> Fields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Store {
    fn seeded() -> Self {
        let mut store = Store::default();
        store.insert(
            ResourceKind::Task,
            fields(&[("title", "scan paperwork"), ("description", ""), ("doneStatus", "false")]),
        );
        store.insert(
            ResourceKind::Task,
            fields(&[("title", "file paperwork"), ("description", ""), ("doneStatus", "false")]),
        );
        store.insert(
            ResourceKind::Category,
            fields(&[("title", "Office"), ("description", "")]),
        );
        store.insert(
            ResourceKind::Category,
            fields(&[("title", "Home"), ("description", "")]),
        );
        store.insert(
            ResourceKind::Project,
            fields(&[
                ("title", "Office Work"),
                ("description", ""),
                ("completed", "false"),
                ("active", "false"),
            ]),
        );
        store.link(Relation::ProjectTasks, 1, 1);
        store.link(Relation::ProjectTasks, 1, 2);
        store
    }

    fn insert(&mut self, kind: ResourceKind, fields: Fields) -> u64 {
        let next = self.next_id.entry(kind).or_insert(1);
        let id = *next;
        *next += 1;
        self.items.entry(kind).or_default().insert(id, fields);
        id
    }

    fn exists(&self, kind: ResourceKind, id: u64) -> bool {
        self.items.get(&kind).is_some_and(|items| items.contains_key(&id))
    }

    fn fields_mut(&mut self, kind: ResourceKind, id: u64) -> Option<&mut Fields> {
        self.items.get_mut(&kind).and_then(|items| items.get_mut(&id))
    }

    fn all_ids(&self, kind: ResourceKind) -> Vec<u64> {
        self.items
            .get(&kind)
            .map(|items| items.keys().copied().collect())
            .unwrap_or_default()
    }

    fn targets(&self, relation: Relation, owner: u64) -> Vec<u64> {
        let mut targets: Vec<u64> = self
            .links
            .iter()
            .filter(|(r, o, _)| *r == relation && *o == owner)
            .map(|(_, _, t)| *t)
            .collect();
        targets.sort_unstable();
        targets
    }

    fn link(&mut self, relation: Relation, owner: u64, target: u64) {
        self.links.insert((relation, owner, target));
        if mirrored(relation) {
            self.links.insert((relation.reciprocal(), target, owner));
        }
    }

    fn unlink(&mut self, relation: Relation, owner: u64, target: u64) -> bool {
        let removed = self.links.remove(&(relation, owner, target));
        if removed && mirrored(relation) {
            self.links.remove(&(relation.reciprocal(), target, owner));
        }
        removed
    }

    fn remove(&mut self, kind: ResourceKind, id: u64) -> bool {
        let removed = self
            .items
            .get_mut(&kind)
            .is_some_and(|items| items.remove(&id).is_some());
        if removed {
            self.links.retain(|(relation, owner, target)| {
                !((relation.owner() == kind && *owner == id)
                    || (relation.target() == kind && *target == id))
            });
        }
        removed
    }

    fn render(&self, kind: ResourceKind, id: u64) -> Value {
        let mut object = Map::new();
        object.insert("id".into(), Value::String(id.to_string()));
        if let Some(fields) = self.items.get(&kind).and_then(|items| items.get(&id)) {
            for (name, value) in fields {
                object.insert(name.clone(), Value::String(value.clone()));
            }
        }
        for relation in kind.relations() {
            let targets = self.targets(relation, id);
            if !targets.is_empty() {
                let links = targets
                    .into_iter()
                    .map(|t| json!({ "id": t.to_string() }))
                    .collect();
                object.insert(relation.segment().into(), Value::Array(links));
            }
        }
        Value::Object(object)
    }

    fn listing(&self, kind: ResourceKind, ids: &[u64]) -> Value {
        let items: Vec<Value> = ids.iter().map(|id| self.render(kind, *id)).collect();
        let mut object = Map::new();
        object.insert(kind.collection().into(), Value::Array(items));
        Value::Object(object)
    }
}

/// A decoded request body
#[derive(Debug, Default)]
struct Submitted {
    id: Option<String>,
    attributes: Fields,
    links: Vec<(Relation, Vec<u64>)>,
}

fn text_value(name: &str, value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(format!("Invalid value for {}", name)),
    }
}

fn decode(kind: ResourceKind, content_type: Option<&str>, raw: &str) -> Result<Submitted, String> {
    let is_xml = content_type.is_some_and(|ct| ct.contains("xml"));
    let entries: Vec<(String, Value)> = if is_xml {
        decode_xml(raw)?
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect()
    } else {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(object)) => object.into_iter().collect(),
            _ => return Err("Invalid request body".into()),
        }
    };

    let mut submitted = Submitted::default();
    for (name, value) in entries {
        if name == "id" {
            submitted.id = Some(text_value(&name, &value)?);
        } else if kind.attributes().contains(&name.as_str()) {
            submitted.attributes.insert(name.clone(), text_value(&name, &value)?);
        } else if let (Some(relation), false) = (
            kind.relations().into_iter().find(|r| r.segment() == name),
            is_xml,
        ) {
            let Value::Array(items) = value else {
                return Err(format!("Invalid value for {}", name));
            };
            let ids = items
                .iter()
                .filter_map(|item| item.get("id"))
                .filter_map(|id| text_value("id", id).ok())
                .filter_map(|id| id.parse().ok())
                .collect();
            submitted.links.push((relation, ids));
        } else {
            return Err(format!("Could not find field: {}", name));
        }
    }
    Ok(submitted)
}

/// Children of the root element as name/text pairs
fn decode_xml(raw: &str) -> Result<Vec<(String, String)>, String> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut children = Vec::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                depth += 1;
                if depth == 2 {
                    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                    children.push((name, String::new()));
                } else if depth > 2 {
                    return Err("Nested elements are not supported".into());
                }
            }
            Ok(Event::Empty(element)) if depth == 1 => {
                let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                children.push((name, String::new()));
            }
            Ok(Event::Text(text)) if depth == 2 => {
                let value = text.unescape().map_err(|e| e.to_string())?.into_owned();
                if let Some((_, current)) = children.last_mut() {
                    current.push_str(&value);
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(format!("Malformed XML: {}", e)),
        }
    }
    Ok(children)
}

/// Attributes of a new or fully replaced resource: defaults overlaid with
/// what was submitted. The title is mandatory.
fn complete_attributes(kind: ResourceKind, submitted: &Fields) -> Result<Fields, String> {
    let title = submitted.get("title").filter(|t| !t.is_empty());
    if title.is_none() {
        return Err("title : field is mandatory".into());
    }
    let mut fields = Fields::new();
    for attribute in kind.attributes() {
        let default = if kind.flag_fields().contains(attribute) {
            "false"
        } else {
            ""
        };
        let value = submitted.get(*attribute).map_or(default, String::as_str);
        fields.insert(attribute.to_string(), value.to_string());
    }
    Ok(fields)
}

fn respond(status: StatusCode, body: Value) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    respond(status, json!({ "errorMessages": [message.into()] }))
}

fn empty(status: StatusCode) -> Response {
    status.into_response()
}

async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().trim_start_matches('/');
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return empty(StatusCode::NOT_FOUND);
    }
    let Some(kind) = ResourceKind::ALL
        .into_iter()
        .find(|k| k.collection() == segments[0])
    else {
        return empty(StatusCode::NOT_FOUND);
    };
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    debug!("mock {} /{}", method, path);

    let mut store = state.store.lock().await;
    let store = &mut *store;
    match segments.as_slice() {
        [_] => collection(store, kind, method.as_str(), content_type, &body),
        [_, id] => item(store, kind, id, method.as_str(), content_type, &body),
        [_, id, segment] => match kind.relations().into_iter().find(|r| r.segment() == *segment) {
            Some(relation) => relation_collection(store, relation, id, method.as_str(), content_type, &body),
            None => empty(StatusCode::NOT_FOUND),
        },
        [_, id, segment, target] => match kind.relations().into_iter().find(|r| r.segment() == *segment) {
            Some(relation) if method == Method::DELETE => relation_item(store, relation, id, target),
            Some(_) => empty(StatusCode::METHOD_NOT_ALLOWED),
            None => empty(StatusCode::NOT_FOUND),
        },
        _ => empty(StatusCode::NOT_FOUND),
    }
}

fn not_found(kind: ResourceKind, id: &str) -> Response {
    error(
        StatusCode::NOT_FOUND,
        format!("Could not find an instance with {}/{}", kind.collection(), id),
    )
}

fn collection(
    store: &mut Store,
    kind: ResourceKind,
    method: &str,
    content_type: Option<&str>,
    body: &str,
) -> Response {
    match method {
        "GET" | "HEAD" => {
            let ids = store.all_ids(kind);
            respond(StatusCode::OK, store.listing(kind, &ids))
        }
        "POST" => {
            let submitted = match decode(kind, content_type, body) {
                Ok(submitted) => submitted,
                Err(message) => return error(StatusCode::BAD_REQUEST, message),
            };
            if submitted.id.is_some() {
                return error(
                    StatusCode::BAD_REQUEST,
                    "Invalid Creation: Failed Validation: Not allowed to create with id",
                );
            }
            create(store, kind, &submitted)
        }
        _ => empty(StatusCode::METHOD_NOT_ALLOWED),
    }
}

/// Store a new resource and its submitted links; answers 201
fn create(store: &mut Store, kind: ResourceKind, submitted: &Submitted) -> Response {
    match create_id(store, kind, submitted) {
        Ok(id) => respond(StatusCode::CREATED, store.render(kind, id)),
        Err(message) => error(StatusCode::BAD_REQUEST, message),
    }
}

fn create_id(store: &mut Store, kind: ResourceKind, submitted: &Submitted) -> Result<u64, String> {
    let attributes = complete_attributes(kind, &submitted.attributes)?;
    let id = store.insert(kind, attributes);
    for (relation, targets) in &submitted.links {
        for target in targets {
            if store.exists(relation.target(), *target) {
                store.link(*relation, id, *target);
            }
        }
    }
    Ok(id)
}

fn item(
    store: &mut Store,
    kind: ResourceKind,
    raw_id: &str,
    method: &str,
    content_type: Option<&str>,
    body: &str,
) -> Response {
    let id = match raw_id.parse::<u64>() {
        Ok(id) if store.exists(kind, id) => id,
        _ => return not_found(kind, raw_id),
    };

    match method {
        "GET" | "HEAD" => respond(StatusCode::OK, store.listing(kind, &[id])),
        "DELETE" => {
            store.remove(kind, id);
            empty(StatusCode::OK)
        }
        "POST" | "PUT" => {
            let submitted = match decode(kind, content_type, body) {
                Ok(submitted) => submitted,
                Err(message) => return error(StatusCode::BAD_REQUEST, message),
            };
            let replace = method == "PUT";
            let attributes = if replace {
                match complete_attributes(kind, &submitted.attributes) {
                    Ok(attributes) => attributes,
                    Err(message) => return error(StatusCode::BAD_REQUEST, message),
                }
            } else {
                submitted.attributes.clone()
            };
            if let Some(fields) = store.fields_mut(kind, id) {
                fields.extend(attributes);
            }
            for (relation, targets) in &submitted.links {
                if replace {
                    for existing in store.targets(*relation, id) {
                        store.unlink(*relation, id, existing);
                    }
                }
                for target in targets {
                    if store.exists(relation.target(), *target) {
                        store.link(*relation, id, *target);
                    }
                }
            }
            respond(StatusCode::OK, store.render(kind, id))
        }
        _ => empty(StatusCode::METHOD_NOT_ALLOWED),
    }
}

fn relation_collection(
    store: &mut Store,
    relation: Relation,
    raw_owner: &str,
    method: &str,
    content_type: Option<&str>,
    body: &str,
) -> Response {
    let owner = raw_owner
        .parse::<u64>()
        .ok()
        .filter(|id| store.exists(relation.owner(), *id));

    match method {
        "GET" | "HEAD" => {
            // An absent owner still gets a (empty) listing
            let targets = owner.map(|o| store.targets(relation, o)).unwrap_or_default();
            respond(StatusCode::OK, store.listing(relation.target(), &targets))
        }
        "POST" => {
            let Some(owner) = owner else {
                return error(
                    StatusCode::NOT_FOUND,
                    format!(
                        "Could not find parent thing for relationship {}/{}/{}",
                        relation.owner().collection(),
                        raw_owner,
                        relation.segment()
                    ),
                );
            };
            let target_kind = relation.target();
            let submitted = match decode(target_kind, content_type, body) {
                Ok(submitted) => submitted,
                Err(message) => return error(StatusCode::BAD_REQUEST, message),
            };

            let target = match &submitted.id {
                // Naming an id links the existing resource untouched
                Some(raw) => match raw.parse::<u64>() {
                    Ok(id) if store.exists(target_kind, id) => id,
                    _ => return not_found(target_kind, raw),
                },
                None => match create_id(store, target_kind, &submitted) {
                    Ok(id) => id,
                    Err(message) => return error(StatusCode::BAD_REQUEST, message),
                },
            };
            store.link(relation, owner, target);
            respond(StatusCode::CREATED, store.render(target_kind, target))
        }
        _ => empty(StatusCode::METHOD_NOT_ALLOWED),
    }
}

fn relation_item(store: &mut Store, relation: Relation, raw_owner: &str, raw_target: &str) -> Response {
    let owner = raw_owner.parse::<u64>().ok();
    let target = raw_target.parse::<u64>().ok();
    match (owner, target) {
        (Some(owner), Some(target)) if store.unlink(relation, owner, target) => empty(StatusCode::OK),
        _ => error(
            StatusCode::NOT_FOUND,
            format!(
                "Could not find any instances with {}/{}/{}/{}",
                relation.owner().collection(),
                raw_owner,
                relation.segment(),
                raw_target
            ),
        ),
    }
}
