//! In-memory LoopBack server used by the integration tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, routing::post};
use serde_json::{Map, Value, json};

use loopback::{ClientConfig, RepositoryRegistry, RestConfig};

type Shared = Arc<Mutex<Store>>;

#[derive(Default)]
struct Store {
    next_id: i64,
    models: HashMap<String, BTreeMap<i64, Map<String, Value>>>,
    containers: BTreeMap<String, BTreeMap<String, StoredFile>>,
    hits: usize,
}

#[derive(Clone)]
struct StoredFile {
    content_type: String,
    data: Vec<u8>,
}

/// A running fake server and a registry connected to it.
pub struct TestServer {
    pub base_url: String,
    pub registry: RepositoryRegistry,
    store: Shared,
}

impl TestServer {
    /// Start a server on an ephemeral port.
    pub async fn start() -> Self {
        let store: Shared = Arc::default();
        let app = Router::new().nest("/api", routes()).with_state(store.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{addr}/api");
        let config = ClientConfig {
            rest: RestConfig::with_base_url(&base_url),
            ..ClientConfig::default()
        };
        let registry = loopback::connect(&config).expect("connect");
        Self {
            base_url,
            registry,
            store,
        }
    }

    /// Total requests the server has handled.
    pub fn hits(&self) -> usize {
        self.store.lock().unwrap().hits
    }

    /// Put a model record straight into the store.
    pub fn seed_model(&self, class: &str, properties: Value) -> i64 {
        let mut store = self.store.lock().unwrap();
        store.insert_model(class, properties.as_object().cloned().unwrap_or_default())
    }

    /// Put a file straight into the store.
    pub fn seed_file(&self, container: &str, name: &str, content_type: &str, data: &[u8]) {
        let mut store = self.store.lock().unwrap();
        store.containers.entry(container.to_string()).or_default().insert(
            name.to_string(),
            StoredFile {
                content_type: content_type.to_string(),
                data: data.to_vec(),
            },
        );
    }

    /// Read file content straight from the store.
    pub fn stored_file(&self, container: &str, name: &str) -> Option<Vec<u8>> {
        let store = self.store.lock().unwrap();
        store
            .containers
            .get(container)
            .and_then(|files| files.get(name))
            .map(|f| f.data.clone())
    }

    /// Whether a model record exists in the store.
    pub fn has_model(&self, class: &str, id: i64) -> bool {
        let store = self.store.lock().unwrap();
        store
            .models
            .get(class)
            .is_some_and(|records| records.contains_key(&id))
    }
}

impl Store {
    fn insert_model(&mut self, class: &str, mut properties: Map<String, Value>) -> i64 {
        self.next_id += 1;
        let id = self.next_id;
        properties.insert("id".into(), json!(id));
        self.models
            .entry(class.to_string())
            .or_default()
            .insert(id, properties);
        id
    }
}

fn routes() -> Router<Shared> {
    Router::new()
        .route("/containers", get(list_containers).post(create_container))
        .route(
            "/containers/{container}",
            get(get_container).delete(delete_container),
        )
        .route("/containers/{container}/upload", post(upload))
        .route("/containers/{container}/files", get(list_files))
        .route(
            "/containers/{container}/files/{name}",
            get(get_file).delete(delete_file),
        )
        .route("/containers/{container}/download/{name}", get(download))
        .route("/{class}", get(all_models).post(create_model))
        .route("/{class}/findOne", get(find_one))
        .route(
            "/{class}/{id}",
            get(find_model).put(update_model).delete(delete_model),
        )
        .route("/{class}/{id}/exists", get(model_exists))
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "error": {
            "statusCode": status.as_u16(),
            "name": "Error",
            "message": message,
        }
    });
    (status, Json(body)).into_response()
}

fn hit(store: &Shared) -> std::sync::MutexGuard<'_, Store> {
    let mut guard = store.lock().unwrap();
    guard.hits += 1;
    guard
}

fn file_json(container: &str, name: &str, file: &StoredFile) -> Value {
    json!({
        "container": container,
        "name": name,
        "type": file.content_type,
        "size": file.data.len(),
        "mtime": "2024-05-01T10:00:00.000Z",
    })
}

async fn all_models(State(store): State<Shared>, Path(class): Path<String>) -> Response {
    let store = hit(&store);
    let records: Vec<Value> = store
        .models
        .get(&class)
        .map(|records| records.values().cloned().map(Value::Object).collect())
        .unwrap_or_default();
    Json(records).into_response()
}

async fn create_model(
    State(store): State<Shared>,
    Path(class): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut store = hit(&store);
    let Value::Object(mut properties) = body else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "Body must be an object");
    };
    if properties.get("name").is_some_and(|n| n == "") {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "name can't be blank");
    }
    properties.remove("id");
    let id = store.insert_model(&class, properties);
    Json(Value::Object(store.models[&class][&id].clone())).into_response()
}

async fn find_model(
    State(store): State<Shared>,
    Path((class, id)): Path<(String, i64)>,
) -> Response {
    let store = hit(&store);
    match store.models.get(&class).and_then(|records| records.get(&id)) {
        Some(record) => Json(Value::Object(record.clone())).into_response(),
        None => error(StatusCode::NOT_FOUND, &format!("Unknown \"{class}\" id \"{id}\".")),
    }
}

async fn update_model(
    State(store): State<Shared>,
    Path((class, id)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> Response {
    let mut store = hit(&store);
    let Some(record) = store.models.get_mut(&class).and_then(|r| r.get_mut(&id)) else {
        return error(StatusCode::NOT_FOUND, &format!("Unknown \"{class}\" id \"{id}\"."));
    };
    let Value::Object(mut properties) = body else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "Body must be an object");
    };
    properties.insert("id".into(), json!(id));
    *record = properties;
    Json(Value::Object(record.clone())).into_response()
}

async fn delete_model(
    State(store): State<Shared>,
    Path((class, id)): Path<(String, i64)>,
) -> Response {
    let mut store = hit(&store);
    let removed = store
        .models
        .get_mut(&class)
        .and_then(|records| records.remove(&id))
        .is_some();
    Json(json!({ "count": usize::from(removed) })).into_response()
}

async fn model_exists(
    State(store): State<Shared>,
    Path((class, id)): Path<(String, i64)>,
) -> Response {
    let store = hit(&store);
    let exists = store
        .models
        .get(&class)
        .is_some_and(|records| records.contains_key(&id));
    Json(json!({ "exists": exists })).into_response()
}

async fn find_one(
    State(store): State<Shared>,
    Path(class): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let store = hit(&store);
    let filter: Value = query
        .get("filter")
        .and_then(|f| serde_json::from_str(f).ok())
        .unwrap_or_default();
    let conditions = filter
        .get("where")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let found = store.models.get(&class).and_then(|records| {
        records
            .values()
            .find(|record| conditions.iter().all(|(k, v)| record.get(k) == Some(v)))
    });
    match found {
        Some(record) => Json(Value::Object(record.clone())).into_response(),
        None => error(StatusCode::NOT_FOUND, &format!("Unknown \"{class}\" filter")),
    }
}

async fn list_containers(State(store): State<Shared>) -> Response {
    let store = hit(&store);
    let containers: Vec<Value> = store
        .containers
        .iter()
        .map(|(name, files)| {
            let size: usize = files.values().map(|f| f.data.len()).sum();
            json!({ "name": name, "size": size })
        })
        .collect();
    Json(containers).into_response()
}

async fn create_container(State(store): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut store = hit(&store);
    let Some(name) = body.get("name").and_then(Value::as_str) else {
        return error(StatusCode::BAD_REQUEST, "Container name is required");
    };
    if store.containers.contains_key(name) {
        return error(StatusCode::CONFLICT, "Container already exists");
    }
    store.containers.insert(name.to_string(), BTreeMap::new());
    Json(json!({ "name": name, "size": 0 })).into_response()
}

async fn get_container(State(store): State<Shared>, Path(container): Path<String>) -> Response {
    let store = hit(&store);
    match store.containers.get(&container) {
        Some(_) => Json(json!({ "name": container })).into_response(),
        None => error(StatusCode::NOT_FOUND, "Container not found"),
    }
}

async fn delete_container(State(store): State<Shared>, Path(container): Path<String>) -> Response {
    let mut store = hit(&store);
    match store.containers.remove(&container) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error(StatusCode::NOT_FOUND, "Container not found"),
    }
}

async fn upload(
    State(store): State<Shared>,
    Path(container): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let mut stored = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let Ok(data) = field.bytes().await else {
            return error(StatusCode::BAD_REQUEST, "Truncated upload");
        };
        stored.push((
            name,
            StoredFile {
                content_type,
                data: data.to_vec(),
            },
        ));
    }

    let mut store = hit(&store);
    let Some(files) = store.containers.get_mut(&container) else {
        return error(StatusCode::NOT_FOUND, "Container not found");
    };
    let entries: Vec<Value> = stored
        .into_iter()
        .map(|(name, file)| {
            let entry = file_json(&container, &name, &file);
            files.insert(name, file);
            entry
        })
        .collect();
    if entries.is_empty() {
        return error(StatusCode::BAD_REQUEST, "No file content uploaded");
    }
    Json(json!({ "result": { "files": { "file": entries }, "fields": {} } })).into_response()
}

async fn list_files(State(store): State<Shared>, Path(container): Path<String>) -> Response {
    let store = hit(&store);
    match store.containers.get(&container) {
        Some(files) => {
            let entries: Vec<Value> = files
                .iter()
                .map(|(name, file)| file_json(&container, name, file))
                .collect();
            Json(entries).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Container not found"),
    }
}

async fn get_file(
    State(store): State<Shared>,
    Path((container, name)): Path<(String, String)>,
) -> Response {
    let store = hit(&store);
    match store.containers.get(&container).and_then(|f| f.get(&name)) {
        Some(file) => Json(file_json(&container, &name, file)).into_response(),
        None => error(StatusCode::NOT_FOUND, "File not found"),
    }
}

async fn delete_file(
    State(store): State<Shared>,
    Path((container, name)): Path<(String, String)>,
) -> Response {
    let mut store = hit(&store);
    match store.containers.get_mut(&container).and_then(|f| f.remove(&name)) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error(StatusCode::NOT_FOUND, "File not found"),
    }
}

async fn download(
    State(store): State<Shared>,
    Path((container, name)): Path<(String, String)>,
) -> Response {
    let store = hit(&store);
    match store.containers.get(&container).and_then(|f| f.get(&name)) {
        Some(file) => (
            [(header::CONTENT_TYPE, file.content_type.clone())],
            file.data.clone(),
        )
            .into_response(),
        None => error(StatusCode::NOT_FOUND, "File not found"),
    }
}
