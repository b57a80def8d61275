#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use journee_proches::{
    config::Config,
    domain::models::session::{Role, Session},
    domain::services::session_store::SessionStore,
    infra::factory::bootstrap_state_with_session,
    state::AppState,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

pub const ADMIN_ID: &str = "adm-1";

#[derive(Clone, Debug)]
pub struct StubSlot {
    pub capacity: u32,
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub admin_only: Option<bool>,
}

#[derive(Clone, Debug, Serialize)]
pub struct StubRegistration {
    pub code_personnel: String,
    pub nom: String,
    pub prenom: String,
    pub nombre_proches: u32,
    pub heure_arrivee: String,
    pub restauration_sur_place: bool,
    pub present: bool,
}

#[derive(Default)]
pub struct StubData {
    pub slots: BTreeMap<String, StubSlot>,
    pub registrations: BTreeMap<String, StubRegistration>,
    pub allow_list: BTreeMap<String, Value>,
    pub admins: Vec<Value>,
    /// "METHOD /path" for every request received, in order.
    pub requests: Vec<String>,
    pub bearer_tokens: Vec<Option<String>>,
    pub fail_board: bool,
    /// Replaces `heure` in the slot figures returned by mutations.
    pub info_heure: Option<String>,
}

impl StubData {
    fn persons_on(&self, heure: &str, excluding: Option<&str>) -> u32 {
        self.registrations
            .values()
            .filter(|r| r.heure_arrivee == heure && Some(r.code_personnel.as_str()) != excluding)
            .map(|r| r.nombre_proches + 1)
            .sum()
    }

    fn board(&self) -> Value {
        let mut matin = serde_json::Map::new();
        let mut apres_midi = serde_json::Map::new();

        for (heure, slot) in &self.slots {
            let agents = self.registrations.values().filter(|r| &r.heure_arrivee == heure).count();
            let persons = self.persons_on(heure, None);
            let mut figures = json!({
                "agents_inscrits": agents,
                "personnes_total": persons,
                "places_restantes": slot.capacity as i64 - persons as i64,
                "complet": slot.capacity != 999 && persons >= slot.capacity,
                "bloque": slot.blocked,
                "raison_blocage": slot.block_reason,
            });
            if let Some(flag) = slot.admin_only {
                figures["admin_only"] = json!(flag);
            }
            if heure.as_str() < "13:00" {
                matin.insert(heure.clone(), figures);
            } else {
                apres_midi.insert(heure.clone(), figures);
            }
        }

        json!({ "matin": matin, "apres-midi": apres_midi })
    }

    fn creneau_info(&self, heure: &str) -> Value {
        let capacity = self.slots[heure].capacity;
        let persons = self.persons_on(heure, None);
        json!({
            "heure": self.info_heure.as_deref().unwrap_or(heure),
            "personnes_total": persons,
            "places_restantes": capacity as i64 - persons as i64,
            "capacite": capacity,
        })
    }

    /// Applies the same admission rules as the real service.
    fn admit(&self, body: &Value, replacing: Option<&str>) -> Result<StubRegistration, Response> {
        let code = body["code_personnel"].as_str().unwrap_or_default().to_string();
        let heure = body["heure_arrivee"].as_str().unwrap_or_default().to_string();
        let guests = body["nombre_proches"].as_u64().unwrap_or_default() as u32;

        if !self.allow_list.is_empty() && !self.allow_list.contains_key(&code) {
            return Err(error(StatusCode::FORBIDDEN, "Agent non autorisé"));
        }
        let Some(slot) = self.slots.get(&heure) else {
            return Err(error(StatusCode::BAD_REQUEST, "Créneau inconnu"));
        };
        if slot.blocked {
            return Err(error(StatusCode::BAD_REQUEST, "Créneau bloqué"));
        }
        if slot.capacity != 999 && self.persons_on(&heure, replacing) + guests + 1 > slot.capacity {
            return Err(error(StatusCode::CONFLICT, "Créneau complet"));
        }

        Ok(StubRegistration {
            code_personnel: code,
            nom: body["nom"].as_str().unwrap_or_default().to_string(),
            prenom: body["prenom"].as_str().unwrap_or_default().to_string(),
            nombre_proches: guests,
            heure_arrivee: heure,
            restauration_sur_place: body["restauration_sur_place"].as_bool().unwrap_or_default(),
            present: false,
        })
    }
}

#[derive(Clone, Default)]
pub struct Stub(Arc<Mutex<StubData>>);

impl Stub {
    pub fn data(&self) -> MutexGuard<'_, StubData> {
        self.0.lock().unwrap()
    }

    pub fn add_slot(&self, heure: &str, capacity: u32) {
        self.data().slots.insert(
            heure.to_string(),
            StubSlot { capacity, blocked: false, block_reason: None, admin_only: None },
        );
    }

    pub fn seed_registration(&self, code: &str, guests: u32, heure: &str) {
        self.data().registrations.insert(
            code.to_string(),
            StubRegistration {
                code_personnel: code.to_string(),
                nom: format!("Nom{}", code),
                prenom: "Prenom".to_string(),
                nombre_proches: guests,
                heure_arrivee: heure.to_string(),
                restauration_sur_place: false,
                present: false,
            },
        );
    }

    pub fn requests(&self) -> Vec<String> {
        self.data().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.data().requests.len()
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn ok() -> Response {
    Json(json!({ "success": true })).into_response()
}

async fn record(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    {
        let mut data = stub.data();
        data.requests.push(format!("{} {}", method, uri.path()));
        data.bearer_tokens.push(
            headers
                .get("authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_string),
        );
    }
    next.run(request).await
}

async fn get_board(State(stub): State<Stub>) -> Response {
    let data = stub.data();
    if data.fail_board {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    Json(data.board()).into_response()
}

async fn create_registration(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let mut data = stub.data();
    let code = body["code_personnel"].as_str().unwrap_or_default().to_string();
    if data.registrations.contains_key(&code) {
        return error(StatusCode::BAD_REQUEST, "Agent déjà inscrit");
    }
    match data.admit(&body, None) {
        Ok(reg) => {
            let heure = reg.heure_arrivee.clone();
            data.registrations.insert(code, reg);
            Json(json!({ "success": true, "creneau_info": data.creneau_info(&heure) })).into_response()
        }
        Err(response) => response,
    }
}

async fn get_registration(State(stub): State<Stub>, Path(code): Path<String>) -> Response {
    match stub.data().registrations.get(&code) {
        Some(reg) => Json(reg.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Inscription introuvable"),
    }
}

async fn update_registration(State(stub): State<Stub>, Path(code): Path<String>, Json(body): Json<Value>) -> Response {
    let mut data = stub.data();
    if !data.registrations.contains_key(&code) {
        return error(StatusCode::NOT_FOUND, "Inscription introuvable");
    }
    match data.admit(&body, Some(&code)) {
        Ok(reg) => {
            let heure = reg.heure_arrivee.clone();
            data.registrations.insert(code, reg);
            Json(json!({ "success": true, "creneau_info": data.creneau_info(&heure) })).into_response()
        }
        Err(response) => response,
    }
}

async fn list_registrations(State(stub): State<Stub>) -> Response {
    let regs: Vec<StubRegistration> = stub.data().registrations.values().cloned().collect();
    Json(regs).into_response()
}

async fn delete_registration(State(stub): State<Stub>, Path(code): Path<String>) -> Response {
    match stub.data().registrations.remove(&code) {
        Some(_) => ok(),
        None => Json(json!({ "success": false, "error": "Inscription introuvable" })).into_response(),
    }
}

fn with_slot(stub: &Stub, heure: &str, apply: impl FnOnce(&mut StubSlot)) -> Response {
    match stub.data().slots.get_mut(heure) {
        Some(slot) => {
            apply(slot);
            ok()
        }
        None => error(StatusCode::NOT_FOUND, "Créneau inconnu"),
    }
}

async fn set_capacity(State(stub): State<Stub>, Path(heure): Path<String>, Json(body): Json<Value>) -> Response {
    let capacity = body["capacite"].as_u64().unwrap_or_default() as u32;
    with_slot(&stub, &heure, |slot| slot.capacity = capacity)
}

async fn block_slot(State(stub): State<Stub>, Path(heure): Path<String>, Json(body): Json<Value>) -> Response {
    let reason = body["raison"].as_str().map(str::to_string);
    with_slot(&stub, &heure, |slot| {
        slot.blocked = true;
        slot.block_reason = reason;
    })
}

async fn unblock_slot(State(stub): State<Stub>, Path(heure): Path<String>) -> Response {
    with_slot(&stub, &heure, |slot| {
        slot.blocked = false;
        slot.block_reason = None;
    })
}

async fn set_admin_only(State(stub): State<Stub>, Path(heure): Path<String>, Json(body): Json<Value>) -> Response {
    let flag = body["admin_only"].as_bool().unwrap_or_default();
    with_slot(&stub, &heure, |slot| slot.admin_only = Some(flag))
}

async fn list_personnel(State(stub): State<Stub>) -> Response {
    let entries: Vec<Value> = stub.data().allow_list.values().cloned().collect();
    Json(entries).into_response()
}

async fn add_personnel(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let code = body["code_personnel"].as_str().unwrap_or_default().to_string();
    stub.data().allow_list.insert(code, body.clone());
    Json(body).into_response()
}

async fn remove_personnel(State(stub): State<Stub>, Path(code): Path<String>) -> Response {
    stub.data().allow_list.remove(&code);
    ok()
}

async fn list_admins(State(stub): State<Stub>) -> Response {
    Json(stub.data().admins.clone()).into_response()
}

async fn create_admin(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let mut data = stub.data();
    let account = json!({ "id": format!("adm-{}", data.admins.len() + 1), "email": body["email"] });
    data.admins.push(account.clone());
    Json(account).into_response()
}

async fn delete_admin(State(stub): State<Stub>, Path(id): Path<String>) -> Response {
    stub.data().admins.retain(|a| a["id"] != id.as_str());
    ok()
}

async fn search_agents(State(stub): State<Stub>, Query(params): Query<HashMap<String, String>>) -> Response {
    let q = params.get("q").cloned().unwrap_or_default().to_lowercase();
    let found: Vec<StubRegistration> = stub
        .data()
        .registrations
        .values()
        .filter(|r| r.code_personnel.to_lowercase().contains(&q) || r.nom.to_lowercase().contains(&q))
        .cloned()
        .collect();
    Json(found).into_response()
}

fn set_present(stub: &Stub, code: &str, present: bool) -> Response {
    match stub.data().registrations.get_mut(code) {
        Some(reg) => {
            reg.present = present;
            Json(reg.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Inscription introuvable"),
    }
}

async fn check_in(State(stub): State<Stub>, Path(code): Path<String>) -> Response {
    set_present(&stub, &code, true)
}

async fn undo_check_in(State(stub): State<Stub>, Path(code): Path<String>) -> Response {
    set_present(&stub, &code, false)
}

pub fn stub_router(stub: Stub) -> Router {
    Router::new()
        .route("/creneaux", get(get_board))
        .route("/inscriptions", post(create_registration))
        .route("/inscriptions/{code}", get(get_registration).put(update_registration))
        .route("/admin/inscriptions", get(list_registrations))
        .route("/admin/inscriptions/{code}", axum::routing::delete(delete_registration))
        .route("/admin/creneaux/{heure}/capacite", put(set_capacity))
        .route("/admin/creneaux/{heure}/blocage", post(block_slot).delete(unblock_slot))
        .route("/admin/creneaux/{heure}/admin-only", put(set_admin_only))
        .route("/admin/personnel", get(list_personnel).post(add_personnel))
        .route("/admin/personnel/{code}", axum::routing::delete(remove_personnel))
        .route("/admin/administrateurs", get(list_admins).post(create_admin))
        .route("/admin/administrateurs/{id}", axum::routing::delete(delete_admin))
        .route("/pointage/recherche", get(search_agents))
        .route("/pointage/{code}", post(check_in).delete(undo_check_in))
        .layer(axum::middleware::from_fn_with_state(stub.clone(), record))
        .with_state(stub)
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub stub: Stub,
    pub base_url: String,
    pub cancel: CancellationToken,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_role(Role::Agent).await
    }

    /// Stub seeded with the usual day: three morning slots of 14, an afternoon
    /// slot of 20, the unlimited 15:00 slot and a small 16:00 slot.
    pub async fn with_role(role: Role) -> Self {
        let stub = Stub::default();
        for heure in ["09:00", "10:00", "11:00"] {
            stub.add_slot(heure, 14);
        }
        stub.add_slot("14:00", 20);
        stub.add_slot("15:00", 999);
        stub.add_slot("16:00", 10);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub API");
        let addr = listener.local_addr().unwrap();
        let router = stub_router(stub.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let base_url = format!("http://{}", addr);
        let config = Config::for_api(base_url.clone());
        let session = Arc::new(SessionStore::new(Session {
            token: Some(format!("{}-token", role)),
            role,
            user_id: (role == Role::Admin).then(|| ADMIN_ID.to_string()),
        }));
        let state = Arc::new(bootstrap_state_with_session(&config, session).expect("Failed to bootstrap state"));

        Self {
            state,
            stub,
            base_url,
            cancel: CancellationToken::new(),
        }
    }
}
