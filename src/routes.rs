use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::balance::{aggregate, Aggregate};
use crate::engine::SettlementEngine;
use crate::error::{Error, Result};
use crate::group::{Group, Snapshot};
use crate::schemas::{ExpenseId, ParticipantId, ShareScope};
use crate::store::GroupStore;

#[derive(Debug, Default)]
pub struct AppState {
    pub store: GroupStore,
    pub engine: SettlementEngine,
}

impl AppState {
    pub fn new(engine: SettlementEngine) -> Self {
        Self {
            store: GroupStore::new(),
            engine,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum BalanceOutcome {
    InsufficientData,
    Computed(Aggregate),
}

#[derive(Deserialize, Serialize)]
struct GroupNameJson {
    name: String,
}

#[derive(Deserialize, Serialize)]
struct ParticipantJson {
    name: String,
    #[serde(default)]
    payment_info: Option<String>,
}

#[derive(Deserialize, Serialize)]
struct PaymentInfoJson {
    #[serde(default)]
    payment_info: Option<String>,
}

#[derive(Deserialize, Serialize)]
struct ExpenseJson {
    description: String,
    amount: f64,
    paid_by: ParticipantId,
    /// Empty means everyone in the group
    #[serde(default)]
    shared_by: Vec<ParticipantId>,
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "splitsettle",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[put("/groups/{id}")]
async fn add_group(
    state: web::Data<AppState>,
    id: web::Path<String>,
    json: web::Json<GroupNameJson>,
) -> Result<HttpResponse> {
    let name = json.into_inner().name;
    if name.trim().is_empty() {
        return Err(Error::EmptyName);
    }
    let group = Group::new(id.into_inner(), name);
    let view = group.view();
    state.store.insert(group).await?;
    Ok(HttpResponse::Created().json(view))
}

#[get("/groups/{id}")]
async fn get_group(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse> {
    let view = state.store.read(&id, Group::view).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/groups/{id}/participants")]
async fn add_participant(
    state: web::Data<AppState>,
    id: web::Path<String>,
    json: web::Json<ParticipantJson>,
) -> Result<HttpResponse> {
    let ParticipantJson { name, payment_info } = json.into_inner();
    let participant = state
        .store
        .update(&id, |group| group.add_participant(name, payment_info))
        .await?;
    Ok(HttpResponse::Created().json(participant))
}

#[patch("/groups/{id}/participants/{participant_id}")]
async fn update_participant(
    state: web::Data<AppState>,
    path: web::Path<(String, ParticipantId)>,
    json: web::Json<PaymentInfoJson>,
) -> Result<HttpResponse> {
    let (id, participant_id) = path.into_inner();
    let payment_info = json.into_inner().payment_info;
    let participant = state
        .store
        .update(&id, |group| {
            group.update_payment_info(&participant_id, payment_info)
        })
        .await?;
    Ok(HttpResponse::Ok().json(participant))
}

#[delete("/groups/{id}/participants/{participant_id}")]
async fn remove_participant(
    state: web::Data<AppState>,
    path: web::Path<(String, ParticipantId)>,
) -> Result<HttpResponse> {
    let (id, participant_id) = path.into_inner();
    let report = state
        .store
        .update(&id, |group| group.remove_participant(&participant_id))
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

#[post("/groups/{id}/expenses")]
async fn add_expense(
    state: web::Data<AppState>,
    id: web::Path<String>,
    expense: web::Json<ExpenseJson>,
) -> Result<HttpResponse> {
    let ExpenseJson {
        description,
        amount,
        paid_by,
        shared_by,
    } = expense.into_inner();
    let expense = state
        .store
        .update(&id, |group| {
            group.add_expense(description, amount, paid_by, ShareScope::from_ids(shared_by))
        })
        .await?;
    Ok(HttpResponse::Created().json(expense))
}

#[delete("/groups/{id}/expenses/{expense_id}")]
async fn remove_expense(
    state: web::Data<AppState>,
    path: web::Path<(String, ExpenseId)>,
) -> Result<HttpResponse> {
    let (id, expense_id) = path.into_inner();
    let expense = state
        .store
        .update(&id, |group| group.remove_expense(&expense_id))
        .await?;
    Ok(HttpResponse::Ok().json(expense))
}

#[get("/groups/{id}/balance")]
async fn get_balance(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse> {
    let snapshot = state.store.read(&id, Group::snapshot).await?;
    let outcome = match aggregate(
        &snapshot.participants,
        &snapshot.expenses,
        state.engine.policy(),
    )? {
        Some(aggregate) => BalanceOutcome::Computed(aggregate),
        None => BalanceOutcome::InsufficientData,
    };
    Ok(HttpResponse::Ok().json(outcome))
}

#[get("/groups/{id}/settlement")]
async fn get_settlement(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let snapshot = state.store.read(&id, Group::snapshot).await?;
    let outcome = state
        .engine
        .evaluate(&snapshot.participants, &snapshot.expenses)?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Settles a snapshot posted by the caller without touching any stored group
#[post("/settlement")]
async fn settle_snapshot(
    state: web::Data<AppState>,
    snapshot: web::Json<Snapshot>,
) -> Result<HttpResponse> {
    let outcome = state
        .engine
        .evaluate(&snapshot.participants, &snapshot.expenses)?;
    Ok(HttpResponse::Ok().json(outcome))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(add_group)
        .service(get_group)
        .service(add_participant)
        .service(update_participant)
        .service(remove_participant)
        .service(add_expense)
        .service(remove_expense)
        .service(get_balance)
        .service(get_settlement)
        .service(settle_snapshot);
}
