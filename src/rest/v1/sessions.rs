use crate::{
    area::io,
    conf::Conf,
    preview,
    session::{Interaction, SessionState, SessionStore, Transition},
    Error, Result,
};
use actix_web::{
    delete, get,
    http::header::{ContentDisposition, CONTENT_DISPOSITION},
    post,
    web::{Data, Json, Path, Query},
    HttpResponse, Responder,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: String,
    pub state: SessionState,
}

#[derive(Deserialize)]
pub struct ExportArgs {
    pub file_name: Option<String>,
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| Error::InvalidInput(format!("Invalid session id: {id}")))
}

fn not_found(id: &Uuid) -> Error {
    Error::NotFound(format!("Session {id} not found"))
}

#[post("")]
pub async fn post(store: Data<SessionStore>, conf: Data<Conf>) -> Json<SessionResponse> {
    let state = SessionState::new(conf.default_view);
    let id = store.create(state.clone());
    Json(SessionResponse {
        id: id.to_string(),
        state,
    })
}

#[get("{id}")]
pub async fn get(id: Path<String>, store: Data<SessionStore>) -> Result<Json<SessionResponse>> {
    let id = parse_id(&id)?;
    let state = store.get(&id).ok_or_else(|| not_found(&id))?;
    Ok(Json(SessionResponse {
        id: id.to_string(),
        state,
    }))
}

#[delete("{id}")]
pub async fn delete(id: Path<String>, store: Data<SessionStore>) -> Result<HttpResponse> {
    let id = parse_id(&id)?;
    if !store.remove(&id) {
        return Err(not_found(&id));
    }
    info!(%id, "Session removed");
    Ok(HttpResponse::NoContent().finish())
}

#[post("{id}/interactions")]
pub async fn post_interaction(
    id: Path<String>,
    interaction: Json<Interaction>,
    store: Data<SessionStore>,
) -> Result<Json<Transition>> {
    let id = parse_id(&id)?;
    let transition = store
        .apply(&id, interaction.into_inner())
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(transition))
}

// GET /sessions/{id}/export?file_name=fields
#[get("{id}/export")]
pub async fn get_export(
    id: Path<String>,
    args: Query<ExportArgs>,
    store: Data<SessionStore>,
) -> Result<impl Responder> {
    let id = parse_id(&id)?;
    let state = store.get(&id).ok_or_else(|| not_found(&id))?;
    let file_name = io::export_file_name(args.file_name.as_deref(), state.areas.len());
    Ok(HttpResponse::Ok()
        .content_type(io::MIME_TYPE)
        .insert_header((
            CONTENT_DISPOSITION,
            ContentDisposition::attachment(file_name),
        ))
        .body(io::export(&state.areas)))
}

#[get("{id}/preview")]
pub async fn get_preview(
    id: Path<String>,
    store: Data<SessionStore>,
    conf: Data<Conf>,
) -> Result<impl Responder> {
    let id = parse_id(&id)?;
    let state = store.get(&id).ok_or_else(|| not_found(&id))?;
    let png = preview::render(state.areas, state.view, state.fit_bounds, &conf).await?;
    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}
