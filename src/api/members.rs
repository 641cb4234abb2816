//! Member page endpoints.

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Redirect,
};
use serde::{Deserialize, Serialize};

use super::{blocking, read_member_form, success, ApiResult};
use crate::errors::AppError;
use crate::models::{ContactCard, Member};
use crate::AppState;

/// Query parameters for the input page.
#[derive(Debug, Default, Deserialize)]
pub struct InputQuery {
    #[serde(default)]
    pub id: Option<String>,
    /// Older links address members by github username.
    #[serde(default)]
    pub username: Option<String>,
}

impl InputQuery {
    fn key(&self) -> Option<&str> {
        [self.id.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|key| !key.is_empty())
    }
}

/// Data for the create/edit form. `member` is `None` when creating.
#[derive(Debug, Serialize)]
pub struct InputView {
    pub member: Option<Member>,
}

/// GET / and GET /result - List all members.
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Vec<Member>> {
    let service = state.members.clone();
    let members = blocking(move || Ok(service.list())).await?;
    success(members)
}

/// GET /member - Legacy path for the member list.
pub async fn member_redirect() -> Redirect {
    Redirect::to("/result")
}

/// GET /result/{id} - Member detail, by id or github username.
pub async fn get_member(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Member> {
    let service = state.members.clone();
    let lookup = key.clone();
    match blocking(move || Ok(service.find(&lookup))).await? {
        Some(member) => success(member),
        None => Err(AppError::NotFound(format!("Member {} not found", key))),
    }
}

/// GET /input - Form data, prefilled when `id` or `username` is given.
pub async fn input_form(
    State(state): State<AppState>,
    Query(query): Query<InputQuery>,
) -> ApiResult<InputView> {
    let Some(key) = query.key().map(str::to_string) else {
        return success(InputView { member: None });
    };

    let service = state.members.clone();
    let lookup = key.clone();
    match blocking(move || Ok(service.find(&lookup))).await? {
        Some(member) => success(InputView {
            member: Some(member),
        }),
        None => Err(AppError::NotFound(format!("Member {} not found", key))),
    }
}

/// POST /input - Create a member, or update one when the form carries an `id`.
pub async fn submit_member(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Member> {
    let form = read_member_form(multipart).await?;
    let service = state.members.clone();

    let member = blocking(move || match form.id.clone() {
        Some(id) => service.update(&id, &form),
        None => service.create(&form),
    })
    .await?;
    success(member)
}

/// POST /member/update - Update an existing member; `id` is required.
pub async fn update_member(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Member> {
    let form = read_member_form(multipart).await?;
    let Some(id) = form.id.clone() else {
        return Err(AppError::Validation("Member id is required".to_string()));
    };

    let service = state.members.clone();
    let member = blocking(move || service.update(&id, &form)).await?;
    success(member)
}

/// GET /contact - Contact list.
pub async fn list_contacts(State(state): State<AppState>) -> ApiResult<Vec<ContactCard>> {
    let service = state.members.clone();
    let members = blocking(move || Ok(service.list())).await?;
    success(members.iter().map(ContactCard::from).collect())
}
