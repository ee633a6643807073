// src/handler/complaints.rs
use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, Query},
    middleware,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, put},
    Extension, Json, Router,
};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::fixtures,
    dtos::{
        AssignComplaintDto, ComplaintListResponseDto, ComplaintQueryParams, ComplaintResponseDto,
        CreateComplaintDto, CreateMessageDto, FilterUserDto, MessageListResponseDto,
        MessageResponseDto, UpdateComplaintStatusDto, UserListResponseDto,
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{
        complaintmodel::{Complaint, ComplaintEvent, ComplaintStatus},
        usermodel::{Identity, UserRole},
    },
    service::views::parse_status_filter,
    AppState,
};

pub fn complaint_handler() -> Router {
    Router::new()
        .route(
            "/",
            get(get_all_complaints)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Admin])
                }))
                .post(submit_complaint),
        )
        .route("/mine", get(get_my_complaints))
        .route(
            "/assigned",
            get(get_assigned_complaints).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Agent])
            })),
        )
        .route("/events", get(complaint_events))
        .route("/:complaint_id", get(get_complaint))
        .route("/:complaint_id/status", put(update_complaint_status))
        .route(
            "/:complaint_id/assign",
            put(assign_complaint).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Admin])
            })),
        )
        .route(
            "/:complaint_id/messages",
            get(get_complaint_messages).post(add_message),
        )
}

pub fn agents_handler() -> Router {
    Router::new().route(
        "/",
        get(get_agents).layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Admin])
        })),
    )
}

fn status_filter(params: &ComplaintQueryParams) -> Result<Option<ComplaintStatus>, HttpError> {
    parse_status_filter(params.status.as_deref()).map_err(HttpError::from)
}

fn list_response(complaints: Vec<Complaint>) -> Json<ComplaintListResponseDto> {
    Json(ComplaintListResponseDto {
        status: "success".to_string(),
        results: complaints.len(),
        complaints,
    })
}

pub async fn submit_complaint(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateComplaintDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let new_complaint = body
        .into_new_complaint()
        .map_err(HttpError::bad_request)?;

    let complaint = app_state
        .complaint_service
        .submit(&auth.user, new_complaint)
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(ComplaintResponseDto {
            status: "success".to_string(),
            data: complaint,
        }),
    ))
}

pub async fn get_all_complaints(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(params): Query<ComplaintQueryParams>,
) -> Result<impl IntoResponse, HttpError> {
    let complaints = app_state
        .complaint_service
        .all_complaints(&auth.user, status_filter(&params)?)
        .await?;

    Ok(list_response(complaints))
}

pub async fn get_my_complaints(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(params): Query<ComplaintQueryParams>,
) -> Result<impl IntoResponse, HttpError> {
    let complaints = app_state
        .complaint_service
        .user_complaints(&auth.user, status_filter(&params)?)
        .await?;

    Ok(list_response(complaints))
}

pub async fn get_assigned_complaints(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(params): Query<ComplaintQueryParams>,
) -> Result<impl IntoResponse, HttpError> {
    let complaints = app_state
        .complaint_service
        .agent_complaints(&auth.user, status_filter(&params)?)
        .await?;

    Ok(list_response(complaints))
}

pub async fn get_complaint(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(complaint_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let complaint = app_state
        .complaint_service
        .complaint_for(&auth.user, complaint_id)
        .await?;

    Ok(Json(ComplaintResponseDto {
        status: "success".to_string(),
        data: complaint,
    }))
}

pub async fn update_complaint_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(complaint_id): Path<Uuid>,
    Json(body): Json<UpdateComplaintStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let status = body
        .status
        .parse::<ComplaintStatus>()
        .map_err(HttpError::bad_request)?;

    let complaint = app_state
        .complaint_service
        .update_status(&auth.user, complaint_id, status, body.agent_id)
        .await?;

    Ok(Json(ComplaintResponseDto {
        status: "success".to_string(),
        data: complaint,
    }))
}

pub async fn assign_complaint(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(complaint_id): Path<Uuid>,
    body: Option<Json<AssignComplaintDto>>,
) -> Result<impl IntoResponse, HttpError> {
    let agent_id = body
        .map(|Json(dto)| dto.agent_or_default())
        .unwrap_or(fixtures::AGENT_ID);

    let complaint = app_state
        .complaint_service
        .assign_agent(&auth.user, complaint_id, agent_id)
        .await?;

    Ok(Json(ComplaintResponseDto {
        status: "success".to_string(),
        data: complaint,
    }))
}

pub async fn get_complaint_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(complaint_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let messages = app_state
        .complaint_service
        .messages(&auth.user, complaint_id)
        .await?;

    Ok(Json(MessageListResponseDto {
        status: "success".to_string(),
        results: messages.len(),
        messages,
    }))
}

pub async fn add_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(complaint_id): Path<Uuid>,
    Json(body): Json<CreateMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let message = app_state
        .complaint_service
        .add_message(&auth.user, complaint_id, body.text.trim().to_string())
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(MessageResponseDto {
            status: "success".to_string(),
            data: message,
        }),
    ))
}

/// Store changes `viewer` is allowed to see, in publish order. Ends when the store is dropped.
pub fn visible_events(
    receiver: broadcast::Receiver<ComplaintEvent>,
    viewer: Identity,
) -> impl Stream<Item = ComplaintEvent> {
    stream::unfold((receiver, viewer), |(mut receiver, viewer)| async move {
        loop {
            match receiver.recv().await {
                Ok(event) if event.visible_to(&viewer) => {
                    return Some((event, (receiver, viewer)));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("{} missed {} complaint events", viewer.email, skipped);
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

/// Server-sent stream of store changes the caller is allowed to see.
pub async fn complaint_events(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("{} subscribed to complaint events", auth.user.email);

    let events = visible_events(app_state.db_client.subscribe(), auth.user).map(|event| {
        let sse = Event::default()
            .event(event.kind.as_str())
            .json_data(&event)
            .unwrap_or_else(|_| Event::default().comment("unserializable event"));
        Ok::<_, Infallible>(sse)
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

pub async fn get_agents() -> impl IntoResponse {
    let agents = fixtures::agents();

    Json(UserListResponseDto {
        status: "success".to_string(),
        results: agents.len(),
        users: FilterUserDto::filter_users(&agents),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        db::{ComplaintExt, DBClient},
        models::complaintmodel::{
            ComplaintCategory, ComplaintEventKind, ComplaintPriority, NewComplaint,
        },
        service::error::ServiceError,
    };

    fn late_parcel() -> NewComplaint {
        NewComplaint {
            title: "Late parcel".to_string(),
            description: "My parcel is two weeks late already.".to_string(),
            category: ComplaintCategory::Delivery,
            priority: ComplaintPriority::Medium,
        }
    }

    async fn next_event(
        events: &mut (impl Stream<Item = ComplaintEvent> + Unpin),
    ) -> Option<ComplaintEvent> {
        tokio::time::timeout(Duration::from_millis(50), events.next())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn subscribers_only_see_their_own_complaints() {
        let client = DBClient::new();
        let jane = Identity::new(Uuid::new_v4(), "Jane Roe", "jane@example.com", UserRole::User);
        let john = fixtures::john();

        let mut janes = Box::pin(visible_events(client.subscribe(), jane.clone()));
        let mut agents = Box::pin(visible_events(client.subscribe(), fixtures::agent()));
        let mut admins = Box::pin(visible_events(client.subscribe(), fixtures::admin()));

        let janes_complaint = client.save_complaint(&jane, late_parcel()).await.unwrap();
        let johns_complaint = client.save_complaint(&john, late_parcel()).await.unwrap();
        client
            .update_complaint_status(
                johns_complaint.id,
                ComplaintStatus::InProgress,
                fixtures::agent_assignment(fixtures::AGENT_ID),
                &|_| Ok::<(), ServiceError>(()),
            )
            .await
            .unwrap();

        let seen = next_event(&mut janes).await.unwrap();
        assert_eq!(seen.complaint_id, janes_complaint.id);
        assert!(next_event(&mut janes).await.is_none());

        let seen = next_event(&mut agents).await.unwrap();
        assert_eq!(seen.complaint_id, johns_complaint.id);
        assert_eq!(seen.kind, ComplaintEventKind::StatusChanged);
        assert!(next_event(&mut agents).await.is_none());

        let mut kinds = Vec::new();
        while let Some(event) = next_event(&mut admins).await {
            kinds.push(event.kind);
        }
        assert_eq!(
            kinds,
            vec![
                ComplaintEventKind::Submitted,
                ComplaintEventKind::Submitted,
                ComplaintEventKind::StatusChanged
            ]
        );
    }
}
