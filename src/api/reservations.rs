use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::extract::AppJson;
use crate::api::state::AppState;
use crate::auth::{Action, Principal};
use crate::db::reservations::NewReservation;
use crate::db::{Reservation, ReservationDetails, ReservationRepository, ReservationStatus, RoomRepository};
use crate::error::AppError;
use crate::validation::FieldErrors;

/// Any `user_id` sent by the client is ignored; the owner is always the caller.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub total_price: Option<f64>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateReservationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

async fn validate_new_reservation(
    state: &AppState,
    owner: &str,
    req: CreateReservationRequest,
) -> Result<NewReservation, AppError> {
    let mut errors = FieldErrors::new();

    let room_id = errors.required_string("room_id", req.room_id.as_deref(), 64);
    let check_in = errors.date("check_in", req.check_in.as_deref());
    let check_out = errors.date("check_out", req.check_out.as_deref());
    let total_price = errors
        .required("total_price", req.total_price)
        .and_then(|p| errors.non_negative("total_price", p));

    if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
        if check_out <= check_in {
            errors.add("check_out", "The check out field must be a date after check in.");
        }
    }

    if let Some(room_id) = &room_id {
        if !RoomRepository::exists(&state.db, room_id).await? {
            errors.add("room_id", "The selected room id is invalid.");
        }
    }

    match (room_id, check_in, check_out, total_price) {
        (Some(room_id), Some(check_in), Some(check_out), Some(total_price)) if errors.is_empty() => {
            Ok(NewReservation {
                user_id: owner.to_string(),
                room_id,
                check_in,
                check_out,
                total_price,
            })
        }
        _ => Err(AppError::Validation(errors)),
    }
}

/// GET /api/reservations
pub async fn index(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<ReservationDetails>>, AppError> {
    let scope = principal.authorize(Action::ListReservations)?;
    Ok(Json(ReservationRepository::list_details(&state.db, &scope).await?))
}

/// POST /api/reservations
pub async fn store(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    AppJson(req): AppJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    principal.authorize(Action::CreateReservation)?;
    let new_reservation = validate_new_reservation(&state, principal.id(), req).await?;

    let reservation = ReservationRepository::create(&state.db, new_reservation).await?;
    tracing::info!(
        reservation_id = %reservation.id,
        room_id = %reservation.room_id,
        user_id = %principal.id(),
        "reservation created"
    );

    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /api/reservations/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<ReservationDetails>, AppError> {
    let scope = principal.authorize(Action::AccessReservation)?;

    ReservationRepository::get_details(&state.db, &id, &scope)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Reservation".to_string()))
}

/// PUT /api/reservations/:id - only the status can change
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateReservationRequest>,
) -> Result<Json<Reservation>, AppError> {
    let scope = principal.authorize(Action::AccessReservation)?;

    let reservation = match req.status {
        Some(raw) => {
            let status: ReservationStatus = raw
                .parse()
                .map_err(|_| AppError::invalid("status", "The selected status is invalid."))?;
            ReservationRepository::update_status(&state.db, &id, &scope, status).await?
        }
        None => ReservationRepository::get_by_id(&state.db, &id, &scope).await?,
    }
    .ok_or_else(|| AppError::NotFound("Reservation".to_string()))?;

    tracing::info!(reservation_id = %reservation.id, status = ?reservation.status, "reservation updated");
    Ok(Json(reservation))
}

/// DELETE /api/reservations/:id
pub async fn destroy(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let scope = principal.authorize(Action::AccessReservation)?;

    if !ReservationRepository::delete(&state.db, &id, &scope).await? {
        return Err(AppError::NotFound("Reservation".to_string()));
    }
    tracing::info!(reservation_id = %id, user_id = %principal.id(), "reservation deleted");

    Ok(StatusCode::NO_CONTENT)
}
