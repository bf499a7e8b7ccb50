use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::api::extract::AppJson;
use crate::api::state::AppState;
use crate::auth::{Action, Principal};
use crate::db::rooms::{NewRoom, RoomChanges};
use crate::db::{Room, RoomRepository};
use crate::error::AppError;
use crate::validation::FieldErrors;

/// Body for room create and update. Every field is optional on update.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RoomRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `null` clears the column on update.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl RoomRequest {
    fn into_new_room(self) -> Result<NewRoom, AppError> {
        let mut errors = FieldErrors::new();

        let name = errors.required_string("name", self.name.as_deref(), 255);
        let description = errors.optional_string("description", self.description.flatten().as_deref(), 2000);
        let price = errors.required("price", self.price).and_then(|p| errors.non_negative("price", p));
        let capacity = errors
            .required("capacity", self.capacity)
            .and_then(|c| errors.positive("capacity", c));
        let room_type = errors.required_string("type", self.room_type.as_deref(), 255);
        let image_url = errors.optional_string("image_url", self.image_url.flatten().as_deref(), 2048);

        match (name, price, capacity, room_type) {
            (Some(name), Some(price), Some(capacity), Some(room_type)) if errors.is_empty() => {
                Ok(NewRoom {
                    name,
                    description,
                    price,
                    capacity,
                    room_type,
                    image_url,
                    is_available: self.is_available.unwrap_or(true),
                })
            }
            _ => Err(AppError::Validation(errors)),
        }
    }

    fn into_changes(self) -> Result<RoomChanges, AppError> {
        let mut errors = FieldErrors::new();

        let changes = RoomChanges {
            name: self.name.and_then(|n| errors.required_string("name", Some(n.as_str()), 255)),
            description: self.description.map(|d| {
                d.and_then(|d| errors.optional_string("description", Some(d.as_str()), 2000))
            }),
            price: self.price.and_then(|p| errors.non_negative("price", p)),
            capacity: self.capacity.and_then(|c| errors.positive("capacity", c)),
            room_type: self.room_type.and_then(|t| errors.required_string("type", Some(t.as_str()), 255)),
            image_url: self.image_url.map(|u| {
                u.and_then(|u| errors.optional_string("image_url", Some(u.as_str()), 2048))
            }),
            is_available: self.is_available,
        };

        errors.finish()?;
        Ok(changes)
    }
}

/// GET /api/rooms
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Room>>, AppError> {
    Ok(Json(RoomRepository::list(&state.db).await?))
}

/// GET /api/rooms/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Room>, AppError> {
    RoomRepository::get_by_id(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Room".to_string()))
}

/// POST /api/rooms (admin)
pub async fn store(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    AppJson(req): AppJson<RoomRequest>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    principal.authorize(Action::ManageRooms)?;
    let new_room = req.into_new_room()?;

    let room = RoomRepository::create(&state.db, new_room).await?;
    tracing::info!(room_id = %room.id, user_id = %principal.id(), "room created");

    Ok((StatusCode::CREATED, Json(room)))
}

/// PUT /api/rooms/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    AppJson(req): AppJson<RoomRequest>,
) -> Result<Json<Room>, AppError> {
    principal.authorize(Action::ManageRooms)?;
    let changes = req.into_changes()?;

    let room = RoomRepository::update(&state.db, &id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Room".to_string()))?;
    tracing::info!(room_id = %room.id, user_id = %principal.id(), "room updated");

    Ok(Json(room))
}

/// DELETE /api/rooms/:id (admin)
pub async fn destroy(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    principal.authorize(Action::ManageRooms)?;

    if !RoomRepository::delete(&state.db, &id).await? {
        return Err(AppError::NotFound("Room".to_string()));
    }
    tracing::info!(room_id = %id, user_id = %principal.id(), "room deleted");

    Ok(StatusCode::NO_CONTENT)
}
