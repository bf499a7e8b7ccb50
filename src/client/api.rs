use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::api::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::api::reservations::{CreateReservationRequest, UpdateReservationRequest};
use crate::api::rooms::RoomRequest;
use crate::client::{ClientError, Session};
use crate::db::{Reservation, ReservationDetails, ReservationStatus, Room, User};

/// Typed client for the booking API. Every request carries the current
/// session's bearer token, when there is one.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8000/api`.
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(reqwest::header::ACCEPT, "application/json");

        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

        Err(ClientError::Api { status: status.as_u16(), message })
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(builder: RequestBuilder) -> Result<(), ClientError> {
        Self::check(builder.send().await?).await?;
        Ok(())
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<User, ClientError> {
        let auth: AuthResponse = Self::send(self.request(Method::POST, "/register").json(req)).await?;
        self.session.establish(auth.access_token, auth.user.clone())?;
        Ok(auth.user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let body = LoginRequest { email: email.to_string(), password: password.to_string() };
        let auth: AuthResponse = Self::send(self.request(Method::POST, "/login").json(&body)).await?;
        self.session.establish(auth.access_token, auth.user.clone())?;
        Ok(auth.user)
    }

    /// The local session is cleared whatever the server answers; the remote
    /// result is still returned to the caller.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let remote = Self::send_empty(self.request(Method::POST, "/logout")).await;
        if let Err(e) = &remote {
            tracing::warn!("logout request failed, clearing local session anyway: {}", e);
        }
        self.session.clear()?;
        remote
    }

    pub async fn current_user(&self) -> Result<User, ClientError> {
        Self::send(self.request(Method::GET, "/user")).await
    }

    pub async fn rooms(&self) -> Result<Vec<Room>, ClientError> {
        Self::send(self.request(Method::GET, "/rooms")).await
    }

    pub async fn room(&self, id: &str) -> Result<Room, ClientError> {
        Self::send(self.request(Method::GET, &format!("/rooms/{}", id))).await
    }

    pub async fn create_room(&self, req: &RoomRequest) -> Result<Room, ClientError> {
        Self::send(self.request(Method::POST, "/rooms").json(req)).await
    }

    pub async fn update_room(&self, id: &str, req: &RoomRequest) -> Result<Room, ClientError> {
        Self::send(self.request(Method::PUT, &format!("/rooms/{}", id)).json(req)).await
    }

    pub async fn delete_room(&self, id: &str) -> Result<(), ClientError> {
        Self::send_empty(self.request(Method::DELETE, &format!("/rooms/{}", id))).await
    }

    pub async fn reservations(&self) -> Result<Vec<ReservationDetails>, ClientError> {
        Self::send(self.request(Method::GET, "/reservations")).await
    }

    pub async fn reservation(&self, id: &str) -> Result<ReservationDetails, ClientError> {
        Self::send(self.request(Method::GET, &format!("/reservations/{}", id))).await
    }

    pub async fn create_reservation(
        &self,
        req: &CreateReservationRequest,
    ) -> Result<Reservation, ClientError> {
        Self::send(self.request(Method::POST, "/reservations").json(req)).await
    }

    pub async fn update_reservation_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> Result<Reservation, ClientError> {
        let status = serde_json::to_value(status)?
            .as_str()
            .map(str::to_string);
        let body = UpdateReservationRequest { status };
        Self::send(self.request(Method::PUT, &format!("/reservations/{}", id)).json(&body)).await
    }

    pub async fn delete_reservation(&self, id: &str) -> Result<(), ClientError> {
        Self::send_empty(self.request(Method::DELETE, &format!("/reservations/{}", id))).await
    }
}
