//! Role-based access decisions.
//!
//! A policy is picked once per request from the principal's role and answers
//! every question with a plain [`Decision`]. Handlers hand the resulting
//! [`Scope`] to the repositories, which never look at roles themselves.

use crate::db::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageRooms,
    ListReservations,
    CreateReservation,
    AccessReservation,
}

/// Rows a principal may see or touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    OwnedBy(String),
}

impl Scope {
    /// Owner filter for queries; `None` means unfiltered.
    pub fn owner(&self) -> Option<&str> {
        match self {
            Scope::All => None,
            Scope::OwnedBy(user_id) => Some(user_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(Scope),
    Deny,
}

pub trait AccessPolicy: Send + Sync {
    fn decide(&self, user: &User, action: Action) -> Decision;
}

pub struct AdminPolicy;

impl AccessPolicy for AdminPolicy {
    fn decide(&self, _user: &User, _action: Action) -> Decision {
        Decision::Allow(Scope::All)
    }
}

pub struct GuestPolicy;

impl AccessPolicy for GuestPolicy {
    fn decide(&self, user: &User, action: Action) -> Decision {
        match action {
            Action::ManageRooms => Decision::Deny,
            Action::ListReservations
            | Action::CreateReservation
            | Action::AccessReservation => Decision::Allow(Scope::OwnedBy(user.id.clone())),
        }
    }
}

pub fn policy_for(role: Role) -> &'static dyn AccessPolicy {
    match role {
        Role::Admin => &AdminPolicy,
        Role::User => &GuestPolicy,
    }
}
