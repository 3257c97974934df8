// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use crate::model::objects::GameObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A player: a game object plus connection/credential bookkeeping, persisted
/// in its own collection. Players own themselves.
///
/// The credential hash is opaque here; producing and checking it is the login
/// layer's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(flatten)]
    object: GameObject,
    password_hash: String,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    online: bool,
}

impl PlayerRecord {
    pub fn new(mut object: GameObject, password_hash: &str) -> Self {
        let self_id = object.id().clone();
        object.set_owner(Some(self_id));
        Self {
            object,
            password_hash: password_hash.to_string(),
            session_id: None,
            last_login: None,
            online: false,
        }
    }

    pub fn object(&self) -> &GameObject {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut GameObject {
        &mut self.object
    }

    pub fn into_object(self) -> GameObject {
        self.object
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn set_password_hash(&mut self, hash: &str) {
        self.password_hash = hash.to_string();
        self.object.touch();
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login
    }

    /// Mark the player connected under the given session.
    pub fn connect(&mut self, session_id: &str) {
        self.session_id = Some(session_id.to_string());
        self.last_login = Some(Utc::now());
        self.online = true;
        self.object.touch();
    }

    /// Mark the player disconnected; the session id is dropped.
    pub fn disconnect(&mut self) {
        self.session_id = None;
        self.online = false;
        self.object.touch();
    }
}
