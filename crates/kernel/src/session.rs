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

use loam_var::ObjId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("no connection for player {0}")]
    NoConnection(ObjId),
    #[error("could not deliver message: {0}")]
    DeliveryError(String),
}

/// The connection a command arrived on. The kernel only ever pushes text back
/// through it; connection lifecycle lives outside.
pub trait Session: Send + Sync {
    /// The identifier of the underlying connection.
    fn session_id(&self) -> &str;

    /// Deliver a line of output to a player on this session.
    fn send_to_player(&self, player: &ObjId, message: &str) -> Result<(), SessionError>;

    /// Deliver a line of output to a specific connection, player unknown.
    fn send_to_session(&self, session_id: &str, message: &str) -> Result<(), SessionError>;
}

/// A session that swallows all output. For tests, background tasks, and
/// commands replayed with no one watching.
pub struct NoopSession {
    id: String,
}

impl NoopSession {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl Session for NoopSession {
    fn session_id(&self) -> &str {
        &self.id
    }

    fn send_to_player(&self, _player: &ObjId, _message: &str) -> Result<(), SessionError> {
        Ok(())
    }

    fn send_to_session(&self, _session_id: &str, _message: &str) -> Result<(), SessionError> {
        Ok(())
    }
}
