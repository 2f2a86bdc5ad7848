use std::sync::RwLock;

use crate::types::SessionId;

/// Holds the process-wide current session.
///
/// Tokens copy the session id at mint time, so rotating here never changes
/// which session an already-issued token belongs to.
#[derive(Debug)]
pub struct SessionAuthority {
    current: RwLock<SessionId>,
}

impl SessionAuthority {
    pub fn new() -> Self {
        Self::starting_with(SessionId::new())
    }

    pub fn starting_with(session_id: SessionId) -> Self {
        tracing::info!(%session_id, "Attendance session opened");
        Self {
            current: RwLock::new(session_id),
        }
    }

    pub fn current(&self) -> SessionId {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn rotate(&self) -> SessionId {
        let next = SessionId::new();
        let previous = {
            let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *current, next)
        };
        tracing::info!(%previous, session_id = %next, "Attendance session rotated");
        next
    }
}

impl Default for SessionAuthority {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn current_is_stable_until_rotation() {
        let authority = SessionAuthority::new();
        let first = authority.current();
        assert_eq!(authority.current(), first);

        let rotated = authority.rotate();
        assert_ne!(rotated, first);
        assert_eq!(authority.current(), rotated);
    }

    #[test]
    fn starting_with_uses_given_id() {
        let id = SessionId::new();
        let authority = SessionAuthority::starting_with(id);
        assert_eq!(authority.current(), id);
    }

    #[test]
    fn readers_see_a_whole_session_id_during_rotation() {
        let authority = Arc::new(SessionAuthority::new());
        let initial = authority.current();

        let writer = {
            let authority = authority.clone();
            thread::spawn(move || (0..100).map(|_| authority.rotate()).collect::<Vec<_>>())
        };
        let reader = {
            let authority = authority.clone();
            thread::spawn(move || (0..100).map(|_| authority.current()).collect::<Vec<_>>())
        };

        let rotated = writer.join().expect("writer thread");
        let observed = reader.join().expect("reader thread");

        for id in observed {
            assert!(id == initial || rotated.contains(&id));
        }
        assert_eq!(authority.current(), *rotated.last().expect("rotations"));
    }
}
