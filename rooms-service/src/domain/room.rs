use crate::utils::errors::{Result, RoomsServiceError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role given to participants whose request did not name one
pub const DEFAULT_ROLE: &str = "Attendee";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    /// Unique by identifier; insertion order is kept for stable listings
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub identifier: String,
    pub role: String,
}

impl Participant {
    pub fn new(identifier: String, role: Option<String>) -> Result<Self> {
        if identifier.trim().is_empty() {
            return Err(RoomsServiceError::InvalidRequest(
                "communication identifier must not be empty".to_string(),
            ));
        }
        Ok(Self {
            identifier,
            role: role
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        })
    }
}

impl Room {
    pub fn new(
        id: String,
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
        participants: Vec<Participant>,
    ) -> Result<Self> {
        validate_window(valid_from, valid_until)?;

        let mut room = Self {
            id,
            created_at: Utc::now(),
            valid_from,
            valid_until,
            participants: Vec::new(),
        };
        room.upsert_participants(participants);
        Ok(room)
    }

    /// Apply a partial change to the validity window. The resulting window is
    /// checked as a whole, so the room is left untouched on error.
    pub fn update_validity(
        &mut self,
        valid_from: Option<DateTime<Utc>>,
        valid_until: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let from = valid_from.unwrap_or(self.valid_from);
        let until = valid_until.unwrap_or(self.valid_until);
        validate_window(from, until)?;

        self.valid_from = from;
        self.valid_until = until;
        Ok(())
    }

    /// Replace the whole participant set
    pub fn replace_participants(&mut self, participants: Vec<Participant>) {
        self.participants.clear();
        self.upsert_participants(participants);
    }

    /// Add new identifiers and overwrite the role of existing ones
    pub fn upsert_participants(&mut self, participants: Vec<Participant>) {
        for participant in participants {
            match self
                .participants
                .iter_mut()
                .find(|p| p.identifier == participant.identifier)
            {
                Some(existing) => existing.role = participant.role,
                None => self.participants.push(participant),
            }
        }
    }

    /// Remove identifiers; returns how many were actually members
    pub fn remove_participants(&mut self, identifiers: &[String]) -> usize {
        let before = self.participants.len();
        self.participants
            .retain(|p| !identifiers.contains(&p.identifier));
        before - self.participants.len()
    }

    pub fn participant(&self, identifier: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.identifier == identifier)
    }
}

fn validate_window(valid_from: DateTime<Utc>, valid_until: DateTime<Utc>) -> Result<()> {
    if valid_until < valid_from {
        return Err(RoomsServiceError::InvalidRequest(format!(
            "validUntil ({}) must not be before validFrom ({})",
            valid_until.to_rfc3339(),
            valid_from.to_rfc3339()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn participant(id: &str, role: &str) -> Participant {
        Participant::new(id.to_string(), Some(role.to_string())).unwrap()
    }

    fn room(participants: Vec<Participant>) -> Room {
        let now = Utc::now();
        Room::new("room-1".to_string(), now, now + Duration::days(1), participants).unwrap()
    }

    #[test]
    fn missing_role_defaults_to_attendee() {
        let p = Participant::new("8:acs:user2".to_string(), None).unwrap();
        assert_eq!(p.role, "Attendee");
    }

    #[test]
    fn empty_identifier_is_rejected() {
        assert!(Participant::new(" ".to_string(), Some("Presenter".to_string())).is_err());
    }

    #[test]
    fn new_room_collapses_duplicate_identifiers_last_wins() {
        let room = room(vec![participant("u1", "Presenter"), participant("u1", "Consumer")]);
        assert_eq!(room.participants, vec![participant("u1", "Consumer")]);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let result = Room::new("room-1".to_string(), now, now - Duration::seconds(1), Vec::new());
        assert!(matches!(result, Err(RoomsServiceError::InvalidRequest(_))));
    }

    #[test]
    fn partial_validity_update_keeps_other_bound() {
        let mut room = room(Vec::new());
        let original_from = room.valid_from;
        let new_until = room.valid_until + Duration::days(2);

        room.update_validity(None, Some(new_until)).unwrap();
        assert_eq!(room.valid_from, original_from);
        assert_eq!(room.valid_until, new_until);
    }

    #[test]
    fn invalid_validity_update_leaves_room_unchanged() {
        let mut room = room(Vec::new());
        let before = room.clone();

        let result = room.update_validity(None, Some(room.valid_from - Duration::days(1)));
        assert!(result.is_err());
        assert_eq!(room, before);
    }

    #[test]
    fn replace_drops_members_not_in_new_list() {
        let mut room = room(vec![participant("u1", "Presenter"), participant("u2", "Attendee")]);
        room.replace_participants(vec![participant("u3", "Presenter")]);
        assert_eq!(room.participants, vec![participant("u3", "Presenter")]);
    }

    #[test]
    fn upsert_overwrites_roles_and_keeps_others() {
        let mut room = room(vec![participant("u1", "Presenter"), participant("u2", "Organizer")]);
        room.upsert_participants(vec![participant("u1", "Consumer"), participant("u4", "Attendee")]);

        assert_eq!(room.participants.len(), 3);
        assert_eq!(room.participant("u1").unwrap().role, "Consumer");
        assert_eq!(room.participant("u2").unwrap().role, "Organizer");
        assert_eq!(room.participant("u4").unwrap().role, "Attendee");
    }

    #[test]
    fn removing_non_members_is_a_no_op() {
        let mut room = room(vec![participant("u1", "Presenter")]);
        let removed = room.remove_participants(&["u9".to_string()]);
        assert_eq!(removed, 0);
        assert_eq!(room.participants.len(), 1);

        let removed = room.remove_participants(&["u1".to_string(), "u9".to_string()]);
        assert_eq!(removed, 1);
        assert!(room.participants.is_empty());
    }
}
