use bson::Document;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Account roles, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Organizer,
    Admin,
}

impl Role {
    /// Wire/store spelling, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Organizer => "organizer",
            Role::Admin => "admin",
        }
    }
}

/// Event lifecycle: draft -> pending -> published | rejected.
/// Publishing always goes through the admin approval queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Pending,
    Published,
    Rejected,
}

impl EventStatus {
    /// Wire/store spelling, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Pending => "pending",
            EventStatus::Published => "published",
            EventStatus::Rejected => "rejected",
        }
    }
}

/// Pending password-reset credential stored on the user document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub token: String,
    /// RFC 3339. Parsed when the token is redeemed; a value that fails to
    /// parse invalidates the token.
    pub expires_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string, never plaintext.
    pub password: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub join_date: String,
    pub events_created: i64,
    pub volunteer_hours: f64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_preferences: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_reset: Option<PasswordReset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub category: String,
    pub capacity: i64,
    /// Mirrors attendees.len(); kept denormalized so capacity checks and the
    /// admin top-events projection stay single-field queries.
    pub registered: i64,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    pub creator: String,
    pub status: EventStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub author: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumThread {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub author: String,
    pub category: String,
    pub replies: i64,
    pub likes: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub flags: i64,
    pub created_at: String,
    pub last_activity: String,
}

/// One sign-up of a user to help run an event. At most one record per
/// (userId, eventId) pair, enforced by a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub event_id: String,
    pub role: String,
    pub hours: f64,
    pub status: String,
    pub registered_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Member).unwrap(), "\"member\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"organizer\"").unwrap(),
            Role::Organizer
        );
    }

    #[test]
    fn event_status_round_trips() {
        for (status, wire) in [
            (EventStatus::Draft, "\"draft\""),
            (EventStatus::Pending, "\"pending\""),
            (EventStatus::Published, "\"published\""),
            (EventStatus::Rejected, "\"rejected\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), wire);
            assert_eq!(serde_json::from_str::<EventStatus>(wire).unwrap(), status);
        }
    }

    #[test]
    fn user_document_uses_store_field_names() {
        let user = User {
            id: None,
            name: "Asha".into(),
            email: "asha@example.org".into(),
            password: "$argon2id$stub".into(),
            role: Role::Member,
            bio: None,
            join_date: "2026-08-01T12:00:00+00:00".into(),
            events_created: 0,
            volunteer_hours: 0.0,
            status: "active".into(),
            email_preferences: None,
            password_reset: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("joinDate").is_some());
        assert!(json.get("eventsCreated").is_some());
        assert!(json.get("volunteerHours").is_some());
        // Absent optionals are omitted entirely, not serialized as null.
        assert!(json.get("bio").is_none());
        assert!(json.get("passwordReset").is_none());
    }

    #[test]
    fn announcement_kind_maps_to_type() {
        let ann = Announcement {
            id: None,
            title: "Road closure".into(),
            content: "Main street closed Saturday".into(),
            kind: "Info".into(),
            author: "someid".into(),
            date: "2026-08-01T12:00:00+00:00".into(),
            expires_on: None,
        };
        let json = serde_json::to_value(&ann).unwrap();
        assert_eq!(json.get("type").unwrap(), "Info");
        assert!(json.get("kind").is_none());
    }
}
