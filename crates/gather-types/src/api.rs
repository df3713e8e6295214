use bson::Document;
use serde::{Deserialize, Serialize};

use crate::models::{Announcement, Event, EventStatus, ForumThread, Role, User, VolunteerRecord};

fn id_string(id: Option<bson::oid::ObjectId>) -> String {
    id.map(|id| id.to_hex()).unwrap_or_default()
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public projection returned from login/register. The caller persists this
/// client-side; no session or token is issued.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: id_string(user.id),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserSummary,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub success: bool,
    /// Present only when the email matched an account. Stand-in for an
    /// email-delivery collaborator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

// -- Users --

/// Full profile minus credentials: `password` and `passwordReset` never leave
/// the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub join_date: String,
    pub events_created: i64,
    pub volunteer_hours: f64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_preferences: Option<Document>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: id_string(user.id),
            name: user.name,
            email: user.email,
            role: user.role,
            bio: user.bio,
            join_date: user.join_date,
            events_created: user.events_created,
            volunteer_hours: user.volunteer_hours,
            status: user.status,
            email_preferences: user.email_preferences,
        }
    }
}

/// Update payload. Unknown fields are silently dropped, which is the point:
/// serde only picks up the allow-listed ones below.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
    pub status: Option<String>,
    pub email_preferences: Option<Document>,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserProfile,
}

// -- Events --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub category: String,
    pub capacity: i64,
    #[serde(default)]
    pub image_url: String,
    pub creator: String,
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub capacity: Option<i64>,
    pub image_url: Option<String>,
    pub status: Option<EventStatus>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistrationRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub category: String,
    pub capacity: i64,
    pub registered: i64,
    pub attendees: Vec<String>,
    pub image_url: String,
    pub creator: String,
    pub status: EventStatus,
    pub tags: Vec<String>,
    pub created_at: String,
    /// Computed per caller on listing; omitted when no caller id was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_registered: Option<bool>,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self {
            id: id_string(event.id),
            title: event.title,
            description: event.description,
            date: event.date,
            time: event.time,
            location: event.location,
            category: event.category,
            capacity: event.capacity,
            registered: event.registered,
            attendees: event.attendees,
            image_url: event.image_url,
            creator: event.creator,
            status: event.status,
            tags: event.tags,
            created_at: event.created_at,
            is_registered: None,
        }
    }
}

impl EventView {
    /// Annotate with whether `user_id` appears in the registered-list.
    pub fn for_caller(mut self, user_id: &str) -> Self {
        self.is_registered = Some(self.attendees.iter().any(|a| a == user_id));
        self
    }
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub success: bool,
    pub events: Vec<EventView>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub success: bool,
    pub event: EventView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCreatedResponse {
    pub success: bool,
    pub event_id: String,
}

// -- Announcements --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub author: String,
    pub expires_on: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementView {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub author: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<String>,
}

impl From<Announcement> for AnnouncementView {
    fn from(ann: Announcement) -> Self {
        Self {
            id: id_string(ann.id),
            title: ann.title,
            content: ann.content,
            kind: ann.kind,
            author: ann.author,
            date: ann.date,
            expires_on: ann.expires_on,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnnouncementsResponse {
    pub success: bool,
    pub announcements: Vec<AnnouncementView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementCreatedResponse {
    pub success: bool,
    pub announcement_id: String,
}

// -- Forum --

#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    pub title: String,
    pub author: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub replies: i64,
    pub likes: i64,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub flags: i64,
    pub created_at: String,
    pub last_activity: String,
}

impl From<ForumThread> for ThreadView {
    fn from(thread: ForumThread) -> Self {
        Self {
            id: id_string(thread.id),
            title: thread.title,
            author: thread.author,
            category: thread.category,
            replies: thread.replies,
            likes: thread.likes,
            tags: thread.tags,
            is_pinned: thread.is_pinned,
            flags: thread.flags,
            created_at: thread.created_at,
            last_activity: thread.last_activity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ThreadsResponse {
    pub success: bool,
    pub threads: Vec<ThreadView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadCreatedResponse {
    pub success: bool,
    pub thread_id: String,
}

// -- Volunteers --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerSignupRequest {
    pub user_id: String,
    pub event_id: String,
    pub role: String,
    pub hours: f64,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerView {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub role: String,
    pub hours: f64,
    pub status: String,
    pub registered_at: String,
    // Enrichment fields, populated by the history queries only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl From<VolunteerRecord> for VolunteerView {
    fn from(record: VolunteerRecord) -> Self {
        Self {
            id: id_string(record.id),
            user_id: record.user_id,
            event_id: record.event_id,
            role: record.role,
            hours: record.hours,
            status: record.status,
            registered_at: record.registered_at,
            event_title: None,
            event_date: None,
            user_name: None,
            user_email: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VolunteersResponse {
    pub success: bool,
    pub volunteers: Vec<VolunteerView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerCreatedResponse {
    pub success: bool,
    pub volunteer_id: String,
}

// -- Admin --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEvent {
    pub id: String,
    pub title: String,
    pub registered: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub active_users: u64,
    pub active_events: u64,
    pub total_volunteers: u64,
    pub forum_posts: u64,
    pub new_users: u64,
    pub top_events: Vec<TopEvent>,
}

#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub success: bool,
    pub stats: AdminStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PasswordReset;

    fn sample_user() -> User {
        User {
            id: Some(bson::oid::ObjectId::new()),
            name: "Asha".into(),
            email: "asha@example.org".into(),
            password: "$argon2id$stub".into(),
            role: Role::Organizer,
            bio: Some("hello".into()),
            join_date: "2026-08-01T12:00:00+00:00".into(),
            events_created: 3,
            volunteer_hours: 12.5,
            status: "active".into(),
            email_preferences: None,
            password_reset: Some(PasswordReset {
                token: "secret".into(),
                expires_at: "2026-08-01T12:30:00+00:00".into(),
            }),
        }
    }

    #[test]
    fn profile_never_exposes_credentials() {
        let profile = UserProfile::from(sample_user());
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordReset").is_none());
        assert_eq!(json.get("volunteerHours").unwrap(), 12.5);
    }

    #[test]
    fn summary_exposes_id_as_hex_string() {
        let user = sample_user();
        let summary = UserSummary::from(&user);
        assert_eq!(summary.id, user.id.unwrap().to_hex());
        assert_eq!(summary.id.len(), 24);
    }

    #[test]
    fn update_request_drops_unknown_fields() {
        let req: UpdateUserRequest = serde_json::from_str(
            r#"{"name": "New Name", "joinDate": "1999-01-01", "volunteerHours": 9000}"#,
        )
        .unwrap();
        assert_eq!(req.name.as_deref(), Some("New Name"));
        assert!(req.email.is_none());
        assert!(req.password.is_none());
    }

    #[test]
    fn event_view_annotates_registration() {
        let event = Event {
            id: Some(bson::oid::ObjectId::new()),
            title: "Cleanup".into(),
            description: "Park cleanup".into(),
            date: "2026-09-01".into(),
            time: "09:00".into(),
            location: "Riverside".into(),
            category: "environment".into(),
            capacity: 10,
            registered: 1,
            attendees: vec!["abc".into()],
            image_url: String::new(),
            creator: "creator-id".into(),
            status: EventStatus::Published,
            tags: vec![],
            created_at: "2026-08-01T12:00:00+00:00".into(),
        };

        let plain = EventView::from(event.clone());
        assert!(plain.is_registered.is_none());
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("isRegistered").is_none());

        assert_eq!(
            EventView::from(event.clone()).for_caller("abc").is_registered,
            Some(true)
        );
        assert_eq!(
            EventView::from(event).for_caller("zzz").is_registered,
            Some(false)
        );
    }
}
