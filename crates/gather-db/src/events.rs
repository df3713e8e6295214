use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Document, doc};

use gather_types::models::{Event, EventStatus};

use crate::{Database, Result};

/// Result of the conditional registration write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    EventNotFound,
    AlreadyRegistered,
    Full,
}

impl Database {
    pub async fn insert_event(&self, mut event: Event) -> Result<ObjectId> {
        let id = *event.id.get_or_insert_with(ObjectId::new);
        self.events.insert_one(&event).await?;
        Ok(id)
    }

    pub async fn find_event(&self, id: ObjectId) -> Result<Option<Event>> {
        Ok(self.events.find_one(doc! { "_id": id }).await?)
    }

    /// Listing surface: published and pending events, soonest first.
    pub async fn list_listable_events(&self, category: Option<&str>) -> Result<Vec<Event>> {
        let mut filter = doc! { "status": { "$in": ["published", "pending"] } };
        if let Some(category) = category {
            filter.insert("category", category);
        }

        let cursor = self.events.find(filter).sort(doc! { "date": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn list_events_by_creator(&self, creator: &str) -> Result<Vec<Event>> {
        let cursor = self
            .events
            .find(doc! { "creator": creator })
            .sort(doc! { "date": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update_event(&self, id: ObjectId, fields: Document) -> Result<u64> {
        let result = self
            .events
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count)
    }

    pub async fn delete_event(&self, id: ObjectId) -> Result<u64> {
        let result = self.events.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count)
    }

    /// Register `user_id` for the event in a single conditional write: the
    /// filter admits the document only while the user is absent from the
    /// registered-list and the list is below capacity, so concurrent callers
    /// cannot overshoot. A failed match is classified with a follow-up read.
    pub async fn register_attendee(&self, id: ObjectId, user_id: &str) -> Result<RegisterOutcome> {
        let filter = doc! {
            "_id": id,
            "attendees": { "$ne": user_id },
            "$expr": { "$lt": [ { "$size": "$attendees" }, "$capacity" ] },
        };
        let update = doc! {
            "$push": { "attendees": user_id },
            "$inc": { "registered": 1 },
        };

        let result = self.events.update_one(filter, update).await?;
        if result.matched_count == 1 {
            return Ok(RegisterOutcome::Registered);
        }

        let event = self.find_event(id).await?;
        Ok(classify_unmatched(event.as_ref(), user_id))
    }

    // -- Admin --

    /// Approval queue: everything not yet through the gate.
    pub async fn list_pending_events(&self) -> Result<Vec<Event>> {
        let cursor = self
            .events
            .find(doc! { "status": { "$in": ["pending", "draft"] } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Returns the matched count; setting an already-set status matches but
    /// modifies nothing, which keeps approve/reject idempotent.
    pub async fn set_event_status(&self, id: ObjectId, status: EventStatus) -> Result<u64> {
        let result = self
            .events
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str() } },
            )
            .await?;
        Ok(result.matched_count)
    }

    pub async fn count_published_events(&self) -> Result<u64> {
        Ok(self
            .events
            .count_documents(doc! { "status": "published" })
            .await?)
    }

    pub async fn top_registered_events(&self, limit: i64) -> Result<Vec<Event>> {
        let cursor = self
            .events
            .find(doc! { "status": "published" })
            .sort(doc! { "registered": -1 })
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

fn classify_unmatched(event: Option<&Event>, user_id: &str) -> RegisterOutcome {
    match event {
        None => RegisterOutcome::EventNotFound,
        Some(event) if event.attendees.iter().any(|a| a == user_id) => {
            RegisterOutcome::AlreadyRegistered
        }
        Some(_) => RegisterOutcome::Full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(attendees: &[&str], capacity: i64) -> Event {
        Event {
            id: Some(ObjectId::new()),
            title: "Cleanup".into(),
            description: "Park cleanup".into(),
            date: "2026-09-01".into(),
            time: "09:00".into(),
            location: "Riverside".into(),
            category: "environment".into(),
            capacity,
            registered: attendees.len() as i64,
            attendees: attendees.iter().map(|a| a.to_string()).collect(),
            image_url: String::new(),
            creator: "creator-id".into(),
            status: EventStatus::Published,
            tags: vec![],
            created_at: "2026-08-01T12:00:00+00:00".into(),
        }
    }

    #[test]
    fn missing_event_is_not_found() {
        assert_eq!(classify_unmatched(None, "u1"), RegisterOutcome::EventNotFound);
    }

    #[test]
    fn repeat_registration_is_conflict_even_when_full() {
        // Membership wins over capacity so the caller gets the precise error.
        let ev = event(&["u1"], 1);
        assert_eq!(
            classify_unmatched(Some(&ev), "u1"),
            RegisterOutcome::AlreadyRegistered
        );
    }

    #[test]
    fn capacity_reached_is_full() {
        let ev = event(&["u1"], 1);
        assert_eq!(classify_unmatched(Some(&ev), "u2"), RegisterOutcome::Full);
    }
}
