use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::doc;

use gather_types::models::Announcement;

use crate::{Database, Result};

impl Database {
    pub async fn insert_announcement(&self, mut announcement: Announcement) -> Result<ObjectId> {
        let id = *announcement.id.get_or_insert_with(ObjectId::new);
        self.announcements.insert_one(&announcement).await?;
        Ok(id)
    }

    /// Newest first.
    pub async fn list_announcements(&self, kind: Option<&str>) -> Result<Vec<Announcement>> {
        let mut filter = doc! {};
        if let Some(kind) = kind {
            filter.insert("type", kind);
        }

        let cursor = self
            .announcements
            .find(filter)
            .sort(doc! { "date": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn delete_announcement(&self, id: ObjectId) -> Result<u64> {
        let result = self.announcements.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count)
    }
}
