use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::doc;

use gather_types::models::ForumThread;

use crate::{Database, Result};

impl Database {
    pub async fn insert_thread(&self, mut thread: ForumThread) -> Result<ObjectId> {
        let id = *thread.id.get_or_insert_with(ObjectId::new);
        self.forum_threads.insert_one(&thread).await?;
        Ok(id)
    }

    /// Newest first.
    pub async fn list_threads(&self, category: Option<&str>) -> Result<Vec<ForumThread>> {
        let mut filter = doc! {};
        if let Some(category) = category {
            filter.insert("category", category);
        }

        let cursor = self
            .forum_threads
            .find(filter)
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn delete_thread(&self, id: ObjectId) -> Result<u64> {
        let result = self.forum_threads.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count)
    }

    /// Idempotent: pinning a pinned thread matches without modifying.
    pub async fn pin_thread(&self, id: ObjectId) -> Result<u64> {
        let result = self
            .forum_threads
            .update_one(doc! { "_id": id }, doc! { "$set": { "isPinned": true } })
            .await?;
        Ok(result.matched_count)
    }

    pub async fn count_threads(&self) -> Result<u64> {
        Ok(self.forum_threads.count_documents(doc! {}).await?)
    }
}
