use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::doc;

use gather_types::models::VolunteerRecord;

use crate::{Database, DbError, Result, is_duplicate_key};

impl Database {
    pub async fn insert_volunteer(&self, mut record: VolunteerRecord) -> Result<ObjectId> {
        let id = *record.id.get_or_insert_with(ObjectId::new);

        self.volunteers.insert_one(&record).await.map_err(|err| {
            if is_duplicate_key(&err) {
                DbError::DuplicateKey
            } else {
                DbError::Driver(err)
            }
        })?;

        Ok(id)
    }

    pub async fn find_volunteer(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<VolunteerRecord>> {
        Ok(self
            .volunteers
            .find_one(doc! { "userId": user_id, "eventId": event_id })
            .await?)
    }

    pub async fn list_volunteers(&self) -> Result<Vec<VolunteerRecord>> {
        let cursor = self.volunteers.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn list_volunteers_by_user(&self, user_id: &str) -> Result<Vec<VolunteerRecord>> {
        let cursor = self.volunteers.find(doc! { "userId": user_id }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn list_volunteers_by_event(&self, event_id: &str) -> Result<Vec<VolunteerRecord>> {
        let cursor = self.volunteers.find(doc! { "eventId": event_id }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_volunteers(&self) -> Result<u64> {
        Ok(self.volunteers.count_documents(doc! {}).await?)
    }
}
