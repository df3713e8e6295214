use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Document, doc};

use gather_types::models::{PasswordReset, User};

use crate::{Database, DbError, Result, is_duplicate_key};

impl Database {
    // -- Accounts --

    pub async fn insert_user(&self, mut user: User) -> Result<ObjectId> {
        let id = *user.id.get_or_insert_with(ObjectId::new);

        self.users.insert_one(&user).await.map_err(|err| {
            if is_duplicate_key(&err) {
                DbError::DuplicateKey
            } else {
                DbError::Driver(err)
            }
        })?;

        Ok(id)
    }

    pub async fn find_user_by_id(&self, id: ObjectId) -> Result<Option<User>> {
        Ok(self.users.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.find_one(doc! { "email": email }).await?)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let cursor = self.users.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Apply a prebuilt `$set` document. Returns the matched count; an email
    /// change can still trip the unique index.
    pub async fn update_user(&self, id: ObjectId, fields: Document) -> Result<u64> {
        let result = self
            .users
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await
            .map_err(|err| {
                if is_duplicate_key(&err) {
                    DbError::DuplicateKey
                } else {
                    DbError::Driver(err)
                }
            })?;
        Ok(result.matched_count)
    }

    // -- Password reset --

    pub async fn set_password_reset(&self, id: ObjectId, reset: &PasswordReset) -> Result<u64> {
        let result = self
            .users
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "passwordReset": {
                    "token": &reset.token,
                    "expiresAt": &reset.expires_at,
                } } },
            )
            .await?;
        Ok(result.matched_count)
    }

    pub async fn find_user_by_reset_token(&self, token: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .find_one(doc! { "passwordReset.token": token })
            .await?)
    }

    /// Replace the password hash and clear the reset credential in one write,
    /// so a redeemed token can never be replayed.
    pub async fn complete_password_reset(&self, id: ObjectId, password_hash: &str) -> Result<u64> {
        let result = self
            .users
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": { "password": password_hash },
                    "$unset": { "passwordReset": "" },
                },
            )
            .await?;
        Ok(result.matched_count)
    }

    // -- Counters --

    pub async fn inc_events_created(&self, id: ObjectId) -> Result<()> {
        self.users
            .update_one(doc! { "_id": id }, doc! { "$inc": { "eventsCreated": 1 } })
            .await?;
        Ok(())
    }

    pub async fn inc_volunteer_hours(&self, id: ObjectId, hours: f64) -> Result<()> {
        self.users
            .update_one(
                doc! { "_id": id },
                doc! { "$inc": { "volunteerHours": hours } },
            )
            .await?;
        Ok(())
    }

    // -- Admin counts --

    pub async fn count_active_users(&self) -> Result<u64> {
        Ok(self.users.count_documents(doc! { "status": "active" }).await?)
    }

    /// Join dates are RFC 3339 strings; lexicographic `$gte` is equivalent to
    /// a chronological comparison for that format.
    pub async fn count_users_joined_since(&self, cutoff: &str) -> Result<u64> {
        Ok(self
            .users
            .count_documents(doc! { "joinDate": { "$gte": cutoff } })
            .await?)
    }
}
