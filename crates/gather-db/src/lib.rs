pub mod announcements;
pub mod events;
pub mod forum;
pub mod users;
pub mod volunteers;

use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use thiserror::Error;
use tracing::info;

use gather_types::models::{Announcement, Event, ForumThread, User, VolunteerRecord};

pub use events::RegisterOutcome;

#[derive(Debug, Error)]
pub enum DbError {
    /// A unique index rejected the write: duplicate email, or duplicate
    /// (userId, eventId) volunteer pair.
    #[error("duplicate key")]
    DuplicateKey,
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Handle to the document store. One per process, cloned into handler state.
#[derive(Clone)]
pub struct Database {
    pub(crate) users: Collection<User>,
    pub(crate) events: Collection<Event>,
    pub(crate) announcements: Collection<Announcement>,
    pub(crate) forum_threads: Collection<ForumThread>,
    pub(crate) volunteers: Collection<VolunteerRecord>,
}

impl Database {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(db_name);

        let database = Self {
            users: db.collection("users"),
            events: db.collection("events"),
            announcements: db.collection("announcements"),
            forum_threads: db.collection("forum_threads"),
            volunteers: db.collection("volunteers"),
        };
        database.ensure_indexes().await?;

        info!("Document store ready: {}", db_name);
        Ok(database)
    }

    /// Unique indexes close the check-then-insert races: concurrent writers
    /// that pass the handler pre-checks still serialize here.
    async fn ensure_indexes(&self) -> Result<()> {
        let unique = IndexOptions::builder().unique(true).build();

        self.users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique.clone())
                    .build(),
            )
            .await?;

        self.volunteers
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "userId": 1, "eventId": 1 })
                    .options(unique)
                    .build(),
            )
            .await?;

        Ok(())
    }
}

/// True when the server rejected a write for violating a unique index.
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write)) if write.code == 11000
    )
}
