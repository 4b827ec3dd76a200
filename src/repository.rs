use async_trait::async_trait;
use sqlx::{PgPool, types::Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{
        Comment, DeleteResult, Document, EngagementPayload, InsertResult, Like, Post,
        UpdateResult, UpsertResult, User, seller_email,
    },
};

/// Repository Trait
///
/// The contract for every document operation on the four collections. Handlers
/// only see this trait, so the Postgres backend and the in-memory backend are
/// interchangeable.
///
/// Authorization is **not** part of this contract: the access guard and the
/// handlers decide who may call what, the repository just executes.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- User Directory ---
    // Creates the profile or replaces it entirely. Repeating an identical call is a no-op.
    async fn upsert_user(&self, user: User) -> Result<UpsertResult, StoreError>;
    async fn get_user(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    // --- Content Store ---
    // The store assigns the id. `seller.email` is not validated.
    async fn create_post(&self, fields: Document) -> Result<InsertResult, StoreError>;
    async fn get_post(&self, id: &str) -> Result<Option<Post>, StoreError>;
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;
    async fn list_posts_by_seller(&self, email: &str) -> Result<Vec<Post>, StoreError>;
    // Shallow merge of top-level fields. A missing id is reported, never created.
    async fn update_post(&self, id: &str, patch: Document) -> Result<UpdateResult, StoreError>;

    // --- Engagement Store ---
    async fn add_comment(&self, payload: EngagementPayload) -> Result<InsertResult, StoreError>;
    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, StoreError>;
    async fn add_like(&self, payload: EngagementPayload) -> Result<InsertResult, StoreError>;
    async fn list_likes(&self, post_id: &str) -> Result<Vec<Like>, StoreError>;
    // Removes at most one like targeting the post: the oldest one.
    async fn remove_like(&self, post_id: &str) -> Result<DeleteResult, StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

const COMMENTS: &str = "comments";
const LIKES: &str = "likes";

/// PostgresRepository
///
/// Stores each collection as JSONB documents. The join keys (`email`, post `id`,
/// target `post_id`) are real columns; everything else lives in the JSONB bag.
/// A `seq` identity column gives every table a natural insertion order.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations. Safe to call on every startup.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Releases every pooled connection. Called once on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn insert_engagement(
        &self,
        table: &str,
        payload: EngagementPayload,
    ) -> Result<InsertResult, StoreError> {
        let id = new_id();
        let sql = format!("INSERT INTO {table} (id, post_id, payload) VALUES ($1, $2, $3)");
        sqlx::query(&sql)
            .bind(&id)
            .bind(&payload.post_id)
            .bind(Json(&payload))
            .execute(&self.pool)
            .await?;
        Ok(InsertResult::new(id))
    }

    async fn find_engagements(
        &self,
        table: &str,
        post_id: &str,
    ) -> Result<Vec<(String, EngagementPayload)>, StoreError> {
        let sql = format!("SELECT id, payload FROM {table} WHERE post_id = $1 ORDER BY seq");
        let rows: Vec<(String, Json<EngagementPayload>)> = sqlx::query_as(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id, Json(payload))| (id, payload)).collect())
    }
}

/// `(key, JSONB bag)` as read back from the users and posts tables.
type DocumentRow = (String, Json<Document>);

fn into_user((email, Json(profile)): DocumentRow) -> User {
    User { email, profile }
}

fn into_post((id, Json(fields)): DocumentRow) -> Post {
    Post { id, fields }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// upsert_user
    ///
    /// `ON CONFLICT ... DO UPDATE` replaces the whole profile. The `previous` CTE
    /// reads the row as it was before the statement, which tells a real change
    /// apart from an identical re-upsert.
    async fn upsert_user(&self, user: User) -> Result<UpsertResult, StoreError> {
        let (inserted, previous): (bool, Option<Json<Document>>) = sqlx::query_as(
            r#"
            WITH previous AS (SELECT profile FROM users WHERE email = $1)
            INSERT INTO users (email, profile) VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE SET profile = EXCLUDED.profile, updated_at = NOW()
            RETURNING (xmax = 0) AS inserted, (SELECT profile FROM previous) AS previous
            "#,
        )
        .bind(&user.email)
        .bind(Json(&user.profile))
        .fetch_one(&self.pool)
        .await?;

        if inserted {
            Ok(UpsertResult::inserted(user.email))
        } else {
            let modified = previous.is_none_or(|Json(old)| old != user.profile);
            Ok(UpsertResult::replaced(modified))
        }
    }

    async fn get_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<DocumentRow> = sqlx::query_as("SELECT email, profile FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(into_user))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows: Vec<DocumentRow> = sqlx::query_as("SELECT email, profile FROM users ORDER BY created_at, email")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(into_user).collect())
    }

    async fn create_post(&self, fields: Document) -> Result<InsertResult, StoreError> {
        let post = Post::new(new_id(), fields);
        sqlx::query("INSERT INTO posts (id, fields) VALUES ($1, $2)")
            .bind(&post.id)
            .bind(Json(&post.fields))
            .execute(&self.pool)
            .await?;
        Ok(InsertResult::new(post.id))
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>, StoreError> {
        let row: Option<DocumentRow> = sqlx::query_as("SELECT id, fields FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(into_post))
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let rows: Vec<DocumentRow> = sqlx::query_as("SELECT id, fields FROM posts ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(into_post).collect())
    }

    /// list_posts_by_seller
    ///
    /// Filters on the nested `seller.email` path, backed by an expression index.
    async fn list_posts_by_seller(&self, email: &str) -> Result<Vec<Post>, StoreError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT id, fields FROM posts WHERE fields->'seller'->>'email' = $1 ORDER BY seq",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(into_post).collect())
    }

    /// update_post
    ///
    /// JSONB `||` merges the patch over the stored top-level keys. The self-join
    /// exposes the pre-update document so `modifiedCount` can be reported.
    async fn update_post(&self, id: &str, mut patch: Document) -> Result<UpdateResult, StoreError> {
        patch.remove("_id");
        let changed: Option<bool> = sqlx::query_scalar(
            r#"
            UPDATE posts AS p SET fields = p.fields || $2
            FROM posts AS prev
            WHERE p.id = $1 AND prev.id = p.id
            RETURNING p.fields IS DISTINCT FROM prev.fields
            "#,
        )
        .bind(id)
        .bind(Json(&patch))
        .fetch_optional(&self.pool)
        .await?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: u64::from(changed.is_some()),
            modified_count: u64::from(changed.unwrap_or(false)),
        })
    }

    async fn add_comment(&self, payload: EngagementPayload) -> Result<InsertResult, StoreError> {
        self.insert_engagement(COMMENTS, payload).await
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, StoreError> {
        let rows = self.find_engagements(COMMENTS, post_id).await?;
        Ok(rows
            .into_iter()
            .map(|(id, comment)| Comment { id, comment })
            .collect())
    }

    async fn add_like(&self, payload: EngagementPayload) -> Result<InsertResult, StoreError> {
        self.insert_engagement(LIKES, payload).await
    }

    async fn list_likes(&self, post_id: &str) -> Result<Vec<Like>, StoreError> {
        let rows = self.find_engagements(LIKES, post_id).await?;
        Ok(rows.into_iter().map(|(id, like)| Like { id, like }).collect())
    }

    async fn remove_like(&self, post_id: &str) -> Result<DeleteResult, StoreError> {
        let result = sqlx::query(
            "DELETE FROM likes WHERE seq = (SELECT seq FROM likes WHERE post_id = $1 ORDER BY seq LIMIT 1)",
        )
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }
}

/// InMemoryRepository
///
/// A process-local implementation of `Repository`. Each collection is a `Vec` kept
/// in insertion order behind its own lock, which mirrors the natural ordering of
/// the Postgres backend. Used for local development without a database and by the
/// test suite.
#[derive(Default)]
pub struct InMemoryRepository {
    users: RwLock<Vec<User>>,
    posts: RwLock<Vec<Post>>,
    comments: RwLock<Vec<Comment>>,
    likes: RwLock<Vec<Like>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn upsert_user(&self, user: User) -> Result<UpsertResult, StoreError> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.email == user.email) {
            Some(existing) => {
                let modified = existing.profile != user.profile;
                *existing = user;
                Ok(UpsertResult::replaced(modified))
            }
            None => {
                let email = user.email.clone();
                users.push(user);
                Ok(UpsertResult::inserted(email))
            }
        }
    }

    async fn get_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn create_post(&self, fields: Document) -> Result<InsertResult, StoreError> {
        let post = Post::new(new_id(), fields);
        let result = InsertResult::new(post.id.clone());
        self.posts.write().await.push(post);
        Ok(result)
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>, StoreError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        Ok(self.posts.read().await.clone())
    }

    async fn list_posts_by_seller(&self, email: &str) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .filter(|p| seller_email(&p.fields) == Some(email))
            .cloned()
            .collect())
    }

    async fn update_post(&self, id: &str, mut patch: Document) -> Result<UpdateResult, StoreError> {
        patch.remove("_id");
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
            });
        };

        let mut modified = false;
        for (key, value) in patch {
            if post.fields.get(&key) != Some(&value) {
                post.fields.insert(key, value);
                modified = true;
            }
        }

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn add_comment(&self, payload: EngagementPayload) -> Result<InsertResult, StoreError> {
        let comment = Comment {
            id: new_id(),
            comment: payload,
        };
        let result = InsertResult::new(comment.id.clone());
        self.comments.write().await.push(comment);
        Ok(result)
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, StoreError> {
        let comments = self.comments.read().await;
        Ok(comments
            .iter()
            .filter(|c| c.comment.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn add_like(&self, payload: EngagementPayload) -> Result<InsertResult, StoreError> {
        let like = Like {
            id: new_id(),
            like: payload,
        };
        let result = InsertResult::new(like.id.clone());
        self.likes.write().await.push(like);
        Ok(result)
    }

    async fn list_likes(&self, post_id: &str) -> Result<Vec<Like>, StoreError> {
        let likes = self.likes.read().await;
        Ok(likes
            .iter()
            .filter(|l| l.like.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn remove_like(&self, post_id: &str) -> Result<DeleteResult, StoreError> {
        let mut likes = self.likes.write().await;
        let deleted_count = match likes.iter().position(|l| l.like.post_id == post_id) {
            Some(index) => {
                likes.remove(index);
                1
            }
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }
}
