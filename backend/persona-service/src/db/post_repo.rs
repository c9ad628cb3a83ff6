use super::{PageWindow, PostFilter, StoreError, StoreResult};
use crate::models::{Comment, Post, PostImage};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const POST_COLUMNS: &str = "id, account_id, profile_id, caption, images, hashtags, likes, \
                            comments, created_at, updated_at";

/// Paged listing, newest first; `id` breaks timestamp ties so pages never
/// overlap. `$1`/`$2` are limit and offset, filters bind from `$3`.
fn listing_sql(filter: &str) -> String {
    format!(
        "SELECT {} FROM posts {} ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        POST_COLUMNS, filter
    )
}

/// Row shape of `posts`; JSONB columns decode into typed vectors
#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    account_id: Uuid,
    profile_id: Uuid,
    caption: String,
    images: Json<Vec<PostImage>>,
    hashtags: Vec<String>,
    likes: Vec<Uuid>,
    comments: Json<Vec<Comment>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            account_id: row.account_id,
            profile_id: row.profile_id,
            caption: row.caption,
            images: row.images.0,
            hashtags: row.hashtags,
            likes: row.likes,
            comments: row.comments.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn decode_rows(rows: Vec<PostRow>) -> Vec<Post> {
    rows.into_iter().map(Post::from).collect()
}

pub async fn insert_post(pool: &PgPool, post: &Post) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO posts (id, account_id, profile_id, caption, images, hashtags, likes, comments, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(post.id)
    .bind(post.account_id)
    .bind(post.profile_id)
    .bind(&post.caption)
    .bind(Json(&post.images))
    .bind(&post.hashtags)
    .bind(&post.likes)
    .bind(Json(&post.comments))
    .bind(post.created_at)
    .bind(post.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_post_by_id(pool: &PgPool, id: Uuid) -> StoreResult<Option<Post>> {
    let row = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {} FROM posts WHERE id = $1",
        POST_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(decode_error)?;

    Ok(row.map(Post::from))
}

/// Decode failures on the JSONB columns are data corruption, not outages
fn decode_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::Corrupt(format!("posts.{}: {}", index, source))
        }
        other => StoreError::Database(other),
    }
}

pub async fn update_post(pool: &PgPool, post: &Post) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE posts
        SET caption = $2, hashtags = $3, likes = $4, comments = $5, updated_at = $6
        WHERE id = $1
        "#,
    )
    .bind(post.id)
    .bind(&post.caption)
    .bind(&post.hashtags)
    .bind(&post.likes)
    .bind(Json(&post.comments))
    .bind(post.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_post(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn find_posts(
    pool: &PgPool,
    filter: &PostFilter,
    window: PageWindow,
) -> StoreResult<Vec<Post>> {
    let rows = match filter {
        PostFilter::Nothing => return Ok(Vec::new()),
        PostFilter::All => {
            sqlx::query_as::<_, PostRow>(&listing_sql(""))
                .bind(window.limit)
                .bind(window.offset)
                .fetch_all(pool)
                .await
        }
        PostFilter::HashtagsAny(tags) => {
            sqlx::query_as::<_, PostRow>(&listing_sql("WHERE hashtags && $3"))
                .bind(window.limit)
                .bind(window.offset)
                .bind(tags)
                .fetch_all(pool)
                .await
        }
        PostFilter::Profile(profile_id) => {
            sqlx::query_as::<_, PostRow>(&listing_sql("WHERE profile_id = $3"))
                .bind(window.limit)
                .bind(window.offset)
                .bind(profile_id)
                .fetch_all(pool)
                .await
        }
    }
    .map_err(decode_error)?;

    Ok(decode_rows(rows))
}

pub async fn count_posts(pool: &PgPool, filter: &PostFilter) -> Result<i64, sqlx::Error> {
    let count = match filter {
        PostFilter::Nothing => 0,
        PostFilter::All => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
                .fetch_one(pool)
                .await?
        }
        PostFilter::HashtagsAny(tags) => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE hashtags && $1")
                .bind(tags)
                .fetch_one(pool)
                .await?
        }
        PostFilter::Profile(profile_id) => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE profile_id = $1")
                .bind(profile_id)
                .fetch_one(pool)
                .await?
        }
    };

    Ok(count)
}
