use super::{profile_repo, StoreError, StoreResult};
use crate::models::{Account, Profile};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str =
    "id, full_name, username, email, password_hash, avatar, bio, website, created_at";

/// Translate unique-index violations on accounts into `StoreError::Duplicate`
fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("accounts_email_key") => return StoreError::Duplicate("email"),
                Some("accounts_username_key") => return StoreError::Duplicate("username"),
                _ => {}
            }
        }
    }
    StoreError::Database(err)
}

/// Insert an account and its default profile in one transaction
pub async fn register_account(
    pool: &PgPool,
    account: &Account,
    default_profile: &Profile,
) -> StoreResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO accounts (id, full_name, username, email, password_hash, avatar, bio, website, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(account.id)
    .bind(&account.full_name)
    .bind(&account.username)
    .bind(&account.email)
    .bind(&account.password_hash)
    .bind(&account.avatar)
    .bind(&account.bio)
    .bind(&account.website)
    .bind(account.created_at)
    .execute(&mut *tx)
    .await
    .map_err(map_unique_violation)?;

    profile_repo::insert_profile(&mut *tx, default_profile).await?;

    tx.commit().await?;
    Ok(())
}

pub async fn find_account_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {} FROM accounts WHERE id = $1",
        ACCOUNT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_account_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {} FROM accounts WHERE email = $1",
        ACCOUNT_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_account_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {} FROM accounts WHERE username = $1",
        ACCOUNT_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn update_account(pool: &PgPool, account: &Account) -> StoreResult<()> {
    sqlx::query(
        r#"
        UPDATE accounts
        SET full_name = $2, username = $3, bio = $4, website = $5, avatar = $6
        WHERE id = $1
        "#,
    )
    .bind(account.id)
    .bind(&account.full_name)
    .bind(&account.username)
    .bind(&account.bio)
    .bind(&account.website)
    .bind(&account.avatar)
    .execute(pool)
    .await
    .map_err(map_unique_violation)?;

    Ok(())
}

/// Escape LIKE metacharacters so the query is matched literally
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub async fn search_accounts(pool: &PgPool, query: &str) -> Result<Vec<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(&format!(
        r#"
        SELECT {}
        FROM accounts
        WHERE username ILIKE $1 OR full_name ILIKE $1
        ORDER BY username
        "#,
        ACCOUNT_COLUMNS
    ))
    .bind(like_pattern(query))
    .fetch_all(pool)
    .await
}

pub async fn usernames_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, username FROM accounts WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}
