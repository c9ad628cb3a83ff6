use crate::models::Profile;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Insert a profile. Accepts a pool or an open transaction.
pub async fn insert_profile<'e, E>(executor: E, profile: &Profile) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO profiles (id, account_id, name, avatar, bio, is_default, interests, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(profile.id)
    .bind(profile.account_id)
    .bind(&profile.name)
    .bind(&profile.avatar)
    .bind(&profile.bio)
    .bind(profile.is_default)
    .bind(&profile.interests)
    .bind(profile.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn find_profile_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        r#"
        SELECT id, account_id, name, avatar, bio, is_default, interests, created_at
        FROM profiles
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_profiles_by_account(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Vec<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        r#"
        SELECT id, account_id, name, avatar, bio, is_default, interests, created_at
        FROM profiles
        WHERE account_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
}

pub async fn find_profiles_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<Profile>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Profile>(
        r#"
        SELECT id, account_id, name, avatar, bio, is_default, interests, created_at
        FROM profiles
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub async fn update_profile(pool: &PgPool, profile: &Profile) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE profiles
        SET name = $2, avatar = $3, bio = $4, is_default = $5, interests = $6
        WHERE id = $1
        "#,
    )
    .bind(profile.id)
    .bind(&profile.name)
    .bind(&profile.avatar)
    .bind(&profile.bio)
    .bind(profile.is_default)
    .bind(&profile.interests)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_profile(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
