//! Identity repository: registration and lookup.

use courier_common::{
    crypto::{allocate_code, IdentifierSet, MAX_CODE_ATTEMPTS},
    error::{CourierError, CourierResult},
    models::identity::Identity,
};
use sqlx::SqlitePool;

/// Fields written at registration.
#[derive(Debug, Clone, Copy)]
pub struct NewIdentity<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
    pub public_key: &'a str,
    /// Only `Some` when the server retains private keys.
    pub private_key: Option<&'a str>,
    pub created_at: i64,
}

/// Insert a new identity.
pub async fn create_identity(pool: &SqlitePool, new: NewIdentity<'_>) -> Result<Identity, sqlx::Error> {
    sqlx::query_as::<_, Identity>(
        r#"
        INSERT INTO identities (id, email, phone, password_hash, public_key, private_key, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(new.id)
    .bind(new.email)
    .bind(new.phone)
    .bind(new.password_hash)
    .bind(new.public_key)
    .bind(new.private_key)
    .bind(new.created_at)
    .fetch_one(pool)
    .await
}

/// Insert `new`, drawing a fresh code from `live` whenever its id turns out
/// to be taken.
///
/// Allocating a code and inserting it are separate steps, so a concurrent
/// registration can claim the same code in between. Email and phone conflicts
/// surface as `AlreadyExists` naming the field.
pub async fn insert_unique<S: IdentifierSet>(
    pool: &SqlitePool,
    live: &S,
    new: NewIdentity<'_>,
) -> CourierResult<Identity> {
    let mut code = new.id.to_owned();
    for _ in 0..MAX_CODE_ATTEMPTS {
        let err = match create_identity(pool, NewIdentity { id: &code, ..new }).await {
            Ok(identity) => return Ok(identity),
            Err(err) => err,
        };
        match unique_column(&err) {
            Some("id") => {
                tracing::debug!(code = %code, "Identity code claimed concurrently, drawing again");
                code = allocate_code(live).await?;
            }
            Some("email") => {
                return Err(CourierError::AlreadyExists {
                    resource: "Email".into(),
                })
            }
            Some("phone") => {
                return Err(CourierError::AlreadyExists {
                    resource: "Phone".into(),
                })
            }
            _ => return Err(err.into()),
        }
    }
    Err(CourierError::KeyGeneration(format!(
        "identity code still contended after {MAX_CODE_ATTEMPTS} inserts"
    )))
}

/// Column of `identities` named by a unique-constraint failure.
fn unique_column(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db) => db.message().strip_prefix("UNIQUE constraint failed: identities."),
        _ => None,
    }
}

/// Find an identity by its code.
pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Identity>, sqlx::Error> {
    sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Find an identity by email (case-insensitive).
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Identity>, sqlx::Error> {
    sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE email = ? COLLATE NOCASE")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Find an identity by phone number.
pub async fn find_by_phone(pool: &SqlitePool, phone: &str) -> Result<Option<Identity>, sqlx::Error> {
    sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE phone = ?")
        .bind(phone)
        .fetch_optional(pool)
        .await
}

/// Public key of an identity, without loading the rest of the row.
pub async fn public_key(pool: &SqlitePool, id: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT public_key FROM identities WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Whether an identity code is taken.
pub async fn exists(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT EXISTS(SELECT 1 FROM identities WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await
        .map(|found| found != 0)
}
