//! Repository for the `users` table.

use sqlx::PgPool;
use tna_core::types::DbId;

use crate::models::user::{CreateUser, RoleCount, UpdateUser, User, UserSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, name, password_hash, role, cpf, phone, passport, \
                        address, birth_date, profile_image_key, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, name, password_hash, role, cpf, phone, passport, birth_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(&input.cpf)
            .bind(&input.phone)
            .bind(&input.passport)
            .bind(input.birth_date)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Callers pass the normalized (lower-case) form.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by their 11-digit CPF.
    pub async fn find_by_cpf(pool: &PgPool, cpf: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE cpf = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(cpf)
            .fetch_optional(pool)
            .await
    }

    /// List users ordered by most recently created first, optionally by role.
    pub async fn list(pool: &PgPool, role: Option<&str>) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE ($1::TEXT IS NULL OR role = $1)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_all(pool)
            .await
    }

    /// The `limit` most recently created users.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1");
        sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Number of users per role.
    pub async fn count_by_role(pool: &PgPool) -> Result<Vec<RoleCount>, sqlx::Error> {
        sqlx::query_as::<_, RoleCount>(
            "SELECT role, COUNT(*)::BIGINT AS count FROM users GROUP BY role ORDER BY role",
        )
        .fetch_all(pool)
        .await
    }

    /// MODELO and CLIENTE users whose CPF starts with `prefix`.
    pub async fn search_subjects_by_cpf_prefix(
        pool: &PgPool,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email, cpf, role FROM users
             WHERE cpf LIKE $1 || '%'
               AND role IN ('MODELO', 'CLIENTE')
             ORDER BY cpf
             LIMIT $2",
        )
        .bind(prefix)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// MODELO and CLIENTE users whose name or email contains `text`, or whose
    /// CPF contains `cpf_digits`. Ordered by name, then email.
    pub async fn search_subjects(
        pool: &PgPool,
        text: &str,
        cpf_digits: Option<&str>,
        role: Option<&str>,
        limit: i64,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(text));
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email, cpf, role FROM users
             WHERE role IN ('MODELO', 'CLIENTE')
               AND ($3::TEXT IS NULL OR role = $3)
               AND (name ILIKE $1 ESCAPE '\\'
                    OR email ILIKE $1 ESCAPE '\\'
                    OR ($2::TEXT IS NOT NULL AND cpf LIKE '%' || $2 || '%'))
             ORDER BY name ASC NULLS LAST, email ASC
             LIMIT $4",
        )
        .bind(pattern)
        .bind(cpf_digits)
        .bind(role)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Whether another user (other than `exclude_id`) already has this email.
    pub async fn email_taken(
        pool: &PgPool,
        email: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        Self::value_taken(pool, "email", email, exclude_id).await
    }

    /// Whether another user (other than `exclude_id`) already has this CPF.
    pub async fn cpf_taken(
        pool: &PgPool,
        cpf: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        Self::value_taken(pool, "cpf", cpf, exclude_id).await
    }

    /// Whether another user (other than `exclude_id`) already has this passport.
    pub async fn passport_taken(
        pool: &PgPool,
        passport: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        Self::value_taken(pool, "passport", passport, exclude_id).await
    }

    /// `column` is always one of the fixed names above, never user input.
    async fn value_taken(
        pool: &PgPool,
        column: &'static str,
        value: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS(
                SELECT 1 FROM users WHERE {column} = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )"
        );
        sqlx::query_scalar::<_, bool>(&query)
            .bind(value)
            .bind(exclude_id)
            .fetch_one(pool)
            .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let user = Self::update_inner(&mut tx, id, input).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// [`update`](Self::update) within an existing transaction.
    pub(crate) async fn update_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                email = COALESCE($2, email),
                name = COALESCE($3, name),
                role = COALESCE($4, role),
                cpf = COALESCE($5, cpf),
                phone = COALESCE($6, phone),
                passport = COALESCE($7, passport),
                address = COALESCE($8, address),
                birth_date = COALESCE($9, birth_date),
                profile_image_key = COALESCE($10, profile_image_key)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.role)
            .bind(&input.cpf)
            .bind(&input.phone)
            .bind(&input.passport)
            .bind(&input.address)
            .bind(input.birth_date)
            .bind(&input.profile_image_key)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Replace the password hash. Returns `true` if the user exists.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a user by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("ana"), "ana");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
