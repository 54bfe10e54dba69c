use crate::auth::repo_types::User;
use sqlx::PgPool;
use uuid::Uuid;

impl User {
    /// Find a user by username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, username, email, password_hash, role,
                   is_active, activation_code, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, username, email, password_hash, role,
                   is_active, activation_code, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Login lookup by username or email. Whether the account may log in
    /// is decided by the caller, not here.
    pub async fn find_by_identifier(
        db: &PgPool,
        identifier: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, username, email, password_hash, role,
                   is_active, activation_code, created_at, updated_at
            FROM users
            WHERE username = $1 OR email = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, username, email, password_hash, role,
                   is_active, activation_code, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user. Password arrives already hashed and the activation
    /// code already derived; this layer never sees plaintext.
    pub async fn create(
        db: &PgPool,
        id: Uuid,
        full_name: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        activation_code: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, full_name, username, email, password_hash, activation_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, full_name, username, email, password_hash, role,
                      is_active, activation_code, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(activation_code)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Activation lookup. The code column is never cleared, so the same
    /// code keeps resolving to its record after activation.
    pub async fn find_by_activation_code(db: &PgPool, code: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, username, email, password_hash, role,
                   is_active, activation_code, created_at, updated_at
            FROM users
            WHERE activation_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Flip `is_active` on. There is no reverse operation.
    pub async fn activate(db: &PgPool, id: Uuid) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = TRUE, updated_at = now()
            WHERE id = $1
            RETURNING id, full_name, username, email, password_hash, role,
                      is_active, activation_code, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}
