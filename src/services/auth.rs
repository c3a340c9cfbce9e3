//! Authentication service: password hashing, JWT, login, and admin management.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::conflict_on_unique;
use crate::errors::AppError;
use crate::models::admin::{Admin, CreateAdmin};

const INCORRECT_CREDENTIALS: &str = "Incorrect email or password";

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub admin_id: String,
    pub role: String,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned on successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Token settings taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct TokenSettings<'a> {
    pub secret: &'a str,
    pub access_expiry_secs: i64,
    pub refresh_expiry_secs: i64,
}

impl<'a> From<&'a AppConfig> for TokenSettings<'a> {
    fn from(config: &'a AppConfig) -> Self {
        Self {
            secret: &config.jwt_secret,
            access_expiry_secs: config.jwt_access_token_expiry_secs,
            refresh_expiry_secs: config.jwt_refresh_token_expiry_secs,
        }
    }
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a JWT token pair (access + refresh).
pub fn generate_tokens(admin: &Admin, settings: TokenSettings<'_>) -> Result<TokenPair, AppError> {
    let now = Utc::now();
    let encoding_key = EncodingKey::from_secret(settings.secret.as_bytes());

    let access_claims = Claims {
        sub: admin.email.clone(),
        admin_id: admin.id.to_string(),
        role: admin.role.as_claim().to_string(),
        token_type: "access".to_string(),
        exp: (now + Duration::seconds(settings.access_expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    let refresh_claims = Claims {
        token_type: "refresh".to_string(),
        exp: (now + Duration::seconds(settings.refresh_expiry_secs)).timestamp(),
        ..access_claims.clone()
    };

    let access_token = jsonwebtoken::encode(&Header::default(), &access_claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    let refresh_token = jsonwebtoken::encode(&Header::default(), &refresh_claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: settings.access_expiry_secs,
    })
}

/// Validate a JWT and return the claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let validation = Validation::default();

    jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Unauthorized("Invalid token. Please log in again!".to_string())
        })
}

/// Create a new admin with hashed password.
pub async fn create_admin(pool: &PgPool, input: &CreateAdmin) -> Result<Admin, AppError> {
    let password_hash = hash_password(&input.password)?;

    let admin = sqlx::query_as::<_, Admin>(
        r#"
        INSERT INTO admins (id, name, email, password_hash, role)
        VALUES ($1, $2, LOWER($3), $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(&input.name)
    .bind(&input.email)
    .bind(&password_hash)
    .bind(input.role)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, "An admin with that email already exists"))?;

    Ok(admin)
}

/// Authenticate an admin by email and password.
pub async fn login(
    pool: &PgPool,
    email: &str,
    password: &str,
    settings: TokenSettings<'_>,
) -> Result<(Admin, TokenPair), AppError> {
    let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = LOWER($1)")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INCORRECT_CREDENTIALS.to_string()))?;

    if !verify_password(password, &admin.password_hash)? {
        tracing::info!(admin_id = %admin.id, "Failed login attempt");
        return Err(AppError::Unauthorized(INCORRECT_CREDENTIALS.to_string()));
    }

    if !admin.is_active {
        return Err(AppError::Forbidden(
            "This account has been deactivated".to_string(),
        ));
    }

    let tokens = generate_tokens(&admin, settings)?;
    tracing::info!(admin_id = %admin.id, "Admin logged in");
    Ok((admin, tokens))
}

/// Exchange a valid refresh token for a fresh pair.
pub async fn refresh_token(
    pool: &PgPool,
    refresh_token_str: &str,
    settings: TokenSettings<'_>,
) -> Result<TokenPair, AppError> {
    let claims = validate_token(refresh_token_str, settings.secret)?;

    if claims.token_type != "refresh" {
        return Err(AppError::Unauthorized(
            "Invalid token. Please log in again!".to_string(),
        ));
    }

    let admin_id: Uuid = claims
        .admin_id
        .parse()
        .map_err(|_| AppError::not_logged_in())?;

    let admin =
        sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1 AND is_active = true")
            .bind(admin_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized(
                    "The user belonging to this token no longer exists.".to_string(),
                )
            })?;

    generate_tokens(&admin, settings)
}

/// Change the password of `admin_id` after checking the current one.
pub async fn update_password(
    pool: &PgPool,
    admin_id: Uuid,
    current_password: &str,
    new_password: &str,
) -> Result<Admin, AppError> {
    let admin = find_admin_by_id(pool, admin_id).await?;

    if !verify_password(current_password, &admin.password_hash)? {
        return Err(AppError::Unauthorized(
            "Your current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(new_password)?;
    let updated = sqlx::query_as::<_, Admin>(
        "UPDATE admins SET password_hash = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(&password_hash)
    .bind(admin_id)
    .fetch_one(pool)
    .await?;

    tracing::info!(admin_id = %admin_id, "Admin password updated");
    Ok(updated)
}

/// Find an admin by ID.
pub async fn find_admin_by_id(pool: &PgPool, id: Uuid) -> Result<Admin, AppError> {
    sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))
}
