//! Seed script for development: creates the super-admin and a sample catalog.
//!
//! Usage: `cargo run --bin seed`
//!
//! Reads `DATABASE_URL`, `ADMIN_EMAIL` and `ADMIN_PASSWORD` (from .env when present).

use anyhow::Context;
use backoffice::models::admin::{AdminRole, CreateAdmin};
use backoffice::services::auth;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const DEFAULT_ADMIN_EMAIL: &str = "admin@backoffice.local";
const DEFAULT_ADMIN_PASSWORD: &str = "ChangeMe123!";

/// (name, categories, gender, price, stock)
const SAMPLE_PRODUCTS: &[(&str, &[&str], &str, f64, i32)] = &[
    ("Lace evening gown", &["Lace", "Dresses"], "Female", 180.0, 4),
    ("Ankara wrap skirt", &["Ankara"], "Female", 45.0, 25),
    ("Agbada set", &["Traditional"], "Male", 220.0, 0),
    ("Aso Oke cap", &["Accessories"], "Male", 30.0, 60),
    ("Kente scarf", &["Accessories", "Kente"], "Unisex", 25.0, 8),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = backoffice::db::create_pool(&db_url, 5).await?;

    backoffice::db::run_migrations(&pool).await?;

    println!("=== Back-office Seed Script ===");

    seed_admin(&pool).await?;
    let product_ids = seed_products(&pool).await?;
    seed_orders(&pool, &product_ids).await?;

    println!("\n=== Seed complete! ===");
    Ok(())
}

async fn seed_admin(pool: &PgPool) -> anyhow::Result<()> {
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());
    let password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM admins WHERE email = LOWER($1))")
            .bind(&email)
            .fetch_one(pool)
            .await?;

    if exists {
        let hash = auth::hash_password(&password)?;
        sqlx::query("UPDATE admins SET password_hash = $1, updated_at = NOW() WHERE email = LOWER($2)")
            .bind(&hash)
            .bind(&email)
            .execute(pool)
            .await?;
        println!("[done] Updated password of {email}");
        return Ok(());
    }

    let input = CreateAdmin {
        name: "Super Admin".to_string(),
        email: email.clone(),
        password,
        role: AdminRole::SuperAdmin,
    };
    input.validate().context("Invalid ADMIN_EMAIL or ADMIN_PASSWORD")?;
    auth::create_admin(pool, &input).await?;

    println!("[done] Created super-admin {email}");
    Ok(())
}

async fn seed_products(pool: &PgPool) -> anyhow::Result<Vec<Uuid>> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Products already present ({count})");
        return Ok(sqlx::query_scalar("SELECT id FROM products ORDER BY created_at LIMIT 2")
            .fetch_all(pool)
            .await?);
    }

    let mut ids = Vec::with_capacity(SAMPLE_PRODUCTS.len());
    for (name, categories, gender, price, stock) in SAMPLE_PRODUCTS {
        let categories: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, categories, gender, price, stock, is_new)
            VALUES ($1, $2, $3::product_gender, $4, $5, TRUE)
            RETURNING id
            "#,
        )
        .bind(*name)
        .bind(&categories)
        .bind(*gender)
        .bind(*price)
        .bind(*stock)
        .fetch_one(pool)
        .await?;
        ids.push(id);
    }

    println!("[done] Created {} products", ids.len());
    Ok(ids)
}

async fn seed_orders(pool: &PgPool, product_ids: &[Uuid]) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;
    if count > 0 || product_ids.len() < 2 {
        println!("[skip] Orders already present or catalog too small");
        return Ok(());
    }

    let customer_id: Uuid = sqlx::query_scalar(
        "INSERT INTO customers (fullname, email) VALUES ('Ada Obi', 'ada@example.com') RETURNING id",
    )
    .fetch_one(pool)
    .await?;

    let address = json!({
        "firstName": "Ada", "lastName": "Obi", "address": "12 Marina Road",
        "city": "Lagos", "state": "Lagos", "zipCode": "101001",
        "country": "Nigeria", "phone": "+2348000000000"
    });

    let mut tx = pool.begin().await?;
    let order_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO orders (customer_id, email, total, status, payment_method, payment_status, shipping_address)
        VALUES ($1, 'ada@example.com', 270.0, 'Delivered', 'card', 'paid', $2)
        RETURNING id
        "#,
    )
    .bind(customer_id)
    .bind(&address)
    .fetch_one(&mut *tx)
    .await?;

    for (product_id, quantity, price) in [(product_ids[0], 1, 180.0), (product_ids[1], 2, 45.0)] {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(price)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    println!("[done] Created sample customer and order");
    Ok(())
}
