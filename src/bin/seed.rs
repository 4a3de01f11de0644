use cho_cuu_nong::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let seller_id = ensure_user(&pool, "nongdan@example.com", "seller123", "Nông trại Đà Lạt", "seller").await?;
    let buyer_id = ensure_user(&pool, "khachhang@example.com", "buyer123", "Nguyễn Văn An", "buyer").await?;
    seed_categories(&pool).await?;
    seed_products(&pool, seller_id).await?;

    println!("Seed completed. Seller ID: {seller_id}, Buyer ID: {buyer_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    full_name: &str,
    user_type: &str,
) -> anyhow::Result<Uuid> {
    // Re-seeding resets the demo password.
    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(hash_password(password)?)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO profiles (id, full_name, user_type, address, phone)
        VALUES ($1, $2, $3, 'Đà Lạt, Lâm Đồng', '0901234567')
        ON CONFLICT (id) DO UPDATE SET full_name = EXCLUDED.full_name, user_type = EXCLUDED.user_type
        "#,
    )
    .bind(user_id)
    .bind(full_name)
    .bind(user_type)
    .execute(pool)
    .await?;

    println!("Ensured user {email} (user_type={user_type})");
    Ok(user_id)
}

async fn seed_categories(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = [
        ("Rau củ", "vegetables", "🥬"),
        ("Trái cây", "fruits", "🍊"),
        ("Thảo mộc", "herbs", "🌿"),
        ("Ngũ cốc", "grains", "🌾"),
        ("Hải sản", "seafood", "🦐"),
        ("Đặc sản", "specialties", "🍯"),
    ];

    for (name, category_type, icon) in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, category_type, icon)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(category_type)
        .bind(icon)
        .execute(pool)
        .await?;
    }

    println!("Seeded categories");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool, seller_id: Uuid) -> anyhow::Result<()> {
    let products = [
        ("Bắp cải Đà Lạt", "Rau củ", 15_000_i64, "kg", 120, "1-2 ngày"),
        ("Cà chua bi", "Rau củ", 35_000, "kg", 80, "1-2 ngày"),
        ("Cam sành Vĩnh Long", "Trái cây", 25_000, "kg", 200, "2-3 ngày"),
        ("Sầu riêng Ri6", "Trái cây", 85_000, "kg", 40, "3-5 ngày"),
        ("Gạo ST25", "Ngũ cốc", 32_000, "kg", 500, "2-4 ngày"),
        ("Mật ong rừng U Minh", "Đặc sản", 250_000, "lít", 30, "3-5 ngày"),
    ];

    for (name, category, price, unit, quantity, delivery_time) in products {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, seller_id, category_id, name, price, unit, quantity, location, delivery_time, status)
            SELECT $1, $2, c.id, $3, $4, $5, $6, 'Lâm Đồng', $7, 'approved'
            FROM categories c
            WHERE c.name = $8
              AND NOT EXISTS (SELECT 1 FROM products p WHERE p.seller_id = $2 AND p.name = $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(seller_id)
        .bind(name)
        .bind(price)
        .bind(unit)
        .bind(quantity)
        .bind(delivery_time)
        .bind(category)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
