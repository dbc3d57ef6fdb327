//! Deterministic seed graph for harness suites.
//!
//! Every seeded primary key starts with `test-`, and suites generate new ids
//! with the same prefix, so [`cleanup_test_data`] restores an empty store
//! between cases.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, Duration, Utc};
use diesel::sql_types::Text;
use diesel_async::{RunQueryDsl, SimpleAsyncConnection};
use mockable::{Clock, DefaultClock};
use tracing::debug;

use crate::domain::password::hash_password;
use crate::domain::ports::{
    CartRepository, NotificationRepository, NotificationSettingsRepository, PersistenceError,
    ProductRepository, ReviewRepository, UserRepository,
};
use crate::domain::{
    CartItem, Notification, NotificationSettings, NotificationStatus, NotificationType, Product,
    ProductStatus, Review, Role, User, UserStatus,
};
use crate::outbound::persistence::{
    DieselCartRepository, DieselNotificationRepository, DieselNotificationSettingsRepository,
    DieselProductRepository, DieselReviewRepository, DieselUserRepository, Store,
};

/// Plaintext that unlocks every seeded account.
pub const FIXTURE_PASSWORD: &str = "password123";

/// Default caller of the harness.
pub const USER_ID: &str = "test-user-123";
/// Administrator mapped from the admin token.
pub const ADMIN_ID: &str = "test-admin-123";
/// Seller owning the foreign products.
pub const SELLER_ID: &str = "test-user-456";
/// Account awaiting verification, without a settings row.
pub const PENDING_USER_ID: &str = "test-user-789";

/// Tables in referential order. Cleanup walks them backwards.
pub const TABLES: [&str; 9] = [
    "users",
    "auth_tokens",
    "products",
    "cart_items",
    "orders",
    "order_items",
    "reviews",
    "notifications",
    "notification_settings",
];

const ORDER_SEED: &str = "
INSERT INTO orders (id, buyer_id, seller_id, total_amount, status, payment_method, payment_status, delivery_county, delivery_town, delivery_phone)
VALUES
    ('test-order-pending', 'test-user-123', 'test-user-456', 2400.0, 'pending', 'mpesa', 'pending', 'Nairobi', 'Westlands', '+254700000123'),
    ('test-order-completed', 'test-user-123', 'test-user-456', 1200.0, 'completed', 'mpesa', 'paid', 'Nairobi', 'Westlands', '+254700000123');
INSERT INTO order_items (id, order_id, product_id, name, quantity, price)
VALUES
    ('test-order-item-1', 'test-order-pending', 'test-product-456', 'Kitenge Shirt', 2, 1200.0),
    ('test-order-item-2', 'test-order-completed', 'test-product-456', 'Kitenge Shirt', 1, 1200.0);
";

static PASSWORD_HASH: OnceLock<String> = OnceLock::new();

/// Errors raised while seeding or wiping fixtures.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// A repository call or raw statement failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The fixture password could not be hashed.
    #[error("fixture password hashing failed: {0}")]
    Hash(String),
}

impl From<diesel::result::Error> for FixtureError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Persistence(PersistenceError::query(err.to_string()))
    }
}

fn fixture_password_hash() -> Result<&'static str, FixtureError> {
    if let Some(hash) = PASSWORD_HASH.get() {
        return Ok(hash.as_str());
    }
    let hash =
        hash_password(FIXTURE_PASSWORD).map_err(|err| FixtureError::Hash(err.to_string()))?;
    Ok(PASSWORD_HASH.get_or_init(|| hash).as_str())
}

struct Account<'a> {
    id: &'a str,
    first_name: &'a str,
    phone: &'a str,
    role: Role,
    status: UserStatus,
    county: Option<&'a str>,
}

fn user(account: &Account<'_>, hash: &str, now: DateTime<Utc>) -> User {
    let active = account.status == UserStatus::Active;
    User {
        id: account.id.to_owned(),
        email: format!("{}@vaultke.test", account.id),
        phone: account.phone.to_owned(),
        password_hash: hash.to_owned(),
        first_name: account.first_name.to_owned(),
        last_name: "Test".to_owned(),
        role: account.role,
        status: account.status,
        county: account.county.map(str::to_owned),
        town: None,
        bio: None,
        rating: 0.0,
        is_email_verified: active,
        is_phone_verified: active,
        created_at: now,
        updated_at: now,
    }
}

fn users(hash: &str, now: DateTime<Utc>) -> Vec<User> {
    [
        Account {
            id: USER_ID,
            first_name: "Wanjiku",
            phone: "+254700000123",
            role: Role::User,
            status: UserStatus::Active,
            county: Some("Nairobi"),
        },
        Account {
            id: ADMIN_ID,
            first_name: "Admin",
            phone: "+254700000001",
            role: Role::Admin,
            status: UserStatus::Active,
            county: Some("Nairobi"),
        },
        Account {
            id: SELLER_ID,
            first_name: "Otieno",
            phone: "+254700000456",
            role: Role::User,
            status: UserStatus::Active,
            county: Some("Kisumu"),
        },
        Account {
            id: PENDING_USER_ID,
            first_name: "Chebet",
            phone: "+254700000789",
            role: Role::User,
            status: UserStatus::Pending,
            county: None,
        },
    ]
    .iter()
    .map(|account| user(account, hash, now))
    .collect()
}

struct Listing<'a> {
    id: &'a str,
    seller_id: &'a str,
    name: &'a str,
    category: &'a str,
    price: f64,
    stock: i32,
    status: ProductStatus,
}

fn products(now: DateTime<Utc>) -> Vec<Product> {
    [
        Listing {
            id: "test-product-123",
            seller_id: USER_ID,
            name: "Smartphone",
            category: "electronics",
            price: 15_000.0,
            stock: 10,
            status: ProductStatus::Active,
        },
        Listing {
            id: "test-product-789",
            seller_id: USER_ID,
            name: "Solar Lamp",
            category: "electronics",
            price: 2_500.0,
            stock: 20,
            status: ProductStatus::Active,
        },
        Listing {
            id: "test-product-456",
            seller_id: SELLER_ID,
            name: "Kitenge Shirt",
            category: "clothing",
            price: 1_200.0,
            stock: 5,
            status: ProductStatus::Active,
        },
        Listing {
            id: "test-product-out-of-stock",
            seller_id: SELLER_ID,
            name: "Radio",
            category: "electronics",
            price: 3_000.0,
            stock: 0,
            status: ProductStatus::Active,
        },
        Listing {
            id: "test-product-inactive",
            seller_id: USER_ID,
            name: "Maasai Shuka",
            category: "clothing",
            price: 800.0,
            stock: 8,
            status: ProductStatus::Inactive,
        },
    ]
    .into_iter()
    .enumerate()
    .map(|(rank, listing)| {
        // Distinct creation times keep newest-first listings stable.
        let created_at = now - Duration::minutes(i64::try_from(rank).unwrap_or_default());
        Product {
            id: listing.id.to_owned(),
            seller_id: listing.seller_id.to_owned(),
            name: listing.name.to_owned(),
            description: format!("{} sold on the VaultKe marketplace", listing.name),
            category: listing.category.to_owned(),
            price: listing.price,
            stock: listing.stock,
            images: Vec::new(),
            status: listing.status,
            county: Some("Nairobi".to_owned()),
            town: None,
            rating: 0.0,
            review_count: 0,
            created_at,
            updated_at: created_at,
        }
    })
    .collect()
}

fn reviews(now: DateTime<Utc>) -> [Review; 2] {
    [
        Review {
            id: "test-review-1".to_owned(),
            user_id: USER_ID.to_owned(),
            product_id: "test-product-456".to_owned(),
            rating: 5,
            comment: "Great fabric, fast delivery".to_owned(),
            created_at: now,
        },
        Review {
            id: "test-review-2".to_owned(),
            user_id: SELLER_ID.to_owned(),
            product_id: "test-product-123".to_owned(),
            rating: 4,
            comment: "Works well".to_owned(),
            created_at: now,
        },
    ]
}

struct Message<'a> {
    id: &'a str,
    user_id: &'a str,
    title: &'a str,
    kind: NotificationType,
    is_read: bool,
    scheduled_in: Option<Duration>,
}

fn notifications(now: DateTime<Utc>) -> Vec<Notification> {
    [
        Message {
            id: "test-notification-1",
            user_id: USER_ID,
            title: "Welcome to VaultKe",
            kind: NotificationType::System,
            is_read: false,
            scheduled_in: None,
        },
        Message {
            id: "test-notification-2",
            user_id: USER_ID,
            title: "Payment received",
            kind: NotificationType::Payment,
            is_read: true,
            scheduled_in: None,
        },
        Message {
            id: "test-notification-3",
            user_id: USER_ID,
            title: "Chama meeting tomorrow",
            kind: NotificationType::Meeting,
            is_read: false,
            scheduled_in: Some(Duration::hours(24)),
        },
        Message {
            id: "test-notification-4",
            user_id: USER_ID,
            title: "Contribution recorded",
            kind: NotificationType::Chama,
            is_read: true,
            scheduled_in: None,
        },
        Message {
            id: "test-notification-5",
            user_id: SELLER_ID,
            title: "New order",
            kind: NotificationType::System,
            is_read: false,
            scheduled_in: None,
        },
    ]
    .into_iter()
    .enumerate()
    .map(|(rank, message)| {
        let created_at = now - Duration::minutes(i64::try_from(rank).unwrap_or_default());
        Notification {
            id: message.id.to_owned(),
            user_id: message.user_id.to_owned(),
            sender_id: None,
            title: message.title.to_owned(),
            message: format!("{} (fixture)", message.title),
            notification_type: message.kind,
            status: if message.scheduled_in.is_some() {
                NotificationStatus::Scheduled
            } else {
                NotificationStatus::Sent
            },
            priority: 3,
            is_read: message.is_read,
            read_at: message.is_read.then_some(created_at),
            scheduled_at: message.scheduled_in.map(|delay| now + delay),
            expires_at: None,
            created_at,
            updated_at: created_at,
        }
    })
    .collect()
}

/// Seed the fixture graph using the wall clock.
///
/// # Errors
/// Returns [`FixtureError`] when any insert fails.
pub async fn insert_test_data(store: &Store) -> Result<(), FixtureError> {
    insert_test_data_at(store, DefaultClock.utc()).await
}

/// Seed the fixture graph with timestamps relative to `now`.
///
/// # Errors
/// Returns [`FixtureError`] when any insert fails.
pub async fn insert_test_data_at(store: &Store, now: DateTime<Utc>) -> Result<(), FixtureError> {
    let hash = fixture_password_hash()?;
    let user_repo = DieselUserRepository::new(store.clone());
    for seeded in users(hash, now) {
        user_repo.insert(&seeded).await?;
    }

    let product_repo = DieselProductRepository::new(store.clone());
    for listing in products(now) {
        product_repo.insert(&listing).await?;
    }

    DieselCartRepository::new(store.clone())
        .insert(&CartItem {
            id: "test-cart-item-1".to_owned(),
            user_id: USER_ID.to_owned(),
            product_id: "test-product-456".to_owned(),
            quantity: 2,
            created_at: now,
            updated_at: now,
        })
        .await?;

    store.get().await?.batch_execute(ORDER_SEED).await?;

    let review_repo = DieselReviewRepository::new(store.clone());
    for review in reviews(now) {
        review_repo.insert_and_rerate(&review).await?;
    }

    DieselNotificationRepository::new(store.clone())
        .insert_many(&notifications(now))
        .await?;

    let settings = DieselNotificationSettingsRepository::new(store.clone());
    for (id, user_id) in [
        ("test-settings-123", USER_ID),
        ("test-settings-admin", ADMIN_ID),
        ("test-settings-456", SELLER_ID),
    ] {
        settings
            .upsert(&NotificationSettings::defaults(id.to_owned(), user_id, now))
            .await?;
    }
    debug!("fixtures seeded");
    Ok(())
}

/// Delete every `test-` row, children first.
///
/// # Errors
/// Returns [`FixtureError`] when the store is closed or a delete fails.
pub async fn cleanup_test_data(store: &Store) -> Result<(), FixtureError> {
    let statements: String = TABLES
        .iter()
        .rev()
        .map(|table| format!("DELETE FROM {table} WHERE id LIKE 'test-%';\n"))
        .collect();
    store.get().await?.batch_execute(&statements).await?;
    debug!("fixtures wiped");
    Ok(())
}

#[derive(diesel::QueryableByName)]
struct IdRow {
    #[diesel(sql_type = Text)]
    id: String,
}

/// Primary keys present in each table, sorted.
///
/// # Errors
/// Returns [`FixtureError`] when the store is closed or a query fails.
pub async fn fixture_ids(store: &Store) -> Result<BTreeMap<&'static str, Vec<String>>, FixtureError> {
    let mut conn = store.get().await?;
    let mut ids = BTreeMap::new();
    for table in TABLES {
        let rows: Vec<IdRow> = diesel::sql_query(format!("SELECT id FROM {table} ORDER BY id"))
            .load(&mut *conn)
            .await?;
        ids.insert(table, rows.into_iter().map(|row| row.id).collect());
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeding_twice_after_cleanup_is_repeatable() {
        let store = Store::open_in_memory().await.expect("open store");
        insert_test_data(&store).await.expect("first seed");
        let first = fixture_ids(&store).await.expect("ids");
        cleanup_test_data(&store).await.expect("cleanup");
        assert!(
            fixture_ids(&store)
                .await
                .expect("ids")
                .values()
                .all(Vec::is_empty)
        );
        insert_test_data(&store).await.expect("second seed");
        assert_eq!(fixture_ids(&store).await.expect("ids"), first);
    }

    #[tokio::test]
    async fn seeded_reviews_rerate_their_products() {
        let store = Store::open_in_memory().await.expect("open store");
        insert_test_data(&store).await.expect("seed");
        let shirt = DieselProductRepository::new(store)
            .find_by_id("test-product-456")
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(shirt.review_count, 1);
        assert!((shirt.rating - 5.0).abs() < f64::EPSILON);
    }
}
