//! Row builders shared by the adapter tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{Product, ProductStatus, Role, User, UserStatus};

use super::{DieselProductRepository, DieselUserRepository, Store};
use crate::domain::ports::{ProductRepository, UserRepository};

pub(crate) fn instant(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0)
        .single()
        .expect("valid base timestamp")
        + Duration::minutes(minutes)
}

pub(crate) fn user(id: &str) -> User {
    User {
        id: id.to_owned(),
        email: format!("{id}@vaultke.test"),
        phone: format!("+254-{id}"),
        password_hash: "$argon2id$stub".to_owned(),
        first_name: "Amani".to_owned(),
        last_name: id.to_owned(),
        role: Role::User,
        status: UserStatus::Active,
        county: Some("Nairobi".to_owned()),
        town: None,
        bio: None,
        rating: 0.0,
        is_email_verified: false,
        is_phone_verified: false,
        created_at: instant(0),
        updated_at: instant(0),
    }
}

pub(crate) fn product(id: &str, seller_id: &str, stock: i32) -> Product {
    Product {
        id: id.to_owned(),
        seller_id: seller_id.to_owned(),
        name: format!("Item {id}"),
        description: "Handwoven kiondo basket".to_owned(),
        category: "crafts".to_owned(),
        price: 750.0,
        stock,
        images: vec!["https://cdn.vaultke.test/kiondo.jpg".to_owned()],
        status: ProductStatus::Active,
        county: Some("Machakos".to_owned()),
        town: None,
        rating: 0.0,
        review_count: 0,
        created_at: instant(0),
        updated_at: instant(0),
    }
}

/// Open a store holding the given users.
pub(crate) async fn store_with_users(ids: &[&str]) -> Store {
    let store = Store::open_in_memory().await.expect("open store");
    let users = DieselUserRepository::new(store.clone());
    for id in ids {
        users.insert(&user(id)).await.expect("insert user");
    }
    store
}

pub(crate) async fn insert_product(store: &Store, product: &Product) {
    DieselProductRepository::new(store.clone())
        .insert(product)
        .await
        .expect("insert product");
}
