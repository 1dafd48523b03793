//! Database-backed tests for the purchase workflow. They need a running
//! Postgres pointed to by DATABASE_URL and are ignored by default:
//!
//!     DATABASE_URL=postgres://... cargo test -- --ignored

use std::sync::Arc;

use campus_hub_service::{
    db::{self, conversations, listings, market_store::PgMarketStore, orders, students},
    error::AppError,
    models::PaymentMethod,
    services::purchase::PurchaseService,
};
use sqlx::PgPool;
use uuid::Uuid;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for db tests");
    let pool = db::init_pool(&url).await.expect("connect");
    db::MIGRATOR.run(&pool).await.expect("migrate");
    pool
}

async fn insert_student(pool: &PgPool, name: &str) -> Uuid {
    let email = format!("{}-{}@test.campus.edu", name, Uuid::new_v4());
    let student = students::insert(
        pool,
        students::NewStudent {
            full_name: name,
            email: &email,
            password_hash: "x",
            student_type: "international",
            program: "CS",
            avatar_url: None,
        },
    )
    .await
    .expect("insert student");
    student.id
}

async fn insert_listing(pool: &PgPool, owner: Uuid) -> Uuid {
    let listing = listings::create(
        pool,
        owner,
        listings::NewListing {
            title: "Desk lamp",
            description: "Barely used",
            price_cents: 1500,
            category: "Furniture",
            condition: "Good",
            campus: "Main Campus",
            image_url: None,
        },
    )
    .await
    .expect("insert listing");
    listing.id
}

fn purchase_service(pool: &PgPool) -> PurchaseService {
    PurchaseService::new(
        Arc::new(PgMarketStore::new(pool.clone())),
        None,
        "http://localhost:3000".into(),
    )
}

#[tokio::test]
#[ignore] // Requires database
async fn in_person_purchase_commits_order_conversation_and_sold_flip() {
    let pool = test_pool().await;
    let seller = insert_student(&pool, "seller").await;
    let buyer = insert_student(&pool, "buyer").await;
    let listing_id = insert_listing(&pool, seller).await;

    let svc = purchase_service(&pool);
    let outcome = svc
        .purchase(buyer, listing_id, PaymentMethod::InPerson)
        .await
        .expect("purchase");

    let listing = listings::find_by_id(&pool, listing_id)
        .await
        .expect("find")
        .expect("exists");
    assert!(!listing.is_active);
    assert!(listing.sold_at.is_some());

    let purchases = orders::list_for_buyer(&pool, buyer).await.expect("orders");
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].id, outcome.order_id);

    let conversation = conversations::find_by_id(&pool, outcome.conversation_id)
        .await
        .expect("find conversation")
        .expect("conversation exists");
    assert!(conversation.includes(buyer));
    assert!(conversation.includes(seller));

    let messages = conversations::list_messages(&pool, conversation.id)
        .await
        .expect("messages");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender_id, buyer);
}

#[tokio::test]
#[ignore] // Requires database
async fn second_purchase_of_same_listing_loses_cleanly() {
    let pool = test_pool().await;
    let seller = insert_student(&pool, "seller").await;
    let buyer_a = insert_student(&pool, "buyer-a").await;
    let buyer_b = insert_student(&pool, "buyer-b").await;
    let listing_id = insert_listing(&pool, seller).await;

    let svc = purchase_service(&pool);
    svc.purchase(buyer_a, listing_id, PaymentMethod::InPerson)
        .await
        .expect("first purchase wins");

    let err = svc
        .purchase(buyer_b, listing_id, PaymentMethod::InPerson)
        .await
        .expect_err("second purchase must fail");
    assert!(matches!(
        err,
        AppError::AlreadySold | AppError::NotAvailable
    ));

    // Exactly one order for the listing, and the loser left no conversation.
    let sales = orders::list_for_seller(&pool, seller).await.expect("sales");
    assert_eq!(
        sales
            .iter()
            .filter(|s| s.listing_id == listing_id)
            .count(),
        1
    );
    let convs_b = conversations::list_for_student(&pool, buyer_b)
        .await
        .expect("conversations");
    assert!(convs_b.is_empty());
}

#[tokio::test]
#[ignore] // Requires database
async fn concurrent_purchases_have_one_winner() {
    let pool = test_pool().await;
    let seller = insert_student(&pool, "seller").await;
    let buyer_a = insert_student(&pool, "buyer-a").await;
    let buyer_b = insert_student(&pool, "buyer-b").await;
    let listing_id = insert_listing(&pool, seller).await;

    let svc = Arc::new(purchase_service(&pool));
    let (a, b) = tokio::join!(
        svc.purchase(buyer_a, listing_id, PaymentMethod::InPerson),
        svc.purchase(buyer_b, listing_id, PaymentMethod::InPerson),
    );

    let wins = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one winner");

    let sales = orders::list_for_seller(&pool, seller).await.expect("sales");
    assert_eq!(
        sales
            .iter()
            .filter(|s| s.listing_id == listing_id)
            .count(),
        1
    );
}
