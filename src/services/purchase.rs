/// Purchase orchestrator: the one transactional workflow in the service.
///
/// A purchase moves a listing from active to sold, records an immutable
/// order, and opens the buyer–seller conversation. The external checkout
/// call (card payments) must fully succeed before any local write; the
/// local writes themselves are a single atomic unit behind `MarketStore`.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Listing, OrderStatus, PaymentMethod};
use crate::services::payment_gateway::{CheckoutRequest, GatewayError, PaymentGateway};

const CARD_OPENING_MESSAGE: &str =
    "Hi, I just purchased this item via card. When can we arrange delivery/pickup?";
const IN_PERSON_OPENING_MESSAGE: &str =
    "Hi, I reserved this item for in-person payment. When and where can we meet on campus?";

/// Storage seam for the purchase path. The Postgres implementation runs
/// `commit_purchase` as one transaction; tests substitute an in-memory fake.
#[async_trait]
pub trait MarketStore: Send + Sync {
    async fn fetch_listing(&self, id: Uuid) -> Result<Option<Listing>>;

    /// Atomic unit: insert the order, flip the listing to sold (conditional
    /// on it still being active), and create the seeded conversation.
    /// Either all three become visible or none do. A lost race surfaces as
    /// `AppError::AlreadySold`.
    async fn commit_purchase(&self, commit: PurchaseCommit) -> Result<PurchaseRecord>;
}

#[derive(Debug, Clone)]
pub struct PurchaseCommit {
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub gateway_session_id: Option<String>,
    pub opening_message: String,
    pub sold_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PurchaseRecord {
    pub order_id: Uuid,
    pub conversation_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub order_id: Uuid,
    pub conversation_id: Uuid,
    /// Hosted checkout URL; present for card purchases only.
    pub checkout_url: Option<String>,
}

pub struct PurchaseService {
    store: Arc<dyn MarketStore>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    app_url: String,
}

impl PurchaseService {
    pub fn new(
        store: Arc<dyn MarketStore>,
        gateway: Option<Arc<dyn PaymentGateway>>,
        app_url: String,
    ) -> Self {
        Self {
            store,
            gateway,
            app_url,
        }
    }

    pub async fn purchase(
        &self,
        buyer_id: Uuid,
        listing_id: Uuid,
        payment_method: PaymentMethod,
    ) -> Result<PurchaseOutcome> {
        // Validating
        let listing = match self.store.fetch_listing(listing_id).await? {
            Some(l) if l.is_active => l,
            _ => return Err(AppError::NotAvailable),
        };

        let seller_id = match listing.owner_id {
            Some(id) => id,
            None => {
                // Signals a bug upstream, not a user error.
                tracing::error!(%listing_id, "active listing has no seller of record");
                return Err(AppError::DataIntegrity(
                    "Listing has no seller of record".into(),
                ));
            }
        };

        if seller_id == buyer_id {
            return Err(AppError::SelfPurchase);
        }

        // Paying: external checkout must fully succeed before any local
        // write, so a slow or failing gateway never leaves a sold listing
        // without a checkout behind it.
        let session = match payment_method {
            PaymentMethod::Card => {
                let gateway = self.gateway.as_ref().ok_or(AppError::GatewayUnavailable)?;
                let session = gateway
                    .create_checkout_session(CheckoutRequest {
                        amount_cents: i64::from(listing.price_cents),
                        currency: "usd".into(),
                        product_name: listing.title.clone(),
                        product_description: listing.description.clone(),
                        success_url: format!(
                            "{}/marketplace/success?session_id={{CHECKOUT_SESSION_ID}}",
                            self.app_url
                        ),
                        cancel_url: format!("{}/marketplace/{}", self.app_url, listing.id),
                        listing_id,
                        buyer_id,
                    })
                    .await?;
                Some(session)
            }
            PaymentMethod::InPerson => None,
        };

        // Session creation counts as proof of intent to pay; capture
        // confirmation is a reconciliation concern outside this flow.
        let status = match payment_method {
            PaymentMethod::Card => OrderStatus::Paid,
            PaymentMethod::InPerson => OrderStatus::Created,
        };
        let opening_message = match payment_method {
            PaymentMethod::Card => CARD_OPENING_MESSAGE,
            PaymentMethod::InPerson => IN_PERSON_OPENING_MESSAGE,
        };

        // Recording + Finalizing + Conversation, all-or-nothing.
        let record = self
            .store
            .commit_purchase(PurchaseCommit {
                listing_id,
                buyer_id,
                seller_id,
                payment_method,
                status,
                gateway_session_id: session.as_ref().map(|s| s.id.clone()),
                opening_message: opening_message.to_string(),
                sold_at: Utc::now(),
            })
            .await?;

        // Done: card purchases respond with the hosted checkout URL,
        // re-retrieved from the session handle.
        let checkout_url = match session {
            Some(session) => {
                let gateway = self.gateway.as_ref().ok_or(AppError::GatewayUnavailable)?;
                let fresh = gateway.retrieve_session(&session.id).await?;
                let url = fresh.url.ok_or_else(|| {
                    GatewayError::Protocol("checkout session has no url".into())
                })?;
                Some(url)
            }
            None => None,
        };

        tracing::info!(
            order_id = %record.order_id,
            conversation_id = %record.conversation_id,
            %listing_id,
            %buyer_id,
            method = ?payment_method,
            "purchase completed"
        );

        Ok(PurchaseOutcome {
            order_id: record.order_id,
            conversation_id: record.conversation_id,
            checkout_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::payment_gateway::CheckoutSession;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct StoredOrder {
        id: Uuid,
        listing_id: Uuid,
        buyer_id: Uuid,
        payment_method: PaymentMethod,
        status: OrderStatus,
        gateway_session_id: Option<String>,
    }

    #[derive(Debug, Clone)]
    struct StoredConversation {
        id: Uuid,
        order_id: Uuid,
        buyer_id: Uuid,
        seller_id: Uuid,
        messages: Vec<(Uuid, String)>, // (sender, content)
    }

    #[derive(Default)]
    struct FakeStore {
        listings: Mutex<Vec<Listing>>,
        orders: Mutex<Vec<StoredOrder>>,
        conversations: Mutex<Vec<StoredConversation>>,
    }

    impl FakeStore {
        fn with_listing(listing: Listing) -> Arc<Self> {
            let store = Self::default();
            store.listings.lock().unwrap().push(listing);
            Arc::new(store)
        }

        fn listing(&self, id: Uuid) -> Option<Listing> {
            self.listings.lock().unwrap().iter().find(|l| l.id == id).cloned()
        }

        fn order_count(&self) -> usize {
            self.orders.lock().unwrap().len()
        }

        fn conversation_count(&self) -> usize {
            self.conversations.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MarketStore for FakeStore {
        async fn fetch_listing(&self, id: Uuid) -> Result<Option<Listing>> {
            Ok(self.listing(id))
        }

        async fn commit_purchase(&self, commit: PurchaseCommit) -> Result<PurchaseRecord> {
            // Single lock across the whole commit mirrors the transactional
            // all-or-nothing behavior of the Postgres store.
            let mut listings = self.listings.lock().unwrap();
            let listing = listings
                .iter_mut()
                .find(|l| l.id == commit.listing_id)
                .ok_or(AppError::NotAvailable)?;
            if !listing.is_active {
                return Err(AppError::AlreadySold);
            }
            listing.is_active = false;
            listing.sold_at = Some(commit.sold_at);

            let order = StoredOrder {
                id: Uuid::new_v4(),
                listing_id: commit.listing_id,
                buyer_id: commit.buyer_id,
                payment_method: commit.payment_method,
                status: commit.status,
                gateway_session_id: commit.gateway_session_id.clone(),
            };
            let conversation = StoredConversation {
                id: Uuid::new_v4(),
                order_id: order.id,
                buyer_id: commit.buyer_id,
                seller_id: commit.seller_id,
                messages: vec![(commit.buyer_id, commit.opening_message.clone())],
            };

            let record = PurchaseRecord {
                order_id: order.id,
                conversation_id: conversation.id,
            };
            self.orders.lock().unwrap().push(order);
            self.conversations.lock().unwrap().push(conversation);
            Ok(record)
        }
    }

    struct FakeGateway {
        fail_create: bool,
        create_calls: AtomicUsize,
        /// Observes listing state at session-creation time, to prove the
        /// gateway call strictly precedes the local writes.
        store: Option<Arc<FakeStore>>,
        last_request: Mutex<Option<CheckoutRequest>>,
    }

    impl FakeGateway {
        fn working() -> Arc<Self> {
            Arc::new(Self {
                fail_create: false,
                create_calls: AtomicUsize::new(0),
                store: None,
                last_request: Mutex::new(None),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                fail_create: true,
                create_calls: AtomicUsize::new(0),
                store: None,
                last_request: Mutex::new(None),
            })
        }

        fn observing(store: Arc<FakeStore>) -> Arc<Self> {
            Arc::new(Self {
                fail_create: false,
                create_calls: AtomicUsize::new(0),
                store: Some(store),
                last_request: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_checkout_session(
            &self,
            request: CheckoutRequest,
        ) -> std::result::Result<CheckoutSession, GatewayError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_create {
                return Err(GatewayError::Network("connection reset".into()));
            }
            if let Some(store) = &self.store {
                let listing = store.listing(request.listing_id).unwrap();
                assert!(
                    listing.is_active,
                    "checkout session must be created before any local write"
                );
            }
            *self.last_request.lock().unwrap() = Some(request);
            Ok(CheckoutSession {
                id: "cs_test_session".into(),
                url: None,
            })
        }

        async fn retrieve_session(
            &self,
            session_id: &str,
        ) -> std::result::Result<CheckoutSession, GatewayError> {
            Ok(CheckoutSession {
                id: session_id.to_string(),
                url: Some(format!("https://checkout.example/pay/{session_id}")),
            })
        }
    }

    fn active_listing(owner: Option<Uuid>, price_cents: i32) -> Listing {
        let now = Utc::now();
        Listing {
            id: Uuid::new_v4(),
            title: "CS Textbook Bundle".into(),
            description: "Algorithms and data structures, gently used".into(),
            price_cents,
            category: "Textbooks".into(),
            condition: "Good".into(),
            campus: "Main Campus".into(),
            image_url: None,
            owner_id: owner,
            is_active: true,
            sold_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(store: Arc<FakeStore>, gateway: Option<Arc<FakeGateway>>) -> PurchaseService {
        PurchaseService::new(
            store,
            gateway.map(|g| g as Arc<dyn PaymentGateway>),
            "http://localhost:3000".into(),
        )
    }

    #[tokio::test]
    async fn in_person_purchase_creates_order_conversation_and_sells_listing() {
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        let listing = active_listing(Some(seller), 4500);
        let listing_id = listing.id;
        let store = FakeStore::with_listing(listing);
        let svc = service(store.clone(), None);

        let outcome = svc
            .purchase(buyer, listing_id, PaymentMethod::InPerson)
            .await
            .unwrap();

        assert!(outcome.checkout_url.is_none());

        let orders = store.orders.lock().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Created);
        assert_eq!(orders[0].payment_method, PaymentMethod::InPerson);
        assert_eq!(orders[0].buyer_id, buyer);
        assert!(orders[0].gateway_session_id.is_none());

        let conversations = store.conversations.lock().unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].order_id, orders[0].id);
        assert_eq!(conversations[0].buyer_id, buyer);
        assert_eq!(conversations[0].seller_id, seller);
        assert_eq!(conversations[0].messages.len(), 1);
        let (sender, content) = &conversations[0].messages[0];
        assert_eq!(*sender, buyer);
        assert!(content.contains("meet"), "seeded message asks about meeting");

        let listing = store.listing(listing_id).unwrap();
        assert!(!listing.is_active);
        assert!(listing.sold_at.is_some());
    }

    #[tokio::test]
    async fn card_purchase_records_session_and_returns_checkout_url() {
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        let listing = active_listing(Some(seller), 4500);
        let listing_id = listing.id;
        let store = FakeStore::with_listing(listing);
        let gateway = FakeGateway::observing(store.clone());
        let svc = service(store.clone(), Some(gateway.clone()));

        let outcome = svc
            .purchase(buyer, listing_id, PaymentMethod::Card)
            .await
            .unwrap();

        assert_eq!(
            outcome.checkout_url.as_deref(),
            Some("https://checkout.example/pay/cs_test_session")
        );

        let orders = store.orders.lock().unwrap();
        assert_eq!(orders[0].status, OrderStatus::Paid);
        assert_eq!(
            orders[0].gateway_session_id.as_deref(),
            Some("cs_test_session")
        );

        // Session metadata binds listing and buyer for later reconciliation.
        let request = gateway.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.listing_id, listing_id);
        assert_eq!(request.buyer_id, buyer);
        assert_eq!(request.amount_cents, 4500);
        assert!(request.cancel_url.contains(&listing_id.to_string()));

        assert!(!store.listing(listing_id).unwrap().is_active);
    }

    #[tokio::test]
    async fn gateway_failure_leaves_no_local_state() {
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        let listing = active_listing(Some(seller), 4500);
        let listing_id = listing.id;
        let store = FakeStore::with_listing(listing);
        let svc = service(store.clone(), Some(FakeGateway::failing()));

        let err = svc
            .purchase(buyer, listing_id, PaymentMethod::Card)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Gateway(_)));

        // Retry must be possible: nothing changed.
        assert!(store.listing(listing_id).unwrap().is_active);
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.conversation_count(), 0);
    }

    #[tokio::test]
    async fn unconfigured_gateway_fails_card_purchases_distinctly() {
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        let listing = active_listing(Some(seller), 4500);
        let listing_id = listing.id;
        let store = FakeStore::with_listing(listing);
        let svc = service(store.clone(), None);

        let err = svc
            .purchase(buyer, listing_id, PaymentMethod::Card)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GatewayUnavailable));
        assert!(store.listing(listing_id).unwrap().is_active);
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn self_purchase_is_rejected_without_mutation() {
        let seller = Uuid::new_v4();
        let listing = active_listing(Some(seller), 4500);
        let listing_id = listing.id;
        let store = FakeStore::with_listing(listing);
        let gateway = FakeGateway::working();
        let svc = service(store.clone(), Some(gateway.clone()));

        for method in [PaymentMethod::Card, PaymentMethod::InPerson] {
            let err = svc.purchase(seller, listing_id, method).await.unwrap_err();
            assert!(matches!(err, AppError::SelfPurchase));
        }

        assert_eq!(gateway.create_calls.load(Ordering::SeqCst), 0);
        assert!(store.listing(listing_id).unwrap().is_active);
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.conversation_count(), 0);
    }

    #[tokio::test]
    async fn inactive_or_missing_listing_is_not_available() {
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        let mut listing = active_listing(Some(seller), 4500);
        listing.is_active = false;
        listing.sold_at = Some(Utc::now());
        let listing_id = listing.id;
        let store = FakeStore::with_listing(listing);
        let svc = service(store.clone(), None);

        let err = svc
            .purchase(buyer, listing_id, PaymentMethod::InPerson)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAvailable));

        let err = svc
            .purchase(buyer, Uuid::new_v4(), PaymentMethod::InPerson)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAvailable));
    }

    #[tokio::test]
    async fn ownerless_listing_is_a_data_integrity_error() {
        let buyer = Uuid::new_v4();
        let listing = active_listing(None, 4500);
        let listing_id = listing.id;
        let store = FakeStore::with_listing(listing);
        let svc = service(store.clone(), None);

        let err = svc
            .purchase(buyer, listing_id, PaymentMethod::InPerson)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(_)));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn concurrent_purchases_have_exactly_one_winner() {
        let seller = Uuid::new_v4();
        let buyer_a = Uuid::new_v4();
        let buyer_b = Uuid::new_v4();
        let listing = active_listing(Some(seller), 4500);
        let listing_id = listing.id;
        let store = FakeStore::with_listing(listing);
        let svc = Arc::new(service(store.clone(), None));

        let (a, b) = tokio::join!(
            svc.purchase(buyer_a, listing_id, PaymentMethod::InPerson),
            svc.purchase(buyer_b, listing_id, PaymentMethod::InPerson),
        );

        let results = [a, b];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "exactly one purchase succeeds");
        for r in &results {
            if let Err(e) = r {
                assert!(matches!(e, AppError::AlreadySold | AppError::NotAvailable));
            }
        }

        assert_eq!(store.order_count(), 1, "no double-sale");
        assert_eq!(store.conversation_count(), 1);
        let listing = store.listing(listing_id).unwrap();
        assert!(!listing.is_active);
        assert!(listing.sold_at.is_some());
    }
}
