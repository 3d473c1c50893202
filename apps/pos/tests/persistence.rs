//! Save failures after a change has been applied.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use barista_core::{Money, Operator, PaymentMethod, Role};
use barista_db::{CollectionName, CollectionStore, Database, DbConfig, DbError, DbResult};
use barista_pos::commands::sale::CheckoutRequest;
use barista_pos::commands::{cart, sale, storage};
use barista_pos::error::{ErrorCode, ShopError};
use barista_pos::state::{CartState, Shop};
use rust_decimal_macros::dec;

/// Delegates to a real database, failing saves while `failing` is set.
struct FlakyStore {
    db: Database,
    failing: AtomicBool,
    save_calls: AtomicU32,
}

impl FlakyStore {
    async fn new() -> Arc<Self> {
        Arc::new(FlakyStore {
            db: Database::new(DbConfig::in_memory()).await.unwrap(),
            failing: AtomicBool::new(false),
            save_calls: AtomicU32::new(0),
        })
    }

    fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    fn saves(&self) -> u32 {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CollectionStore for FlakyStore {
    async fn load(&self, name: CollectionName) -> DbResult<Option<String>> {
        self.db.load(name).await
    }

    async fn save(&self, batch: &[(CollectionName, String)]) -> DbResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DbError::Busy("database is locked".to_string()));
        }
        self.db.save(batch).await
    }
}

async fn shop(store: &Arc<FlakyStore>) -> Shop {
    Shop::open(store.clone(), 3)
        .await
        .unwrap()
        .with_retry_delay(Duration::ZERO)
}

fn operator() -> Operator {
    Operator {
        display_name: "Jane Smith".to_string(),
        role: Role::Admin,
    }
}

fn request() -> CheckoutRequest {
    CheckoutRequest {
        discount: Money::zero(),
        tax: Money::from_cents(50),
        payment_method: PaymentMethod::Card,
        customer_name: None,
        notes: None,
    }
}

#[tokio::test]
async fn unsaved_sale_is_reported_with_its_transaction() {
    let store = FlakyStore::new().await;
    let shop = shop(&store).await;
    let session = CartState::new();
    cart::add_to_cart(&shop, &session, "1", Some(2)).await.unwrap();

    store.fail(true);
    let saves_before = store.saves();
    let err = shop
        .checkout(
            &session,
            barista_core::PaymentDetails::for_operator(&operator(), PaymentMethod::Cash),
        )
        .await
        .unwrap_err();

    assert!(err.mutated());
    let tx = err.committed_transaction().cloned().unwrap();
    assert_eq!(tx.subtotal, Money::from_cents(700));
    assert!(matches!(err, ShopError::Unsaved { attempts: 3, .. }));
    assert_eq!(store.saves() - saves_before, 3);

    // Applied in memory and the cart is gone.
    assert!(session.with_cart(|c| c.is_empty()));
    let inv = shop.snapshot().await;
    assert_eq!(inv.catalog().get("1").unwrap().stock, 98);
    assert_eq!(inv.transactions().get(&tx.id), Some(&tx));
    assert_eq!(
        shop.pending().await,
        vec![
            CollectionName::Products,
            CollectionName::RawMaterials,
            CollectionName::Transactions
        ]
    );

    // Nothing reached the database yet.
    let stored = store.db.load(CollectionName::Transactions).await.unwrap().unwrap();
    assert!(!stored.contains(&tx.id));

    store.fail(false);
    assert_eq!(shop.flush().await.unwrap(), 3);
    assert!(!shop.is_dirty().await);

    let reopened = Shop::open(store.clone(), 3).await.unwrap();
    let inv = reopened.snapshot().await;
    assert_eq!(inv.transactions().get(&tx.id), Some(&tx));
    assert_eq!(inv.materials().get("1").unwrap().stock, dec!(4964));
}

#[tokio::test]
async fn unsaved_sale_maps_to_reconciliation_required() {
    let store = FlakyStore::new().await;
    let shop = shop(&store).await;
    let session = CartState::new();
    cart::add_to_cart(&shop, &session, "2", None).await.unwrap();

    store.fail(true);
    let err = sale::checkout(&shop, &session, &operator(), request())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ReconciliationRequired);
    assert!(cart::get_cart(&session).items.is_empty());

    let status = storage::storage_status(&shop).await;
    assert!(!status.saved);
    assert_eq!(status.pending, vec!["products", "rawMaterials", "transactions"]);

    // Still failing: flush reports storage trouble and keeps everything pending.
    let err = storage::flush_changes(&shop).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);
    assert!(shop.is_dirty().await);

    store.fail(false);
    let status = storage::flush_changes(&shop).await.unwrap();
    assert!(status.saved);
    assert!(status.pending.is_empty());
}

#[tokio::test]
async fn next_successful_change_carries_earlier_dirty_collections() {
    let store = FlakyStore::new().await;
    let shop = shop(&store).await;
    let session = CartState::new();
    cart::add_to_cart(&shop, &session, "4", Some(3)).await.unwrap();

    store.fail(true);
    let tx = shop
        .checkout(
            &session,
            barista_core::PaymentDetails::for_operator(&operator(), PaymentMethod::Other),
        )
        .await
        .unwrap_err()
        .committed_transaction()
        .cloned()
        .unwrap();

    // A product-only change saves the sale's collections along with it.
    store.fail(false);
    shop.restock_product("3", 5).await.unwrap();
    assert!(!shop.is_dirty().await);

    let reopened = Shop::open(store.clone(), 3).await.unwrap();
    let inv = reopened.snapshot().await;
    assert_eq!(inv.transactions().get(&tx.id), Some(&tx));
    assert_eq!(inv.catalog().get("4").unwrap().stock, 117);
    assert_eq!(inv.catalog().get("3").unwrap().stock, 80);
}

#[tokio::test]
async fn rejected_change_never_touches_storage() {
    let store = FlakyStore::new().await;
    let shop = shop(&store).await;
    let session = CartState::new();
    let saves_before = store.saves();

    let err = shop
        .checkout(
            &session,
            barista_core::PaymentDetails::for_operator(&operator(), PaymentMethod::Cash),
        )
        .await
        .unwrap_err();

    assert!(!err.mutated());
    assert_eq!(store.saves(), saves_before);
    assert!(!shop.is_dirty().await);
}

#[tokio::test]
async fn closed_store_is_not_retried() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let shop = Shop::open(Arc::new(db.clone()), 3)
        .await
        .unwrap()
        .with_retry_delay(Duration::ZERO);

    db.close().await;
    let err = shop.restock_product("1", 5).await.unwrap_err();

    assert!(matches!(
        err,
        ShopError::Unsaved {
            attempts: 1,
            source: DbError::ConnectionFailed(_),
            ..
        }
    ));
    assert_eq!(shop.snapshot().await.catalog().get("1").unwrap().stock, 105);
    assert_eq!(shop.pending().await, vec![CollectionName::Products]);
}
