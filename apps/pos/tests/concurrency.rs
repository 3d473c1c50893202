//! Concurrent registers settling against one shop.

use std::sync::Arc;

use barista_core::{CoreError, Money, NewProduct, PaymentDetails, PaymentMethod};
use barista_db::{Database, DbConfig};
use barista_pos::error::ShopError;
use barista_pos::state::{CartState, Shop};
use rust_decimal_macros::dec;

fn payment(cashier: usize) -> PaymentDetails {
    PaymentDetails {
        discount: Money::zero(),
        tax: Money::zero(),
        payment_method: PaymentMethod::Cash,
        cashier_name: format!("Register {cashier}"),
        customer_name: None,
        notes: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_never_oversell() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let shop = Arc::new(Shop::open(Arc::new(db), 3).await.unwrap());

    // 10 units on the shelf, 16 registers each selling 1.
    let special = shop
        .create_product(NewProduct {
            name: "Single Origin Pour Over".to_string(),
            price: Money::from_cents(600),
            cost_price: Money::from_cents(250),
            stock: 10,
            category: "Coffee".to_string(),
            image: None,
            ingredients: vec![barista_core::Ingredient::new("1", dec!(20))],
        })
        .await
        .unwrap();

    let mut handles = Vec::new();
    for register in 0..16 {
        let shop = shop.clone();
        let product = special.clone();
        handles.push(tokio::spawn(async move {
            let session = CartState::new();
            session.with_cart_mut(|c| c.add_item(&product, 1)).unwrap();
            shop.checkout(&session, payment(register)).await
        }));
    }

    let mut sold = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => sold += 1,
            Err(ShopError::Core(_)) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(sold, 10);
    assert_eq!(rejected, 6);

    let inv = shop.snapshot().await;
    assert_eq!(inv.catalog().get(&special.id).unwrap().stock, 0);
    assert_eq!(inv.materials().get("1").unwrap().stock, dec!(4800));
    assert_eq!(inv.transactions().len(), 2 + 10);
    assert!(!shop.is_dirty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_see_whole_sales_only() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let shop = Arc::new(Shop::open(Arc::new(db), 3).await.unwrap());
    let espresso = shop.snapshot().await.catalog().get("1").cloned().unwrap();

    let writer = {
        let shop = shop.clone();
        tokio::spawn(async move {
            for register in 0..20 {
                let session = CartState::new();
                session.with_cart_mut(|c| c.add_item(&espresso, 2)).unwrap();
                shop.checkout(&session, payment(register)).await.unwrap();
            }
        })
    };

    // Product and material stock always move together.
    for _ in 0..200 {
        let inv = shop.snapshot().await;
        let sold = 100 - inv.catalog().get("1").unwrap().stock;
        let beans = inv.materials().get("1").unwrap().stock;
        assert_eq!(beans, dec!(5000) - dec!(18) * rust_decimal::Decimal::from(sold));
        tokio::task::yield_now().await;
    }

    writer.await.unwrap();
    assert_eq!(shop.snapshot().await.catalog().get("1").unwrap().stock, 60);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_cart_settles_once() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let shop = Arc::new(Shop::open(Arc::new(db), 3).await.unwrap());
    let espresso = shop.snapshot().await.catalog().get("1").cloned().unwrap();

    let session = CartState::new();
    session.with_cart_mut(|c| c.add_item(&espresso, 2)).unwrap();

    // The same cart submitted twice at once, as from a double tap.
    let (first, second) = tokio::join!(
        shop.checkout(&session, payment(1)),
        shop.checkout(&session, payment(2))
    );

    let (settled, refused) = match (first, second) {
        (Ok(tx), Err(err)) | (Err(err), Ok(tx)) => (tx, err),
        other => panic!("expected exactly one sale, got {other:?}"),
    };
    assert_eq!(settled.items[0].quantity, 2);
    assert!(matches!(refused, ShopError::Core(CoreError::EmptyCart)));

    let inv = shop.snapshot().await;
    assert_eq!(inv.transactions().len(), 2 + 1);
    assert_eq!(inv.catalog().get("1").unwrap().stock, 98);
    assert_eq!(inv.materials().get("1").unwrap().stock, dec!(4964));
    assert!(session.with_cart(|c| c.is_empty()));
}
