//! # Default Dataset
//!
//! The records a fresh store starts with: six raw materials, four drinks
//! built from them, two deliveries and two sales.
//!
//! ```text
//!   Coffee Beans (1) ─┬─ Espresso   (1)  18 g + 40 ml water
//!   Water        (2) ─┼─ Cappuccino (2)  + 100 ml milk
//!   Milk         (3) ─┴─ Latte      (3)  + 150 ml milk
//!   Tea Leaves   (4) ─┐
//!   Sugar        (5) ─┼─ Iced Tea   (4)  5 g tea, 200 ml water,
//!   Ice          (6) ─┘                  20 g sugar, 50 g ice
//! ```
//!
//! Each collection is seeded on its own: a store that already has products
//! but no purchases only gets the default purchases.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::money::Money;
use crate::types::{
    Ingredient, PaymentMethod, Product, Purchase, PurchaseItem, RawMaterial, Transaction,
    TransactionItem,
};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

/// `Decimal` from an integer mantissa and scale: `dec(5, 2)` is 0.05.
fn dec(mantissa: i64, scale: u32) -> Decimal {
    Decimal::new(mantissa, scale)
}

fn material(
    id: &str,
    name: &str,
    unit: &str,
    stock: i64,
    unit_cost: Decimal,
    supplier: &str,
) -> RawMaterial {
    let created = at(2023, 1, 1, 0, 0);
    RawMaterial {
        id: id.to_string(),
        name: name.to_string(),
        unit: unit.to_string(),
        stock: Decimal::from(stock),
        unit_cost: Money::new(unit_cost),
        supplier: supplier.to_string(),
        created_at: created,
        updated_at: created,
    }
}

/// Default raw materials, ids "1" through "6".
pub fn raw_materials() -> Vec<RawMaterial> {
    vec![
        material("1", "Coffee Beans", "g", 5000, dec(5, 2), "Coffee Supplier Inc."),
        material("2", "Water", "ml", 50000, dec(1, 3), "Local Water Supply"),
        material("3", "Milk", "ml", 10000, dec(3, 3), "Dairy Farm Inc."),
        material("4", "Tea Leaves", "g", 2000, dec(4, 2), "Tea Supplier Co."),
        material("5", "Sugar", "g", 8000, dec(2, 3), "Sweet Inc."),
        material("6", "Ice", "g", 15000, dec(1, 3), "Local Ice Supply"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    name: &str,
    price_cents: i64,
    cost_cents: i64,
    stock: i64,
    category: &str,
    bom: &[(&str, i64)],
    created: DateTime<Utc>,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: Money::from_cents(price_cents),
        cost_price: Money::from_cents(cost_cents),
        stock,
        category: category.to_string(),
        image: None,
        ingredients: bom
            .iter()
            .map(|(material_id, amount)| Ingredient::new(*material_id, Decimal::from(*amount)))
            .collect(),
        created_at: created,
        updated_at: created,
    }
}

/// Default products, ids "1" through "4".
pub fn products() -> Vec<Product> {
    vec![
        product("1", "Espresso", 350, 120, 100, "Coffee", &[("1", 18), ("2", 40)], at(2023, 1, 1, 0, 0)),
        product(
            "2",
            "Cappuccino",
            450,
            200,
            80,
            "Coffee",
            &[("1", 18), ("2", 40), ("3", 100)],
            at(2023, 1, 2, 0, 0),
        ),
        product(
            "3",
            "Latte",
            500,
            220,
            75,
            "Coffee",
            &[("1", 18), ("2", 40), ("3", 150)],
            at(2023, 1, 3, 0, 0),
        ),
        product(
            "4",
            "Iced Tea",
            300,
            100,
            120,
            "Tea",
            &[("4", 5), ("2", 200), ("5", 20), ("6", 50)],
            at(2023, 1, 4, 0, 0),
        ),
    ]
}

fn delivery(
    id: &str,
    date: DateTime<Utc>,
    supplier: &str,
    material_id: &str,
    quantity: i64,
    unit_cost: Decimal,
    notes: &str,
) -> Purchase {
    let unit_cost = Money::new(unit_cost);
    let quantity = Decimal::from(quantity);
    let total = unit_cost.times(quantity);
    Purchase {
        id: id.to_string(),
        date,
        supplier: supplier.to_string(),
        items: vec![PurchaseItem {
            raw_material_id: material_id.to_string(),
            quantity,
            unit_cost,
            total,
        }],
        total_amount: total,
        notes: Some(notes.to_string()),
        created_at: date,
        updated_at: date,
    }
}

/// Default purchases: one beans delivery, one milk delivery.
pub fn purchases() -> Vec<Purchase> {
    vec![
        delivery(
            "1",
            at(2023, 1, 5, 0, 0),
            "Coffee Supplier Inc.",
            "1",
            2000,
            dec(5, 2),
            "Monthly coffee beans supply",
        ),
        delivery(
            "2",
            at(2023, 1, 10, 0, 0),
            "Dairy Farm Inc.",
            "3",
            5000,
            dec(3, 3),
            "Weekly milk supply",
        ),
    ]
}

fn sold(product_id: &str, name: &str, quantity: i64, price_cents: i64, cost_cents: i64) -> TransactionItem {
    let unit_price = Money::from_cents(price_cents);
    let cost_price = Money::from_cents(cost_cents);
    TransactionItem {
        product_id: product_id.to_string(),
        product_name: name.to_string(),
        quantity,
        unit_price,
        cost_price,
        total_price: unit_price * quantity,
        profit: (unit_price - cost_price) * quantity,
    }
}

#[allow(clippy::too_many_arguments)]
fn sale(
    id: &str,
    date: DateTime<Utc>,
    items: Vec<TransactionItem>,
    discount_cents: i64,
    tax_cents: i64,
    payment_method: PaymentMethod,
    cashier_name: &str,
    customer_name: Option<&str>,
) -> Transaction {
    let subtotal: Money = items.iter().map(|i| i.total_price).sum();
    let profit: Money = items.iter().map(|i| i.profit).sum();
    let discount = Money::from_cents(discount_cents);
    let tax = Money::from_cents(tax_cents);
    Transaction {
        id: id.to_string(),
        date,
        items,
        subtotal,
        discount,
        tax,
        total: subtotal - discount + tax,
        profit,
        payment_method,
        cashier_name: cashier_name.to_string(),
        customer_name: customer_name.map(str::to_string),
        notes: None,
        created_at: date,
        updated_at: date,
    }
}

/// Default transactions: two sales on 2023-04-15.
pub fn transactions() -> Vec<Transaction> {
    vec![
        sale(
            "1",
            at(2023, 4, 15, 9, 30),
            vec![
                sold("1", "Espresso", 2, 350, 120),
                sold("4", "Iced Tea", 1, 300, 100),
            ],
            0,
            50,
            PaymentMethod::Cash,
            "John Doe",
            None,
        ),
        sale(
            "2",
            at(2023, 4, 15, 14, 45),
            vec![sold("2", "Cappuccino", 3, 450, 200)],
            150,
            60,
            PaymentMethod::Card,
            "Jane Smith",
            Some("Regular Customer"),
        ),
    ]
}
