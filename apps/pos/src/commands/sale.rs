//! # Sale Commands
//!
//! Checkout of the session cart and the transaction history.

use barista_core::{Money, Operator, PaymentDetails, PaymentMethod, Transaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::{CartState, Shop};

/// Payment form submitted from the checkout dialog.
///
/// The cashier is taken from the signed-in operator, not from the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub tax: Money,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckoutRequest {
    fn into_payment(self, operator: &Operator) -> PaymentDetails {
        PaymentDetails {
            discount: self.discount,
            tax: self.tax,
            customer_name: self.customer_name.filter(|n| !n.trim().is_empty()),
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            ..PaymentDetails::for_operator(operator, self.payment_method)
        }
    }
}

/// Transactions in a date range with their totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionList {
    pub transactions: Vec<Transaction>,
    pub revenue: Money,
    pub profit: Money,
}

/// Settles the session cart.
///
/// ## Outcomes
/// ```text
/// Ok(transaction)                 sale saved, cart cleared
/// Err(RECONCILIATION_REQUIRED)    sale applied, save failed, cart cleared
/// Err(anything else)              nothing changed, cart untouched
/// ```
pub async fn checkout(
    shop: &Shop,
    cart: &CartState,
    operator: &Operator,
    request: CheckoutRequest,
) -> Result<Transaction, ApiError> {
    debug!(
        cashier = %operator.display_name,
        payment_method = ?request.payment_method,
        "checkout command"
    );

    Ok(shop.checkout(cart, request.into_payment(operator)).await?)
}

/// Transactions dated from `from` through `to`, both included. Either bound may be open.
pub async fn list_transactions(
    shop: &Shop,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<TransactionList, ApiError> {
    debug!(?from, ?to, "list_transactions command");

    let from = from.unwrap_or(DateTime::<Utc>::MIN_UTC);
    let to = to.unwrap_or(DateTime::<Utc>::MAX_UTC);
    if from > to {
        return Err(ApiError::validation("Start date is after end date"));
    }

    let inventory = shop.snapshot().await;
    let transactions: Vec<Transaction> = inventory
        .transactions()
        .between(from, to)
        .into_iter()
        .cloned()
        .collect();

    Ok(TransactionList {
        revenue: transactions.iter().map(|t| t.total).sum(),
        profit: transactions.iter().map(|t| t.profit).sum(),
        transactions,
    })
}

pub async fn get_transaction(shop: &Shop, id: &str) -> Result<Transaction, ApiError> {
    debug!(id = %id, "get_transaction command");

    shop.snapshot()
        .await
        .transactions()
        .get(id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Transaction", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use barista_core::Role;
    use chrono::TimeZone;

    fn operator() -> Operator {
        Operator {
            display_name: "Jane Smith".to_string(),
            role: Role::Cashier,
        }
    }

    #[test]
    fn test_request_uses_operator_as_cashier() {
        let request: CheckoutRequest = serde_json::from_str(
            r#"{"discount":"0.50","paymentMethod":"card","customerName":"  ","notes":"oat milk"}"#,
        )
        .unwrap();

        let payment = request.into_payment(&operator());
        assert_eq!(payment.cashier_name, "Jane Smith");
        assert_eq!(payment.discount, Money::from_cents(50));
        assert_eq!(payment.tax, Money::zero());
        assert_eq!(payment.payment_method, PaymentMethod::Card);
        assert_eq!(payment.customer_name, None);
        assert_eq!(payment.notes.as_deref(), Some("oat milk"));
    }

    #[tokio::test]
    async fn test_list_transactions_range() {
        let db = barista_db::Database::new(barista_db::DbConfig::in_memory())
            .await
            .unwrap();
        let shop = Shop::open(std::sync::Arc::new(db), 1).await.unwrap();

        let all = list_transactions(&shop, None, None).await.unwrap();
        assert_eq!(all.transactions.len(), 2);
        let ledger = shop.snapshot().await;
        assert_eq!(all.revenue, ledger.transactions().revenue());
        assert_eq!(all.profit, ledger.transactions().profit());

        let day = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let none = list_transactions(&shop, Some(day), Some(day)).await.unwrap();
        assert!(none.transactions.is_empty());
        assert_eq!(none.revenue, Money::zero());

        let second_sale = Utc.with_ymd_and_hms(2023, 4, 15, 14, 45, 0).unwrap();
        let exact = list_transactions(&shop, Some(day), Some(second_sale)).await.unwrap();
        assert_eq!(exact.transactions.len(), 2);
        let exact = list_transactions(&shop, Some(second_sale), Some(second_sale))
            .await
            .unwrap();
        assert_eq!(exact.transactions.len(), 1);

        let later = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert!(list_transactions(&shop, Some(later), Some(day)).await.is_err());
    }
}
