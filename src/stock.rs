//! Stock ledger: the single source of truth for quantity-on-hand per
//! (location, product) pair. Warehouse and distributor stock live in
//! separate tables but share one set of operations, so the non-negativity
//! invariant is enforced in exactly one place.
//!
//! Every operation runs against the caller's open transaction and never
//! commits on its own; a ledger write is only as durable as the business
//! transaction around it.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Warehouse(Uuid),
    Distributor(Uuid),
}

impl Location {
    pub fn owner(&self) -> Uuid {
        match self {
            Location::Warehouse(id) | Location::Distributor(id) => *id,
        }
    }

    fn credit_sql(&self) -> &'static str {
        match self {
            Location::Warehouse(_) => {
                "INSERT INTO warehouse_inventory (warehouse_id, product_id, qty) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (warehouse_id, product_id) \
                 DO UPDATE SET qty = warehouse_inventory.qty + EXCLUDED.qty"
            }
            Location::Distributor(_) => {
                "INSERT INTO distributor_stock (distributor_id, product_id, qty) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (distributor_id, product_id) \
                 DO UPDATE SET qty = distributor_stock.qty + EXCLUDED.qty"
            }
        }
    }

    // Sufficiency check and subtraction in one statement; zero rows affected
    // means the row is missing or short, and nothing was mutated.
    fn debit_sql(&self) -> &'static str {
        match self {
            Location::Warehouse(_) => {
                "UPDATE warehouse_inventory SET qty = qty - $3 \
                 WHERE warehouse_id = $1 AND product_id = $2 AND qty >= $3"
            }
            Location::Distributor(_) => {
                "UPDATE distributor_stock SET qty = qty - $3 \
                 WHERE distributor_id = $1 AND product_id = $2 AND qty >= $3"
            }
        }
    }

    fn ensure_sql(&self) -> &'static str {
        match self {
            Location::Warehouse(_) => {
                "INSERT INTO warehouse_inventory (warehouse_id, product_id, qty) \
                 VALUES ($1, $2, 0) ON CONFLICT DO NOTHING"
            }
            Location::Distributor(_) => {
                "INSERT INTO distributor_stock (distributor_id, product_id, qty) \
                 VALUES ($1, $2, 0) ON CONFLICT DO NOTHING"
            }
        }
    }

    fn get_sql(&self) -> &'static str {
        match self {
            Location::Warehouse(_) => {
                "SELECT qty FROM warehouse_inventory \
                 WHERE warehouse_id = $1 AND product_id = $2"
            }
            Location::Distributor(_) => {
                "SELECT qty FROM distributor_stock \
                 WHERE distributor_id = $1 AND product_id = $2"
            }
        }
    }
}

fn ensure_positive(qty: i32) -> Result<(), ApiError> {
    if qty <= 0 {
        return Err(ApiError::Validation(
            "Quantity must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Add `qty` units, inserting the row if the product was never stocked here.
pub async fn credit(
    tx: &mut Transaction<'_, Postgres>,
    location: Location,
    product_id: Uuid,
    qty: i32,
) -> Result<(), ApiError> {
    ensure_positive(qty)?;

    sqlx::query(location.credit_sql())
        .bind(location.owner())
        .bind(product_id)
        .bind(qty)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Remove `qty` units. Fails with `InsufficientStock` naming `product` when
/// the on-hand quantity is short, leaving the row untouched.
pub async fn debit(
    tx: &mut Transaction<'_, Postgres>,
    location: Location,
    product_id: Uuid,
    qty: i32,
    product: &str,
) -> Result<(), ApiError> {
    ensure_positive(qty)?;

    let result = sqlx::query(location.debit_sql())
        .bind(location.owner())
        .bind(product_id)
        .bind(qty)
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::InsufficientStock {
            product: product.to_string(),
        });
    }

    Ok(())
}

/// Materialize a zero-qty row if the pair has none yet.
pub async fn ensure_row(
    tx: &mut Transaction<'_, Postgres>,
    location: Location,
    product_id: Uuid,
) -> Result<(), ApiError> {
    sqlx::query(location.ensure_sql())
        .bind(location.owner())
        .bind(product_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Current quantity on hand; 0 for a pair that was never stocked.
pub async fn get(
    tx: &mut Transaction<'_, Postgres>,
    location: Location,
    product_id: Uuid,
) -> Result<i32, ApiError> {
    let qty: Option<i32> = sqlx::query_scalar(location.get_sql())
        .bind(location.owner())
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(qty.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_quantities_are_rejected() {
        assert!(ensure_positive(0).is_err());
        assert!(ensure_positive(-3).is_err());
        assert!(ensure_positive(1).is_ok());
    }

    #[test]
    fn location_exposes_its_owner() {
        let id = Uuid::new_v4();
        assert_eq!(Location::Warehouse(id).owner(), id);
        assert_eq!(Location::Distributor(id).owner(), id);
    }

    #[test]
    fn debit_statements_are_conditional_on_sufficiency() {
        // The qty >= check must live inside the UPDATE itself, otherwise
        // concurrent debits of the same pair could drive qty negative.
        let wh = Location::Warehouse(Uuid::new_v4());
        let ds = Location::Distributor(Uuid::new_v4());
        assert!(wh.debit_sql().contains("qty >= $3"));
        assert!(ds.debit_sql().contains("qty >= $3"));
    }
}
