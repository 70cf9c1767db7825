use axum::{
    extract::{Query, State},
    response::Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    handlers::activity::log_activity,
    models::{RecordSaleRequest, SaleHistoryRow, SaleItemRequest},
    stock::{self, Location},
};

fn compute_total(items: &[SaleItemRequest]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |acc, item| acc + item.final_value)
}

#[derive(Serialize)]
pub struct RecordSaleResponse {
    pub success: bool,
    pub message: String,
    pub sale_id: Uuid,
}

/// Convert distributor stock into a recorded sale: header, line items,
/// stock debits and audit entries commit as one unit or not at all.
pub async fn record_sale(
    State(db): State<Database>,
    Json(form): Json<RecordSaleRequest>,
) -> Result<Json<RecordSaleResponse>, ApiError> {
    if form.items.is_empty() {
        return Err(ApiError::Validation("Invalid sales data".to_string()));
    }

    for item in &form.items {
        if item.qty <= 0 {
            return Err(ApiError::Validation(format!(
                "Invalid quantity for product {}",
                item.product_id
            )));
        }
    }

    let distributor_name: String =
        sqlx::query_scalar("SELECT name FROM distributors WHERE id = $1")
            .bind(form.distributor_id)
            .fetch_optional(&db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Distributor not found".to_string()))?;

    let total_amount = compute_total(&form.items);

    let mut tx = db.begin().await?;

    // Every line is checked before the first write; the conditional debit
    // below still guards against races on top of this.
    let mut product_names = Vec::with_capacity(form.items.len());
    for item in &form.items {
        let product_name: String = sqlx::query_scalar("SELECT name FROM products WHERE id = $1")
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::Validation(format!("Unknown product {}", item.product_id)))?;

        let available = stock::get(
            &mut tx,
            Location::Distributor(form.distributor_id),
            item.product_id,
        )
        .await?;

        if available < item.qty {
            return Err(ApiError::InsufficientStock {
                product: product_name,
            });
        }

        product_names.push(product_name);
    }

    let sale_id: Uuid = sqlx::query_scalar(
        "INSERT INTO sales (distributor_id, total_amount) VALUES ($1, $2) RETURNING id",
    )
    .bind(form.distributor_id)
    .bind(total_amount)
    .fetch_one(&mut *tx)
    .await?;

    for (item, product_name) in form.items.iter().zip(&product_names) {
        sqlx::query(
            "INSERT INTO sale_items (sale_id, product_id, qty, mrp, discount, final_value) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(sale_id)
        .bind(item.product_id)
        .bind(item.qty)
        .bind(item.mrp)
        .bind(item.discount)
        .bind(item.final_value)
        .execute(&mut *tx)
        .await?;

        stock::debit(
            &mut tx,
            Location::Distributor(form.distributor_id),
            item.product_id,
            item.qty,
            product_name,
        )
        .await?;

        let description = format!("Sold {} units of {}", item.qty, product_name);
        log_activity(&mut *tx, &distributor_name, &description).await?;
    }

    tx.commit().await?;

    Ok(Json(RecordSaleResponse {
        success: true,
        message: "Sale recorded".to_string(),
        sale_id,
    }))
}

#[derive(Debug, Serialize)]
pub struct SaleItemView {
    pub product_id: Uuid,
    pub product_name: String,
    pub qty: i32,
    pub mrp: Decimal,
    pub discount: Decimal,
    pub final_value: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SaleView {
    pub sale_id: Uuid,
    pub distributor_id: Uuid,
    pub total_amount: Decimal,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub items: Vec<SaleItemView>,
}

// The history query returns one row per line item; fold them back into one
// entry per sale, newest first.
fn group_sales(rows: Vec<SaleHistoryRow>, distributor_id: Uuid) -> Vec<SaleView> {
    let mut sales: Vec<SaleView> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for row in rows {
        let position = *index.entry(row.sale_id).or_insert_with(|| {
            sales.push(SaleView {
                sale_id: row.sale_id,
                distributor_id,
                total_amount: row.total_amount,
                created_at: row.created_at,
                items: Vec::new(),
            });
            sales.len() - 1
        });

        sales[position].items.push(SaleItemView {
            product_id: row.product_id,
            product_name: row.product_name.clone(),
            qty: row.qty,
            mrp: row.mrp,
            discount: row.discount,
            final_value: row.final_value,
        });
    }

    sales
}

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    pub distributor_id: Uuid,
}

#[derive(Serialize)]
pub struct SalesHistoryResponse {
    pub success: bool,
    pub sales: Vec<SaleView>,
}

pub async fn sales_history(
    State(db): State<Database>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<SalesHistoryResponse>, ApiError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM distributors WHERE id = $1")
        .bind(query.distributor_id)
        .fetch_one(&db)
        .await?;

    if exists == 0 {
        return Err(ApiError::NotFound("Distributor not found".to_string()));
    }

    let rows = sqlx::query_as::<_, SaleHistoryRow>(
        "SELECT s.id AS sale_id, s.total_amount, s.created_at, \
                si.product_id, p.name AS product_name, \
                si.qty, si.mrp, si.discount, si.final_value \
         FROM sales s \
         JOIN sale_items si ON s.id = si.sale_id \
         JOIN products p ON si.product_id = p.id \
         WHERE s.distributor_id = $1 \
         ORDER BY s.created_at DESC, s.id DESC",
    )
    .bind(query.distributor_id)
    .fetch_all(&db)
    .await?;

    Ok(Json(SalesHistoryResponse {
        success: true,
        sales: group_sales(rows, query.distributor_id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(final_value: &str) -> SaleItemRequest {
        SaleItemRequest {
            product_id: Uuid::new_v4(),
            qty: 1,
            mrp: Decimal::ZERO,
            discount: Decimal::ZERO,
            final_value: final_value.parse().unwrap(),
        }
    }

    #[test]
    fn total_is_the_sum_of_final_values() {
        let items = vec![item("199.50"), item("0.50"), item("25.00")];
        assert_eq!(compute_total(&items), "225.00".parse::<Decimal>().unwrap());
        assert_eq!(compute_total(&[]), Decimal::ZERO);
    }

    fn history_row(sale_id: Uuid, product_name: &str) -> SaleHistoryRow {
        SaleHistoryRow {
            sale_id,
            total_amount: "100".parse().unwrap(),
            created_at: Utc::now(),
            product_id: Uuid::new_v4(),
            product_name: product_name.to_string(),
            qty: 2,
            mrp: "60".parse().unwrap(),
            discount: "10".parse().unwrap(),
            final_value: "50".parse().unwrap(),
        }
    }

    #[test]
    fn grouping_folds_line_items_under_their_sale() {
        let distributor_id = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let rows = vec![
            history_row(first, "Ragi Flour"),
            history_row(first, "Foxtail Millet"),
            history_row(second, "Pearl Millet"),
        ];

        let sales = group_sales(rows, distributor_id);
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].sale_id, first);
        assert_eq!(sales[0].items.len(), 2);
        assert_eq!(sales[1].sale_id, second);
        assert_eq!(sales[1].items.len(), 1);
        assert!(sales.iter().all(|s| s.distributor_id == distributor_id));
    }
}
