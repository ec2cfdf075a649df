// src/services/pricing.rs

use std::collections::HashMap;

use crate::{
    common::error::AppError,
    models::{catalog::Product, order::OrderLinePayload},
};

/// Linha de pedido com o preço congelado no momento da criação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub total_amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    pub total_amount_cents: i64,
}

/// Ids distintos na ordem em que aparecem no pedido.
pub fn requested_product_ids(lines: &[OrderLinePayload]) -> Vec<i64> {
    let mut ids: Vec<i64> = Vec::with_capacity(lines.len());
    for line in lines {
        if !ids.contains(&line.product_id) {
            ids.push(line.product_id);
        }
    }
    ids
}

/// Calcula o snapshot de preços. `products` deve conter apenas produtos
/// ativos da loja; qualquer id pedido que não esteja ali derruba o pedido inteiro.
pub fn price_order(lines: &[OrderLinePayload], products: &[Product]) -> Result<PricedOrder, AppError> {
    if lines.is_empty() {
        return Err(AppError::BadRequest(
            "O pedido precisa de pelo menos um item.".into(),
        ));
    }

    let by_id: HashMap<i64, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut priced = Vec::with_capacity(lines.len());
    let mut total: i64 = 0;

    for line in lines {
        let quantity = i32::try_from(line.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Quantidade inválida para o produto {}.",
                    line.product_id
                ))
            })?;

        let product = by_id.get(&line.product_id).ok_or_else(|| {
            AppError::NotFound(format!(
                "Produto {} não encontrado ou inativo.",
                line.product_id
            ))
        })?;

        let line_total = product
            .price_cents
            .checked_mul(i64::from(quantity))
            .ok_or_else(|| AppError::BadRequest("Valor do pedido excede o limite.".into()))?;

        total = total
            .checked_add(line_total)
            .ok_or_else(|| AppError::BadRequest("Valor do pedido excede o limite.".into()))?;

        priced.push(PricedLine {
            product_id: product.id,
            quantity,
            unit_price_cents: product.price_cents,
            total_amount_cents: line_total,
        });
    }

    Ok(PricedOrder {
        lines: priced,
        total_amount_cents: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::ProductType;
    use chrono::Utc;

    fn product(id: i64, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id,
            business_id: 1,
            category_id: None,
            name: format!("Produto {id}"),
            subtitle: None,
            sku: None,
            product_type: ProductType::Physical,
            price_cents,
            description: None,
            features: vec![],
            image_url: None,
            images: vec![],
            stock: None,
            tags: vec![],
            seo_title: None,
            seo_description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(product_id: i64, quantity: i64) -> OrderLinePayload {
        OrderLinePayload { product_id, quantity }
    }

    #[test]
    fn total_is_price_times_quantity() {
        let priced = price_order(&[line(1, 2)], &[product(1, 1000)]).unwrap();
        assert_eq!(priced.total_amount_cents, 2000);
        assert_eq!(
            priced.lines,
            vec![PricedLine {
                product_id: 1,
                quantity: 2,
                unit_price_cents: 1000,
                total_amount_cents: 2000,
            }]
        );
    }

    #[test]
    fn total_sums_every_line() {
        let products = [product(1, 1000), product(2, 250)];
        let priced = price_order(&[line(1, 1), line(2, 4), line(1, 3)], &products).unwrap();
        assert_eq!(priced.total_amount_cents, 1000 + 1000 + 3000);
        assert_eq!(priced.lines.len(), 3);
    }

    #[test]
    fn snapshot_ignores_later_price_changes() {
        let mut catalog = vec![product(1, 1000)];
        let priced = price_order(&[line(1, 2)], &catalog).unwrap();

        catalog[0].price_cents = 500;

        assert_eq!(priced.total_amount_cents, 2000);
        assert_eq!(priced.lines[0].unit_price_cents, 1000);
    }

    #[test]
    fn missing_product_fails_the_whole_order() {
        let err = price_order(&[line(1, 1), line(42, 1)], &[product(1, 1000)]).unwrap_err();
        match err {
            AppError::NotFound(msg) => assert!(msg.contains("42")),
            other => panic!("esperava NotFound, veio {other:?}"),
        }
    }

    #[test]
    fn empty_order_is_rejected() {
        assert!(matches!(price_order(&[], &[]), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let products = [product(1, 1000)];
        assert!(matches!(price_order(&[line(1, 0)], &products), Err(AppError::BadRequest(_))));
        assert!(matches!(price_order(&[line(1, -2)], &products), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn overflow_is_rejected() {
        let products = [product(1, i64::MAX / 2)];
        assert!(price_order(&[line(1, 3)], &products).is_err());
    }

    #[test]
    fn requested_ids_are_deduplicated_in_order() {
        assert_eq!(requested_product_ids(&[line(3, 1), line(1, 1), line(3, 2)]), vec![3, 1]);
    }
}
