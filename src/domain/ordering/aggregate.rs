//! Ordering Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value_objects::round_cents;
use super::{OrderId, OrderLine};
use crate::domain::catalog::BookId;
use crate::domain::customer::ClientId;
use crate::domain::identity::UserId;
use crate::domain::shop::ShopId;
use crate::domain::validation::{FieldErrors, ValidationError};

/// 单行数量上限
pub const MAX_LINE_QUANTITY: i32 = 100_000;
/// 整单图书数量上限
pub const MAX_ORDER_BOOKS: i32 = 1_000_000;

/// 订单聚合根
///
/// 不变量:
/// - 至少一行，每行 1 <= quantity <= MAX_LINE_QUANTITY、price >= 0
/// - total = Σ line.total，total_books = Σ line.quantity <= MAX_ORDER_BOOKS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub client_id: ClientId,
    pub shop_id: ShopId,
    pub order_lines: Vec<OrderLine>,
    pub total: f64,
    pub total_books: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// 创建订单并计算汇总
    pub fn new(
        user_id: UserId,
        client_id: ClientId,
        shop_id: ShopId,
        order_lines: Vec<OrderLine>,
    ) -> Result<Self, ValidationError> {
        Self::validate_lines(&order_lines)?;
        let now = Utc::now();
        let mut order = Self {
            id: OrderId::generate(),
            user_id,
            client_id,
            shop_id,
            order_lines,
            total: 0.0,
            total_books: 0,
            created_at: now,
            updated_at: now,
        };
        order.recalculate();
        Ok(order)
    }

    /// 替换订单内容
    pub fn revise(
        &mut self,
        client_id: ClientId,
        shop_id: ShopId,
        order_lines: Vec<OrderLine>,
    ) -> Result<(), ValidationError> {
        Self::validate_lines(&order_lines)?;
        self.client_id = client_id;
        self.shop_id = shop_id;
        self.order_lines = order_lines;
        self.recalculate();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn validate_lines(lines: &[OrderLine]) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        errors.check(!lines.is_empty(), "order_lines", "must contain at least one line");
        for (index, line) in lines.iter().enumerate() {
            errors
                .check(
                    line.quantity >= 1,
                    &format!("order_lines[{}].quantity", index),
                    "must be at least 1",
                )
                .check(
                    line.quantity <= MAX_LINE_QUANTITY,
                    &format!("order_lines[{}].quantity", index),
                    &format!("must be at most {}", MAX_LINE_QUANTITY),
                )
                .check(
                    line.price.is_finite() && line.price >= 0.0,
                    &format!("order_lines[{}].price", index),
                    "must be greater than or equal to 0",
                );
        }
        let within_limit = total_quantity(lines).is_some_and(|total| total <= MAX_ORDER_BOOKS);
        errors.check(
            within_limit,
            "order_lines",
            &format!("must not order more than {} books in total", MAX_ORDER_BOOKS),
        );
        errors.into_result()
    }

    /// 每本书的总数量（同一本书可出现在多行）
    pub fn quantities(&self) -> BTreeMap<BookId, i32> {
        quantities_of(&self.order_lines)
    }

    fn recalculate(&mut self) {
        self.total = round_cents(self.order_lines.iter().map(|l| l.total).sum());
        self.total_books = total_quantity(&self.order_lines).unwrap_or(i32::MAX);
    }
}

/// 各行数量之和，溢出时为 None
fn total_quantity(lines: &[OrderLine]) -> Option<i32> {
    lines
        .iter()
        .try_fold(0i32, |total, line| total.checked_add(line.quantity))
}

/// 按书合并数量；调用方应先通过 `Order::validate_lines`
pub fn quantities_of(lines: &[OrderLine]) -> BTreeMap<BookId, i32> {
    let mut quantities = BTreeMap::new();
    for line in lines {
        let entry = quantities.entry(line.book_id).or_insert(0i32);
        *entry = entry.saturating_add(line.quantity);
    }
    quantities
}
