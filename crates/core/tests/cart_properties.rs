//! Property tests for cart arithmetic and upsert semantics.

use jewelbox_core::{
    Cart, CartItem, Money, PackagingChoice, PackagingKind, PackagingSelection, ProductId,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn cents_strategy() -> impl Strategy<Value = i64> {
    0i64..10_000_000
}

fn line_strategy() -> impl Strategy<Value = (i32, i64, u32, i64)> {
    (1i32..20, cents_strategy(), 1u32..50, 0i64..50_000)
}

fn money(cents: i64) -> Money {
    Money::new(Decimal::new(cents, 2)).unwrap_or(Money::ZERO)
}

fn build_line(id: i32, price_cents: i64, qty: u32, packaging_cents: i64) -> CartItem {
    let mut packaging = PackagingSelection::default();
    packaging.set(
        PackagingKind::Box,
        Some(PackagingChoice::new("Box", money(packaging_cents))),
    );
    CartItem::new(
        ProductId::new(id),
        format!("Item {id}"),
        None,
        money(price_cents),
        qty,
        qty,
    )
    .map(|line| line.with_packaging(packaging))
    .unwrap_or_else(|e| panic!("valid line rejected: {e}"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn total_is_sum_of_unit_plus_packaging_times_qty(
        lines in prop::collection::vec(line_strategy(), 0..12)
    ) {
        let mut cart = Cart::new();
        for &(id, price, qty, packaging) in &lines {
            cart.add(build_line(id, price, qty, packaging));
        }

        // Later adds for the same product win, so compute the expectation
        // from the last occurrence of each id.
        let mut expected_cents: i128 = 0;
        for (index, &(id, price, qty, packaging)) in lines.iter().enumerate() {
            let superseded = lines.iter().skip(index + 1).any(|&(later, ..)| later == id);
            if !superseded {
                expected_cents += i128::from(price + packaging) * i128::from(qty);
            }
        }

        let expected = Decimal::from_i128_with_scale(expected_cents, 2);
        prop_assert_eq!(cart.total().amount(), expected);
    }

    #[test]
    fn at_most_one_line_per_product(
        lines in prop::collection::vec(line_strategy(), 0..30)
    ) {
        let cart: Cart = lines
            .iter()
            .map(|&(id, price, qty, packaging)| build_line(id, price, qty, packaging))
            .collect();

        let mut ids: Vec<_> = cart.items().iter().map(|line| line.product_id).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), before);
    }

    #[test]
    fn removing_absent_product_is_noop(
        lines in prop::collection::vec(line_strategy(), 0..10),
        absent in 100i32..200,
    ) {
        let mut cart: Cart = lines
            .iter()
            .map(|&(id, price, qty, packaging)| build_line(id, price, qty, packaging))
            .collect();
        let before = cart.clone();

        prop_assert!(!cart.remove(ProductId::new(absent)));
        prop_assert_eq!(cart, before);
    }

    #[test]
    fn quantity_above_stock_is_rejected(stock in 0u32..100, extra in 1u32..100) {
        let result = CartItem::new(
            ProductId::new(1),
            "Ring",
            None,
            Money::ZERO,
            stock,
            stock + extra,
        );
        prop_assert!(result.is_err());
    }
}
