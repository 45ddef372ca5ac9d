use rust_decimal::Decimal;

/// Tiered additive markup on the supplier's base price. The tiers form
/// a total half-open partition of the price line:
/// `[0,100) -> +50, [100,500) -> +100, [500,inf) -> +200`.
pub fn markup(base_price: Decimal) -> Decimal {
    if base_price < Decimal::from(100) {
        Decimal::from(50)
    } else if base_price < Decimal::from(500) {
        Decimal::from(100)
    } else {
        Decimal::from(200)
    }
}

/// Final sale price: base price plus the tier markup.
pub fn final_price(base_price: Decimal) -> Decimal {
    base_price + markup(base_price)
}
