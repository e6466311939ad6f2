//! Header names of the used-car sales export. Matching is exact: case and
//! spaces count.

pub const CAR_ID: &str = "Car_id";
pub const BRAND: &str = "Brand";
pub const DEALER_REGION: &str = "Dealer_Region";
pub const BODY_STYLE: &str = "Body Style";
pub const PRICE: &str = "Price";
pub const PRICE_CATEGORY: &str = "Price_category";

/// Output column of every count aggregate.
pub const COUNT: &str = "count";
