pub mod numeric;
pub mod product;
pub mod roles;
pub mod settlement;

pub use numeric::parse_decimal;
pub use product::{Channel, ProductType};
pub use roles::{CommissionType, MarginClass, MarginSource, RoleCategory};
pub use settlement::{
    deadlines_for, month_range_utc, previous_month, MonthlySettlement, SettlementInvoice,
    SettlementStatus, ValidationStatus, MIN_PAYOUT_BRL,
};
