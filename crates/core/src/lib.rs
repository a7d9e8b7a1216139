pub mod amount;
pub mod currency;

pub use amount::{to_ascii_digits, Amount};
pub use currency::Currency;
