pub mod helpers;
mod money;
pub mod op;
mod secret;

pub use money::{Money, MoneyConversionError};
pub use secret::Secret;
