// Re-export all model types
pub use self::analytics::*;
pub use self::booking::*;
pub use self::cart::*;
pub use self::enums::*;
pub use self::errors::*;
pub use self::ids::*;
pub use self::order::*;
pub use self::payment::*;
pub use self::product::*;
pub use self::validation::*;

mod analytics;
mod booking;
mod cart;
mod enums;
mod errors;
mod ids;
mod order;
mod payment;
mod product;
mod validation;
