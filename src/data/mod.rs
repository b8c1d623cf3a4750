pub mod catalog;
pub mod character;
pub mod power;
pub mod validate;

pub use catalog::Catalog;
pub use character::{Character, CharacterRecord, PowerRef};
pub use power::{CommonPowerName, Power, PowerKind, PowerLevel, PowerRecord};
