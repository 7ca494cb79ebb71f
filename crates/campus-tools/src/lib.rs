//! Small campus utilities sharing the energy report's binary: a JSON-backed
//! library book inventory and a daily calorie log.

pub mod calories;
pub mod inventory;
