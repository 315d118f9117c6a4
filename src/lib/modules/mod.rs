pub mod ebb;
pub mod fire_age;
