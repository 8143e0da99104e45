pub mod orbit;
pub mod trajectory;
