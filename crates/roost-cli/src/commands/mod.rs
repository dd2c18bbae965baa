pub mod change;
pub mod classify;
pub mod inputs;
pub mod schema;
pub mod sites;
pub mod trajectory;
