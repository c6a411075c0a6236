pub mod traits;

// Collaborator implementations
pub mod currencylayer;
pub mod synthetic;
