pub mod currency;
pub mod dto;
pub mod portfolio;
pub mod portfolio_id;
pub mod quote;
pub mod settings;
