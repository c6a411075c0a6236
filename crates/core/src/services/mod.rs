pub mod currency_service;
pub mod exchange_rate_service;
pub mod portfolio_service;
