use chrono::Utc;
use rust_decimal::Decimal;

use crate::cancellation::CancellationToken;
use crate::errors::CoreError;
use crate::models::portfolio::{Portfolio, Stock};

use super::repository::PortfolioRepository;

/// Populates an empty portfolio collection with demo data.
pub struct PortfolioDataSeeder<'a> {
    repository: &'a PortfolioRepository,
}

impl<'a> PortfolioDataSeeder<'a> {
    pub fn new(repository: &'a PortfolioRepository) -> Self {
        Self { repository }
    }

    /// Insert the demo portfolios in one unit of work unless the collection
    /// already holds documents. Returns the number of portfolios created.
    pub async fn seed_all(&self, cancel: &CancellationToken) -> Result<usize, CoreError> {
        if !self.repository.get_all().await?.is_empty() {
            log::debug!("{} already seeded", self.repository.collection_name());
            return Ok(0);
        }

        let portfolios = [
            vec![
                Stock::new("TSLA", "USD", 20),
                Stock::new("GME", "USD", 100),
                Stock::new("KINV-B", "SEK", 50),
                Stock::new("BBD.B", "CAD", 100),
                Stock::new("NAS", "NOK", 20000),
            ],
            vec![
                Stock::new("TSLA", "USD", 1),
                Stock::new("GME", "USD", 3457),
                Stock::new("KINV-B", "SEK", 3457),
                Stock::new("BBD.B", "CAD", 5768),
                Stock::new("NAS", "NOK", 100000),
            ],
        ];

        for stocks in portfolios {
            let mut portfolio = Portfolio::create(Decimal::ZERO, Utc::now());
            for stock in stocks {
                portfolio.add_stock(stock)?;
            }
            self.repository.add(&portfolio)?;
        }

        let created = self.repository.unit_of_work().save_changes(cancel).await?;
        log::info!("seeded {created} portfolios");
        Ok(created)
    }
}
