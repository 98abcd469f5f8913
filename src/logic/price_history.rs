use crate::error::Result;
use crate::logic::rates::RateSources;
use crate::logic::types::{Block, DataSource, PriceChartEntry};
use futures::future::try_join_all;
use std::time::Instant;
use tracing::{debug, info};

/// Builds a chart series from a list of block checkpoints.
///
/// The last checkpoint is never read historically: its slot is always the
/// live rate, so the chart ends on the current price.
#[derive(Clone)]
pub struct PriceHistoryAssembler {
    rates: RateSources,
}

impl PriceHistoryAssembler {
    pub fn new(rates: RateSources) -> Self {
        Self { rates }
    }

    /// One point per block in input order; the final point is the live rate.
    ///
    /// An empty block list yields just the live point. Any failed read
    /// (historical or live) fails the whole series.
    pub async fn build_price_history(&self, blocks: &[Block], asset_id: &str, data_source: DataSource) -> Result<Vec<PriceChartEntry>> {
        let start_time = Instant::now();

        if blocks.is_empty() {
            debug!("No checkpoints for {} {}, returning live rate only", data_source, asset_id);
        }
        let historical_blocks = blocks.split_last().map_or(&[][..], |(_, rest)| rest);
        let block_numbers = historical_blocks.iter().map(Block::block_number).collect::<Result<Vec<u64>>>()?;

        let historical = try_join_all(
            block_numbers
                .iter()
                .map(|block| self.rates.rate_at_block(asset_id, data_source, *block)),
        );
        let (mut points, live) = futures::try_join!(historical, self.rates.rate(asset_id, data_source))?;
        points.push(live);

        info!(
            "Built {} point price history for {} {} in {:?}",
            points.len(),
            data_source,
            asset_id,
            start_time.elapsed()
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sync::mock::{MockIndexer, MockSubgraph, uni_token};
    use crate::error::WatchlistError;
    use crate::logic::types::{BlockNumber, RatePoint};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn blocks(numbers: &[u64]) -> Vec<Block> {
        numbers.iter().copied().map(Block::new).collect()
    }

    #[tokio::test]
    async fn test_last_point_is_live_rate() {
        let indexer = MockIndexer::default()
            .with_latest("sBTC", 60000.0)
            .with_history("sBTC", &[(10, 50000.0), (20, 51000.0), (30, 52000.0), (40, 53000.0), (50, 54000.0)])
            .with_delay("sBTC", Duration::from_millis(5));
        let assembler = PriceHistoryAssembler::new(RateSources::new(Arc::new(indexer), Arc::new(MockSubgraph::default())));

        let points = assembler.build_price_history(&blocks(&[10, 20, 30, 40, 50]), "sBTC", DataSource::Synth).await.unwrap();

        let rates: Vec<f64> = points.iter().map(|p| p.formatted_rate).collect();
        assert_eq!(rates, vec![50000.0, 51000.0, 52000.0, 53000.0, 60000.0]);
    }

    #[tokio::test]
    async fn test_historical_reads_skip_last_block() {
        let indexer = Arc::new(MockIndexer::default().with_latest("sETH", 2000.0).with_history("sETH", &[(1, 1900.0)]));
        let assembler = PriceHistoryAssembler::new(RateSources::new(indexer.clone(), Arc::new(MockSubgraph::default())));

        assembler.build_price_history(&blocks(&[1, 2, 3]), "sETH", DataSource::Synth).await.unwrap();
        assert_eq!(indexer.history_calls.load(Ordering::SeqCst), 2);
        assert_eq!(indexer.latest_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_uni_live_point_uses_fresh_eth_price() {
        let id = "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984";
        let subgraph = Arc::new(
            MockSubgraph::default()
                .with_eth_price(3000.0)
                .with_eth_price_at(100, 2000.0)
                .with_token(uni_token(id, "UNI", "0.002"))
                .with_token_at(100, uni_token(id, "UNI", "0.002")),
        );
        let assembler = PriceHistoryAssembler::new(RateSources::new(Arc::new(MockIndexer::default()), subgraph.clone()));

        let points = assembler.build_price_history(&blocks(&[100, 200]), id, DataSource::Uni).await.unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[0].formatted_rate - 4.0).abs() < 1e-9);
        assert!((points[1].formatted_rate - 6.0).abs() < 1e-9);
        assert_eq!(subgraph.latest_eth_price_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_uni_checkpoints_before_listing_read_as_zero() {
        let id = "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984";
        let subgraph = MockSubgraph::default()
            .with_eth_price(3000.0)
            .with_eth_price_at(200, 2000.0)
            .with_token(uni_token(id, "UNI", "0.002"))
            .with_token_at(200, uni_token(id, "UNI", "0.002"));
        let assembler = PriceHistoryAssembler::new(RateSources::new(Arc::new(MockIndexer::default()), Arc::new(subgraph)));

        let points = assembler.build_price_history(&blocks(&[100, 200, 300]), id, DataSource::Uni).await.unwrap();
        assert_eq!(points.len(), 3);
        assert!(points[0].is_missing());
        assert!((points[1].formatted_rate - 4.0).abs() < 1e-9);
        assert!((points[2].formatted_rate - 6.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_history_reads_as_zero() {
        let indexer = MockIndexer::default().with_latest("sLINK", 7.5);
        let assembler = PriceHistoryAssembler::new(RateSources::new(Arc::new(indexer), Arc::new(MockSubgraph::default())));

        let points = assembler.build_price_history(&blocks(&[5, 6]), "sLINK", DataSource::Synth).await.unwrap();
        assert_eq!(points, vec![RatePoint::missing(), RatePoint::recorded(7.5)]);
    }

    #[tokio::test]
    async fn test_empty_blocks_yield_live_point() {
        let indexer = MockIndexer::default().with_latest("sETH", 2000.0);
        let assembler = PriceHistoryAssembler::new(RateSources::new(Arc::new(indexer), Arc::new(MockSubgraph::default())));

        let points = assembler.build_price_history(&[], "sETH", DataSource::Synth).await.unwrap();
        assert_eq!(points, vec![RatePoint::recorded(2000.0)]);
    }

    #[tokio::test]
    async fn test_invalid_block_number() {
        let indexer = MockIndexer::default().with_latest("sETH", 2000.0);
        let assembler = PriceHistoryAssembler::new(RateSources::new(Arc::new(indexer), Arc::new(MockSubgraph::default())));
        let input = vec![Block { number: BlockNumber::Text("not-a-block".to_string()), timestamp: None }, Block::new(2)];

        let err = assembler.build_price_history(&input, "sETH", DataSource::Synth).await.unwrap_err();
        assert!(matches!(err, WatchlistError::InvalidBlock(_)));
    }

    #[tokio::test]
    async fn test_live_failure_fails_series() {
        let indexer = MockIndexer::default().with_history("sETH", &[(1, 1900.0)]);
        let assembler = PriceHistoryAssembler::new(RateSources::new(Arc::new(indexer), Arc::new(MockSubgraph::default())));

        let err = assembler.build_price_history(&blocks(&[1, 2]), "sETH", DataSource::Synth).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
