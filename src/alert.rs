use crate::domain::Offer;

/// Result of checking a batch of offers against a price ceiling.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Partition {
    /// Offers at or below the threshold, in input order.
    pub qualifying: Vec<Offer>,
    /// Number of offers inspected, priced or not.
    pub total_count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ThresholdFilter {
    threshold: f64,
}

impl ThresholdFilter {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// An offer qualifies only when it has a price and that price does not
    /// exceed the threshold.
    pub fn qualifies(&self, offer: &Offer) -> bool {
        matches!(offer.price, Some(price) if price <= self.threshold)
    }

    pub fn partition(&self, offers: &[Offer]) -> Partition {
        Partition {
            qualifying: offers
                .iter()
                .filter(|offer| self.qualifies(offer))
                .cloned()
                .collect(),
            total_count: offers.len(),
        }
    }
}
