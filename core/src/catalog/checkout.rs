use crate::traits::{PurchaseProvider, PurchaseReceipt};
use async_trait::async_trait;
use tracing::info;

pub const MOCK_TRANSACTION_ID: &str = "TX-UCP-77821";

#[derive(Debug, Default, Clone)]
pub struct MockCheckout;

impl MockCheckout {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PurchaseProvider for MockCheckout {
    fn name(&self) -> &str {
        "mock-ucp"
    }

    async fn purchase(&self, items: &[String]) -> anyhow::Result<PurchaseReceipt> {
        info!(?items, "Processing purchase via UCP");
        Ok(PurchaseReceipt {
            status: "success".to_string(),
            transaction_id: MOCK_TRANSACTION_ID.to_string(),
            message: "Payment processed via UCP.".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_purchase_succeeds() {
        let checkout = MockCheckout::new();
        for items in [vec![], vec!["Onion".to_string()], vec!["a".into(), "b".into()]] {
            let receipt = checkout.purchase(&items).await.unwrap();
            assert_eq!(receipt.status, "success");
            assert_eq!(receipt.transaction_id, MOCK_TRANSACTION_ID);
            assert_eq!(receipt.message, "Payment processed via UCP.");
        }
    }

    #[tokio::test]
    async fn repeated_purchase_yields_independent_receipts() {
        let checkout = MockCheckout::new();
        let items = vec!["Salsa".to_string()];
        let first = checkout.purchase(&items).await.unwrap();
        let second = checkout.purchase(&items).await.unwrap();
        assert_eq!(first, second);
    }
}
