use async_trait::async_trait;

use crate::extractor::{CompanyFacts, NarrativeContent};

mod client;
mod payload;

pub use client::{NotionClient, NotionClientConfig, NotionError};
pub use payload::PROPERTY_NAMES;

/// Persists one record pair and returns the new record id.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn create_record(
        &self,
        facts: &CompanyFacts,
        narrative: &NarrativeContent,
    ) -> Result<String, NotionError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{NotionError, RecordSink};
    use crate::extractor::{CompanyFacts, NarrativeContent};

    #[derive(Debug, Default)]
    pub struct MockSink {
        responses: Mutex<VecDeque<Result<String, NotionError>>>,
        calls: Mutex<Vec<(CompanyFacts, NarrativeContent)>>,
    }

    impl MockSink {
        pub fn new() -> Self { Self::default() }

        pub fn push_response(&self, resp: Result<String, NotionError>) {
            self.responses.lock().unwrap().push_back(resp);
        }

        pub fn calls(&self) -> Vec<(CompanyFacts, NarrativeContent)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecordSink for MockSink {
        async fn create_record(&self, facts: &CompanyFacts, narrative: &NarrativeContent) -> Result<String, NotionError> {
            self.calls.lock().unwrap().push((facts.clone(), narrative.clone()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(NotionError::MockQueueEmpty))
        }
    }
}
