//! Batch orchestrator.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::codec::AudioFormat;
use crate::delivery::{DeliveryMode, DeliveryOutcome, DeliveryRouter};
use crate::gateway::SynthesisGateway;
use crate::request::BatchRequest;
use crate::{Error, ErrorContext, Result};

/// Where each item of a batch goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchDelivery {
    /// Save item `i` (1-based) as `output_<i>.<default format>` in the directory.
    Directory(PathBuf),
    /// Save item `i` to `paths[i]`; must match the batch length.
    Paths(Vec<PathBuf>),
    /// Schedule playback of every item in order.
    Play,
    ReturnInline { format: Option<AudioFormat> },
}

/// Per-item outcomes, index-aligned with the originating batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub items: Vec<Result<DeliveryOutcome>>,
    pub execution_time: Duration,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn all_succeeded(&self) -> bool {
        self.items.iter().all(|r| r.is_ok())
    }

    pub fn success_count(&self) -> usize {
        self.items.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    /// `(index, error)` for every failed item.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &Error)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().err().map(|e| (i, e)))
    }

    pub fn saved_paths(&self) -> Vec<&Path> {
        self.items
            .iter()
            .filter_map(|r| r.as_ref().ok().and_then(|o| o.saved_path()))
            .collect()
    }
}

pub struct BatchOrchestrator<'a> {
    gateway: &'a dyn SynthesisGateway,
    router: &'a DeliveryRouter,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(gateway: &'a dyn SynthesisGateway, router: &'a DeliveryRouter) -> Self {
        Self { gateway, router }
    }

    pub async fn run(
        &self,
        batch: &BatchRequest,
        delivery: &BatchDelivery,
    ) -> Result<BatchOutcome> {
        let modes = self.plan(batch.len(), delivery)?;
        let start = Instant::now();

        debug!(items = batch.len(), "submitting batch");
        let results = self.gateway.synthesize_batch(batch).await?;
        if results.len() != batch.len() {
            return Err(Error::protocol_with_context(
                "batch response does not match the request",
                ErrorContext::new()
                    .with_field_path("results")
                    .with_details(format!(
                        "expected {} results, got {}",
                        batch.len(),
                        results.len()
                    ))
                    .with_source("batch"),
            ));
        }

        let mut items = Vec::with_capacity(results.len());
        for (i, (result, mode)) in results.iter().zip(&modes).enumerate() {
            let outcome = self.router.deliver(result, mode);
            if let Err(e) = &outcome {
                warn!(index = i, error = %e, "batch item delivery failed");
            }
            items.push(outcome);
        }

        let outcome = BatchOutcome {
            items,
            execution_time: start.elapsed(),
        };
        info!(
            items = outcome.len(),
            failed = outcome.failure_count(),
            "batch delivered"
        );
        Ok(outcome)
    }

    /// One delivery mode per item, or an error before anything is sent.
    fn plan(&self, len: usize, delivery: &BatchDelivery) -> Result<Vec<DeliveryMode>> {
        let modes = match delivery {
            BatchDelivery::Directory(dir) => {
                let ext = self.router.codec().default_format().extension().to_string();
                (1..=len)
                    .map(|i| DeliveryMode::Save(dir.join(format!("output_{}.{}", i, ext))))
                    .collect()
            }
            BatchDelivery::Paths(paths) => {
                if paths.len() != len {
                    return Err(Error::invalid_parameter_with_context(
                        format!(
                            "{} destination paths given for {} batch items",
                            paths.len(),
                            len
                        ),
                        ErrorContext::new().with_field_path("paths"),
                    ));
                }
                paths.iter().cloned().map(DeliveryMode::Save).collect()
            }
            BatchDelivery::Play => vec![DeliveryMode::Play; len],
            BatchDelivery::ReturnInline { format } => vec![
                DeliveryMode::ReturnInline {
                    format: format.clone()
                };
                len
            ],
        };
        Ok(modes)
    }
}
