//! # Batch synthesis
//!
//! Fans a list of texts into one batch call against the service, then fans the
//! index-aligned results back out to per-item delivery.
//!
//! ## Overview
//!
//! - The whole batch is submitted as a single gateway call, never one call per
//!   item.
//! - Structural problems (empty batch, destination list of the wrong length)
//!   are rejected before any network traffic.
//! - A network-level failure aborts the batch: there are no partial results.
//! - A delivery failure for one item is recorded in that item's slot and the
//!   remaining items are still delivered.
//!
//! ## Example
//!
//! ```rust,no_run
//! use supertonic_client::batch::{BatchDelivery, BatchOrchestrator};
//! # async fn demo(
//! #     gateway: &dyn supertonic_client::gateway::SynthesisGateway,
//! #     router: &supertonic_client::delivery::DeliveryRouter,
//! #     batch: &supertonic_client::request::BatchRequest,
//! # ) -> supertonic_client::Result<()> {
//! let outcome = BatchOrchestrator::new(gateway, router)
//!     .run(batch, &BatchDelivery::Directory("output".into()))
//!     .await?;
//! println!("{} of {} saved", outcome.success_count(), outcome.len());
//! # Ok(())
//! # }
//! ```

mod orchestrator;

pub use orchestrator::{BatchDelivery, BatchOrchestrator, BatchOutcome};
