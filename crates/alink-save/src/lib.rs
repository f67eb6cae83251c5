//! Save pipeline for edited asset models.
//!
//! A save writes the whole model back in one staged transaction on the
//! store. It first plans the writes ([`plan_writes`]), one per logical
//! subtree, then issues them strictly in sequence and finalizes. Nothing
//! becomes visible unless every write and the finalize succeed.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # async fn demo(
//! #     store: std::sync::Arc<alink_store::InMemoryContentStore>,
//! #     model: alink_model::AssetModel,
//! # ) -> Result<(), alink_save::SaveError> {
//! use alink_save::SaveOrchestrator;
//!
//! let mut orchestrator = SaveOrchestrator::new(store, "ilib_site", "iq__site");
//! let report = orchestrator.save(&model).await?;
//! println!("committed {}", report.commit.version_hash);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod state;

pub use error::{SaveError, SaveResult};
pub use orchestrator::{SaveOrchestrator, SaveReport, StepRecord};
pub use plan::{plan_writes, WriteStep};
pub use state::SaveState;
