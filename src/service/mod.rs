pub mod cost_distributor;
pub mod document_service;
pub mod export;

pub use cost_distributor::{distribute, distribute_batch, distribute_with_summary, Distribution, DistributionRequest};
pub use document_service::DocumentService;
pub use export::{ExportFormat, Rendered};
