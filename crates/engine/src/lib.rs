pub mod enrich;
pub mod identifier;
pub mod pipeline;
pub mod present;

pub use enrich::{enrich, EnrichError, EnrichStats};
pub use identifier::{IdentifierKind, IdentifierRecord};
pub use pipeline::{Pipeline, PipelineError};
pub use present::present;
