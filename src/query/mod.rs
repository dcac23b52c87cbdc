//! Query descriptors: parsed operations, index selection and enrichment

mod enrich;
mod operation;
mod selector;
mod text;

pub use enrich::{enrich, EnrichedOperation, Enricher};
pub use operation::{
    requires_index, ColumnDef, Operation, ParsedOperation, Predicate, INDEX_REQUIRING_OPS,
};
pub use selector::{IndexSelector, SelectorPolicy};
pub use text::QueryText;
