//! Span engine
//!
//! Bookkeeping for disabled fragments and hidden elements on top of the
//! Layer 0 text core.
//!
//! ## Modules
//!
//! - `store`: the fragment and hidden-element collections with id counters
//! - `resolver`: content-and-context relocation of a fragment after edits
//! - `protection`: the policy that vetoes edits touching disabled spans
//! - `reconcile`: self-healing of text and offsets after every change

pub mod protection;
pub mod reconcile;
pub mod resolver;
pub mod store;

pub use protection::{evaluate, EditIntent, Key, Modifiers, Mutation, Verdict};
pub use reconcile::{reconcile, relocate, shift_fragments, ReconcileReport};
pub use resolver::{context_around, find_occurrences, resolve_fragment, resolve_offset, Resolution, ResolveRequest};
pub use store::SpanStore;
