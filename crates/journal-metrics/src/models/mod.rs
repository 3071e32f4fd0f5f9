//! Data models for works registry and scholarly graph entities.
//!
//! Upstream payloads are decoded once at the API boundary into optional typed
//! records. Registry fields follow the registry's kebab-case naming; graph
//! fields are snake_case as served.

mod de;
mod graph;
mod identifiers;
mod period;
mod registry;
mod work;

pub use graph::{AuthorInfo, Authorship, Concept, GraphWork, Institution, Location, OpenAccess, Venue};
pub use identifiers::{doi_prefix, normalize_doi, normalize_issn};
pub use period::{MAX_YEAR, MIN_YEAR, Period, parse_period};
pub use registry::{DateParts, Reference, RegistryAuthor, RegistryWork};
pub use work::{CitingEdge, ValidatedWorks, WorkRecord, parse_iso_date, validate_registry_items};
