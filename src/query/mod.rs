//! Generic paged queries over a document collection
//!
//! ```ignore
//! let request = PageRequest::new(Filter::new().gte("area_id", 10), PageParam::new(2, 10))
//!     .sort(SortSpec::new().asc("area_id"))
//!     .projection(Projection::fields(PlayerSummary::projected_fields()));
//!
//! let page = find_with_page(&collection, &request, PlayerSummary::default).await?;
//! ```

pub mod decode;
pub mod filter;
pub mod page;

pub use decode::DecodeTarget;
pub use filter::{Filter, Op, Predicate};
pub use page::{
    find_one, find_with_page, PageOptions, PageParam, PageRequest, PageResult, Projection,
    SortDirection, SortSpec,
};
