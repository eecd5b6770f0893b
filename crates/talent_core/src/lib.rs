//! Talent core: pure harvesting data model and traversal decisions.
//!
//! Nothing in this crate performs IO. The engine feeds it parsed server
//! responses and asks it what to do next.
mod cursor;
mod listing;
mod model;
mod options;
mod payload;
mod positions;

pub use cursor::{PageCursor, PageStep, StopReason, DEFAULT_MAX_PAGES};
pub use listing::{parse_page, value_to_string};
pub use model::{CandidateRecord, HarvestedItem, Operation, PageResult, PositionAggregate};
pub use options::{HarvestOptions, DEFAULT_PAGE_SIZE};
pub use payload::{
    decode_resume, encode_resume, ItemPayload, ItemsPayload, LoginReport, LoginUser,
    PositionPayload, PositionsPayload,
};
pub use positions::PositionBook;
