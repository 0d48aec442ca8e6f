mod block;
mod content;
mod ids;
mod record;

pub use block::{Block, BlockKind};
pub use content::{BODY_FIELD, Content};
pub use ids::RecordId;
pub use record::{PropertyValue, Record, RecordBuilder};
