pub mod complaint;
pub mod role;
pub mod round;
pub mod scoring;
pub mod timeline;

pub use complaint::{ComplaintStatus, ComplaintType};
pub use role::Role;
pub use round::{Readiness, Round, RoundBoard, RoundPolicy, RoundStatus};
pub use timeline::SlotCategory;
