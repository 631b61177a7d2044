mod summary;
mod user;

pub use summary::{SummaryFormat, SummaryResult, VideoDetails};
pub use user::User;
