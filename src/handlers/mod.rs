pub mod health;
pub mod posts;
pub mod reactions;
pub mod uploads;
pub mod users;
pub mod video_info;

pub use health::*;
pub use posts::*;
pub use reactions::*;
pub use uploads::*;
pub use users::*;
pub use video_info::*;
