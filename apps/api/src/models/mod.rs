pub mod resume;
pub mod user;

pub use resume::ResumeRow;
pub use user::UserRow;
