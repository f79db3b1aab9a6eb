//! Wire types shared by the builder client and the API server.

pub mod auth;
pub mod resume;

pub use auth::{AuthResponse, AuthSession, SigninRequest, SignupRequest, UserInfo};
pub use resume::{
    EducationEntry, ExperienceEntry, MissingFields, ProjectEntry, ResumePatch, ResumeRecord,
    DEFAULT_TEMPLATE_ID,
};
