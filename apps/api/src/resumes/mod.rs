//! Bearer-authenticated CRUD over a caller's resumes.

pub mod handlers;
