pub mod assignment;
pub mod certificate;
pub mod course;
pub mod template;
pub mod user;
