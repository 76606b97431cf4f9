//! Internship placement workflow: posting review, applications, offers, and withdrawals for
//! students, company representatives, and career-center staff.

pub mod config;
pub mod error;
pub mod storage;
pub mod telemetry;
pub mod workflows;

pub use error::AppError;
