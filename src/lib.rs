//! Monthly timesheet ("folha de ponto") generation for municipal education staff.

pub mod annotation;
pub mod batch;
pub mod classification;
pub mod config;
pub mod db;
pub mod error;
pub mod holiday;
pub mod hours;
pub mod month;
pub mod pdf;
pub mod server;
pub mod template;
pub mod timesheet_data;

pub use error::{Result, TimesheetError};
