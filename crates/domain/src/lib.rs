#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod exercise;
mod history;
mod name;
mod service;
mod set;
mod share;
mod summary;
mod template;
mod timer;
mod workout;

pub use error::*;
pub use exercise::*;
pub use history::*;
pub use name::*;
pub use service::*;
pub use set::*;
pub use share::*;
pub use summary::*;
pub use template::*;
pub use timer::*;
pub use workout::*;
