//! Talking to the University of Wyoming upper air archive.
mod parse;
mod url;

pub use self::parse::parse_page;
pub use self::url::{build_url, Region, DEFAULT_BASE_URL};
