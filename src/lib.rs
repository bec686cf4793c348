//! Download, archive, grid and view radiosonde soundings from the University of Wyoming upper
//! air archive.

//
// Public API
//
pub use errors::RaobErr;
pub use sounding::{Level, LevelColumn, Sounding, SoundingIndex};
pub use station::{StationInfo, StationNumber};
pub use table_printer::TablePrinter;
pub use util::{bail, default_root, init_logging, obs_times, parse_date_string};

pub mod archive;
pub mod grid;
pub mod view;
pub mod wyoming;

//
// Internal only
//
mod errors;
mod sounding;
mod station;
mod table_printer;
mod util;
