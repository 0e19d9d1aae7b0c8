mod common;
mod subset_long;
mod subset_wide;

pub use subset_long::SubsetLongParser;
pub use subset_wide::SubsetWideParser;

pub(crate) use common::{
    parse_calendar_date, parse_modis_date, parse_optional_f64, parse_pixel_id, parse_scale,
};
