mod image;
mod json;

pub use self::image::{encode_png, write_png, write_preview};
pub use self::json::write_report;
