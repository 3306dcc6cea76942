//! Pixel routines behind the admin editor: loading image references,
//! the crop tool and the dominant-color sampler.

pub mod color;
pub mod cropper;
pub mod source;

pub use color::{DEFAULT_COLOR, estimate_dominant_color, is_light_color, lighten_color};
pub use cropper::{CropParams, CropShape};
pub use source::{encode_png_data_uri, load_image};
