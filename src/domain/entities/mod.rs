//! Domain entity definitions.

mod image;

pub use image::{ImageFormat, ImageResult, ImageStatus, LoadTicket, RawImage};
