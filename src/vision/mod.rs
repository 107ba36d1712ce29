//! Vision and image processing module.
//!
//! Uploaded images and images returned by the service are attacker
//! influenced. Everything that turns raw bytes into an image goes through
//! [`decode_image`], which sniffs the format and bounds the decoder.
//!
//! # Submodules
//!
//! - `models`: Image formats, the decoded image type and size limits.
//! - `decode`: Bounded decoding of raw bytes.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod decode;
pub mod models;

pub use decode::decode_image;
pub use models::{DecodedImage, ImageFormat};
