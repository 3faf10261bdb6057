pub mod decode;
pub mod filter;
pub mod raster;
