pub mod capture;
pub mod collage;
pub mod selection;
