pub mod composite;
pub mod compositor;
pub mod surface;
pub mod text;
