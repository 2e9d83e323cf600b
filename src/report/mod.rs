mod render;

pub use render::Report;
