pub mod quads;
