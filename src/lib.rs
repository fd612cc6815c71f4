pub mod logging;
pub mod raster;
pub mod renderer;
pub mod sim;
pub mod terrain;
pub mod world;
