pub mod config;
pub mod locate;
pub mod logging;
pub mod normalize;
pub mod timeline;
