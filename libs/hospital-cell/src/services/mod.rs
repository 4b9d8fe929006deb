pub mod directory;
pub mod locator;
