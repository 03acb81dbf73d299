mod vec2d;

pub use vec2d::{MAP_HEIGHT, MAP_WIDTH, Vec2D};

#[cfg(test)]
mod tests;
