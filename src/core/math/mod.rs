mod mat4;
mod vec2;

pub use mat4::Mat4;
pub use vec2::Vec2;
