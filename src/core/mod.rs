pub mod compass;
pub mod mapper;
pub mod normalize;
pub mod transform;
