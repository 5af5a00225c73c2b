//! Data Transfer Objects for REST request/response serialization.
//!
//! Query parameters arrive as strings; numeric fields treat a blank value
//! as absent and reject anything that is not a number.

pub mod admin_dto;
pub mod animation_dto;
pub mod common_dto;
pub mod control_dto;
pub mod sequence_dto;

pub use admin_dto::*;
pub use animation_dto::*;
pub use common_dto::*;
pub use control_dto::*;
pub use sequence_dto::*;
