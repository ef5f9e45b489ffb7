//! cfg 模块 - 可配置的实现选择
//!
//! 通过 `TypeOptions { type, options }` 在运行时选择某个 trait 的实现，
//! 配置可以来自 JSON5、YAML 或 TOML

pub mod macros;
pub mod registry;
pub mod type_options;

pub use registry::{create_trait_from_type_options, register_trait, registered_names};
pub use type_options::TypeOptions;
