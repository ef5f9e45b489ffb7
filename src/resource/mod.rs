//! resource 模块 - 资源定位
//!
//! 把位置字符串映射为可读取的资源，支持文件系统、类路径和 URL 三种解析方式，
//! 以及 glob 风格的位置模式

pub mod byte_array_resource;
pub mod class_path_resource;
pub mod class_path_resource_loader;
pub mod core;
pub mod file_system_resource;
pub mod file_system_resource_loader;
pub mod loader;
pub mod pattern;
pub mod register;
pub mod url_resource;

pub use byte_array_resource::ByteArrayResource;
pub use class_path_resource::ClassPathResource;
pub use class_path_resource_loader::{ClassPathResourceLoader, ClassPathResourceLoaderConfig};
pub use self::core::{Resource, ResourceError, CLASSPATH_URL_PREFIX, FILE_URL_PREFIX};
pub use file_system_resource::FileSystemResource;
pub use file_system_resource_loader::{FileSystemResourceLoader, FileSystemResourceLoaderConfig};
pub use loader::ResourceLoader;
pub use pattern::is_pattern;
pub use register::register_resource_loaders;
pub use url_resource::UrlResource;
