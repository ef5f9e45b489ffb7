//! 注册所有 ResourceLoader 实现

use anyhow::Result;

use crate::cfg::register_trait;

use super::{
    ClassPathResourceLoader, ClassPathResourceLoaderConfig, FileSystemResourceLoader,
    FileSystemResourceLoaderConfig, ResourceLoader,
};

/// 注册内置的资源加载策略
///
/// # 注册的类型
/// - `FileSystemResourceLoader` - 文件系统策略
/// - `ClassPathResourceLoader` - 类路径策略
///
/// # 示例
/// ```
/// use iocx::cfg::{create_trait_from_type_options, TypeOptions};
/// use iocx::resource::{register_resource_loaders, ResourceLoader};
///
/// register_resource_loaders().unwrap();
/// let opts = TypeOptions::from_json(r#"{ type: "FileSystemResourceLoader" }"#).unwrap();
/// let loader: Box<dyn ResourceLoader> = create_trait_from_type_options(&opts).unwrap();
/// ```
pub fn register_resource_loaders() -> Result<()> {
    register_trait::<FileSystemResourceLoader, dyn ResourceLoader, FileSystemResourceLoaderConfig>(
        "FileSystemResourceLoader",
    )?;
    register_trait::<ClassPathResourceLoader, dyn ResourceLoader, ClassPathResourceLoaderConfig>(
        "ClassPathResourceLoader",
    )?;

    Ok(())
}
