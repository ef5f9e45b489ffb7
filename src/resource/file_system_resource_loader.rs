use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::path::{Path, PathBuf};

use super::core::{Resource, ResourceError};
use super::file_system_resource::FileSystemResource;
use super::loader::ResourceLoader;
use super::pattern::find_file_resources;
use crate::{impl_box_from, impl_from};

/// FileSystemResourceLoader 配置
#[derive(Debug, Clone, Serialize, Deserialize, SmartDefault)]
#[serde(default)]
pub struct FileSystemResourceLoaderConfig {
    /// `classpath:` 位置的搜索根目录，支持 `~`
    #[default(vec![".".to_string()])]
    pub class_path_roots: Vec<String>,
}

/// 文件系统加载策略
///
/// 不带前缀的路径总是相对进程当前工作目录解析。以 `/` 开头的路径会被剥离
/// 恰好一个前导分隔符，`/conf/beans.xml` 与 `conf/beans.xml` 等价。
/// 需要绝对路径时使用 `file:` 前缀，例如 `file:/etc/app/beans.xml`
#[derive(Debug, Clone)]
pub struct FileSystemResourceLoader {
    class_path_roots: Vec<PathBuf>,
}

impl FileSystemResourceLoader {
    pub fn new(config: FileSystemResourceLoaderConfig) -> Self {
        Self {
            class_path_roots: expand_roots(&config.class_path_roots),
        }
    }
}

impl Default for FileSystemResourceLoader {
    fn default() -> Self {
        Self::new(FileSystemResourceLoaderConfig::default())
    }
}

impl_from!(FileSystemResourceLoaderConfig => FileSystemResourceLoader);
impl_box_from!(FileSystemResourceLoader => dyn ResourceLoader);

/// 剥离恰好一个前导分隔符
fn strip_leading_separator(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

pub(crate) fn expand_roots(roots: &[String]) -> Vec<PathBuf> {
    roots
        .iter()
        .map(|root| PathBuf::from(shellexpand::tilde(root).to_string()))
        .collect()
}

impl ResourceLoader for FileSystemResourceLoader {
    fn class_path_roots(&self) -> &[PathBuf] {
        &self.class_path_roots
    }

    fn get_resource_by_path(&self, path: &str) -> Box<dyn Resource> {
        Box::new(FileSystemResource::new(strip_leading_separator(path)))
    }

    fn get_resources_by_path(
        &self,
        location_pattern: &str,
    ) -> Result<Vec<Box<dyn Resource>>, ResourceError> {
        find_file_resources(
            location_pattern,
            Path::new(strip_leading_separator(location_pattern)),
        )
    }
}
