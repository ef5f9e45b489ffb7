use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::path::PathBuf;

use super::class_path_resource::ClassPathResource;
use super::core::{Resource, ResourceError};
use super::file_system_resource_loader::expand_roots;
use super::loader::ResourceLoader;
use super::pattern::find_class_path_resources;
use crate::{impl_box_from, impl_from};

/// ClassPathResourceLoader 配置
#[derive(Debug, Clone, Serialize, Deserialize, SmartDefault)]
#[serde(default)]
pub struct ClassPathResourceLoaderConfig {
    /// 有序的搜索根目录，支持 `~`
    #[default(vec![".".to_string()])]
    pub roots: Vec<String>,
}

/// 类路径加载策略：不带前缀的路径也按搜索根目录解析
#[derive(Debug, Clone)]
pub struct ClassPathResourceLoader {
    roots: Vec<PathBuf>,
}

impl ClassPathResourceLoader {
    pub fn new(config: ClassPathResourceLoaderConfig) -> Self {
        Self {
            roots: expand_roots(&config.roots),
        }
    }
}

impl_from!(ClassPathResourceLoaderConfig => ClassPathResourceLoader);
impl_box_from!(ClassPathResourceLoader => dyn ResourceLoader);

impl ResourceLoader for ClassPathResourceLoader {
    fn class_path_roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn get_resource_by_path(&self, path: &str) -> Box<dyn Resource> {
        Box::new(ClassPathResource::new(path, self.roots.clone()))
    }

    fn get_resources_by_path(
        &self,
        location_pattern: &str,
    ) -> Result<Vec<Box<dyn Resource>>, ResourceError> {
        find_class_path_resources(location_pattern, location_pattern, &self.roots)
    }
}
