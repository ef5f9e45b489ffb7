use std::path::{Path, PathBuf};

use super::class_path_resource::ClassPathResource;
use super::core::{is_http_url, strip_file_prefix, Resource, ResourceError, CLASSPATH_URL_PREFIX};
use super::file_system_resource::FileSystemResource;
use super::pattern::{find_class_path_resources, find_file_resources, is_pattern};
use super::url_resource::UrlResource;

/// 资源加载策略
///
/// 带前缀的位置由默认实现统一处理：
/// - `classpath:` 在 `class_path_roots` 中查找
/// - `file:` 按原样解析为本地路径
/// - `http://` / `https://` 作为 URL 资源
///
/// 其余位置交给各策略的 `get_resource_by_path` / `get_resources_by_path`
pub trait ResourceLoader: Send + Sync {
    /// `classpath:` 位置使用的搜索根目录
    fn class_path_roots(&self) -> &[PathBuf];

    /// 解析不带前缀的路径
    fn get_resource_by_path(&self, path: &str) -> Box<dyn Resource>;

    /// 展开不带前缀的路径模式
    fn get_resources_by_path(
        &self,
        location_pattern: &str,
    ) -> Result<Vec<Box<dyn Resource>>, ResourceError>;

    /// 解析单个位置，不会提前失败
    fn get_resource(&self, location: &str) -> Box<dyn Resource> {
        if let Some(path) = location.strip_prefix(CLASSPATH_URL_PREFIX) {
            return Box::new(ClassPathResource::new(path, self.class_path_roots().to_vec()));
        }
        if let Some(path) = strip_file_prefix(location) {
            return Box::new(FileSystemResource::new(path));
        }
        if is_http_url(location) {
            return Box::new(UrlResource::new(location));
        }
        self.get_resource_by_path(location)
    }

    /// 解析位置，包含通配符时展开为多个资源
    fn get_resources(
        &self,
        location_pattern: &str,
    ) -> Result<Vec<Box<dyn Resource>>, ResourceError> {
        // URL 中的 `?` 是查询串，不是通配符
        if is_http_url(location_pattern) || !is_pattern(location_pattern) {
            return Ok(vec![self.get_resource(location_pattern)]);
        }
        if let Some(path) = location_pattern.strip_prefix(CLASSPATH_URL_PREFIX) {
            return find_class_path_resources(location_pattern, path, self.class_path_roots());
        }
        if let Some(path) = strip_file_prefix(location_pattern) {
            return find_file_resources(location_pattern, Path::new(path));
        }
        self.get_resources_by_path(location_pattern)
    }
}
