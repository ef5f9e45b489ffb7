// glob 风格位置模式的展开

use std::path::{Path, PathBuf};

use super::class_path_resource::ClassPathResource;
use super::core::{Resource, ResourceError};
use super::file_system_resource::FileSystemResource;

/// 位置是否包含 glob 通配符
pub fn is_pattern(location: &str) -> bool {
    location.chars().any(|c| matches!(c, '*' | '?' | '['))
}

/// 展开文件系统模式，结果按路径排序，只保留普通文件
pub(crate) fn find_file_resources(
    location: &str,
    pattern: &Path,
) -> Result<Vec<Box<dyn Resource>>, ResourceError> {
    let files = glob_files(location, pattern)?;
    if files.is_empty() {
        log::warn!("location pattern '{}' matched no resources", location);
    }
    Ok(files
        .into_iter()
        .map(|path| Box::new(FileSystemResource::new(path)) as Box<dyn Resource>)
        .collect())
}

/// 在每个类路径根目录下展开模式，按根目录顺序拼接
pub(crate) fn find_class_path_resources(
    location: &str,
    pattern: &str,
    roots: &[PathBuf],
) -> Result<Vec<Box<dyn Resource>>, ResourceError> {
    let pattern = pattern.strip_prefix('/').unwrap_or(pattern);
    let mut resources: Vec<Box<dyn Resource>> = Vec::new();

    for root in roots {
        // 根目录本身可能含有通配符字符，需要转义
        let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
        let full_pattern = Path::new(&escaped_root).join(pattern);
        for file in glob_files(location, &full_pattern)? {
            let relative = file
                .strip_prefix(root)
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_else(|_| file.to_string_lossy().to_string());
            resources.push(Box::new(ClassPathResource::in_root(&relative, root.clone())));
        }
    }

    if resources.is_empty() {
        log::warn!("class path pattern '{}' matched no resources", location);
    }
    Ok(resources)
}

fn glob_files(location: &str, pattern: &Path) -> Result<Vec<PathBuf>, ResourceError> {
    let pattern = pattern
        .to_str()
        .ok_or_else(|| ResourceError::resolution(location, "pattern is not valid UTF-8"))?;
    let paths = glob::glob(pattern).map_err(|e| ResourceError::resolution(location, e))?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            let description = format!("file [{}]", e.path().display());
            ResourceError::io(description, e.into_error())
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
