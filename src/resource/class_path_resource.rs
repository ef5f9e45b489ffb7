use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::PathBuf;

use super::core::{apply_relative_path, Resource, ResourceError};

/// 类路径资源：在一组有序的搜索根目录中查找相对路径
///
/// 第一个包含该文件的根目录胜出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPathResource {
    path: String,
    roots: Vec<PathBuf>,
}

impl ClassPathResource {
    pub fn new(path: &str, roots: Vec<PathBuf>) -> Self {
        // 类路径总是相对于根目录
        let path = path.strip_prefix('/').unwrap_or(path).to_string();
        Self { path, roots }
    }

    /// 固定在单个根目录下的资源，用于模式展开的结果
    pub fn in_root(path: &str, root: PathBuf) -> Self {
        Self::new(path, vec![root])
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn locate(&self) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(&self.path))
            .find(|candidate| candidate.is_file())
    }
}

impl Resource for ClassPathResource {
    fn description(&self) -> String {
        format!("class path resource [{}]", self.path)
    }

    fn exists(&self) -> bool {
        self.locate().is_some()
    }

    fn open(&self) -> Result<Box<dyn Read + Send>, ResourceError> {
        let path = self.locate().ok_or_else(|| {
            ResourceError::io(
                self.description(),
                std::io::Error::new(
                    ErrorKind::NotFound,
                    format!("not found under any of {} class path roots", self.roots.len()),
                ),
            )
        })?;
        let file = File::open(&path).map_err(|e| ResourceError::io(self.description(), e))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn create_relative(&self, relative_path: &str) -> Result<Box<dyn Resource>, ResourceError> {
        Ok(Box::new(ClassPathResource::new(
            &apply_relative_path(&self.path, relative_path),
            self.roots.clone(),
        )))
    }

    fn file_path(&self) -> Option<PathBuf> {
        self.locate()
    }
}
