use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::{apply_relative_path, Resource, ResourceError};

/// 本地文件资源
///
/// 相对路径在打开时按进程当前工作目录解析
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemResource {
    path: PathBuf,
}

impl FileSystemResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for FileSystemResource {
    fn description(&self) -> String {
        // 文件存在时展示规范化后的绝对路径，dunce 避免 Windows 上的 \\?\ 前缀
        let shown = dunce::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        format!("file [{}]", shown.display())
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn open(&self) -> Result<Box<dyn Read + Send>, ResourceError> {
        let file = File::open(&self.path).map_err(|e| ResourceError::io(self.description(), e))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn create_relative(&self, relative_path: &str) -> Result<Box<dyn Resource>, ResourceError> {
        let base = self.path.to_string_lossy();
        Ok(Box::new(FileSystemResource::new(apply_relative_path(
            &base,
            relative_path,
        ))))
    }

    fn file_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_open_and_read() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("beans.xml");
        fs::write(&path, "<beans/>")?;

        let resource = FileSystemResource::new(&path);
        assert!(resource.exists());

        let mut content = String::new();
        resource.open()?.read_to_string(&mut content)?;
        assert_eq!(content, "<beans/>");
        assert!(resource.description().contains("beans.xml"));
        Ok(())
    }

    #[test]
    fn test_missing_file_fails_on_open() {
        let resource = FileSystemResource::new("definitely/not/here.xml");
        assert!(!resource.exists());

        match resource.open() {
            Err(ResourceError::Io { description, .. }) => {
                assert!(description.contains("here.xml"))
            }
            other => panic!("expected I/O error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_create_relative() -> Result<()> {
        let resource = FileSystemResource::new("conf/app/beans.xml");
        let relative = resource.create_relative("common.xml")?;
        assert_eq!(relative.file_path(), Some(PathBuf::from("conf/app/common.xml")));
        Ok(())
    }
}
