use std::io::{Cursor, Read};
use std::sync::Arc;

use super::core::{Resource, ResourceError};

/// 内存中的资源，常用于直接提供预构建的配置内容
#[derive(Debug, Clone)]
pub struct ByteArrayResource {
    description: String,
    bytes: Arc<[u8]>,
}

impl ByteArrayResource {
    pub fn new(description: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            description: description.into(),
            bytes: Arc::from(bytes.into()),
        }
    }
}

impl Resource for ByteArrayResource {
    fn description(&self) -> String {
        format!("byte array resource [{}]", self.description)
    }

    fn exists(&self) -> bool {
        true
    }

    fn open(&self) -> Result<Box<dyn Read + Send>, ResourceError> {
        Ok(Box::new(Cursor::new(self.bytes.to_vec())))
    }

    fn create_relative(&self, relative_path: &str) -> Result<Box<dyn Resource>, ResourceError> {
        Err(ResourceError::resolution(
            relative_path,
            format!("cannot create a relative resource for {}", self.description()),
        ))
    }
}
