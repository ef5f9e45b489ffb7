use thiserror::Error;

use crate::resource::ResourceError;

/// 定义加载和 bean 创建相关错误
#[derive(Error, Debug)]
pub enum BeansError {
    /// 位置解析失败或读取失败
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// 文档格式错误或结构校验失败
    #[error("invalid bean definition document {resource}: {message}")]
    Parse { resource: String, message: String },

    #[error(
        "cannot register bean definition '{name}' from {resource}: \
         a definition from {existing} is already bound and overriding is disabled"
    )]
    DuplicateDefinition {
        name: String,
        resource: String,
        existing: String,
    },

    #[error("no bean named '{name}' is defined")]
    NoSuchBean { name: String },

    #[error("expected a single bean of type '{type_name}' but found {}: {candidates:?}", .candidates.len())]
    NoUniqueBean {
        type_name: String,
        candidates: Vec<String>,
    },

    #[error("bean '{name}' has type '{type_name}' which is not registered")]
    UnknownType { name: String, type_name: String },

    #[error("error creating bean '{name}': {message}")]
    BeanCreation { name: String, message: String },

    /// 工厂已销毁，不再创建新的 bean
    #[error("cannot create bean '{name}': its bean factory has been destroyed")]
    CreationNotAllowed { name: String },

    #[error("circular reference detected: {}", .chain.join(" -> "))]
    CircularReference { chain: Vec<String> },

    #[error("bean '{name}' is not of the requested type {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
}

impl BeansError {
    pub fn parse(resource: impl Into<String>, message: impl ToString) -> Self {
        BeansError::Parse {
            resource: resource.into(),
            message: message.to_string(),
        }
    }

    pub fn creation(name: impl Into<String>, message: impl ToString) -> Self {
        BeansError::BeanCreation {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// 定义本身有问题（无法读取或无法解析），而不是对象创建出错
    pub fn is_definition_error(&self) -> bool {
        matches!(self, BeansError::Resource(_) | BeansError::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_definition_error() {
        let io = BeansError::from(ResourceError::io(
            "file [beans.xml]",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        ));
        assert!(io.is_definition_error());
        assert!(BeansError::parse("file [beans.xml]", "bad").is_definition_error());
        assert!(!BeansError::NoSuchBean { name: "a".into() }.is_definition_error());
    }

    #[test]
    fn test_messages() {
        let err = BeansError::CircularReference {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "circular reference detected: a -> b -> a");

        let err = BeansError::NoUniqueBean {
            type_name: "DataSource".into(),
            candidates: vec!["primary".into(), "replica".into()],
        };
        assert!(err.to_string().contains("found 2"));
    }
}
