use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use thiserror::Error;

/// 显式类路径前缀，按加载器的搜索根目录解析
pub const CLASSPATH_URL_PREFIX: &str = "classpath:";

/// 显式文件前缀，按原样解析路径（绝对路径不会被剥离前导分隔符）
pub const FILE_URL_PREFIX: &str = "file:";

/// 资源相关错误
#[derive(Error, Debug)]
pub enum ResourceError {
    /// 位置无法映射为资源（占位符无法解析、模式非法等）
    #[error("cannot resolve location '{location}': {reason}")]
    Resolution { location: String, reason: String },

    #[error("I/O error reading {description}: {source}")]
    Io {
        description: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error fetching {url}: {message}")]
    Http { url: String, message: String },
}

impl ResourceError {
    pub fn resolution(location: impl Into<String>, reason: impl ToString) -> Self {
        ResourceError::Resolution {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(description: impl Into<String>, source: std::io::Error) -> Self {
        ResourceError::Io {
            description: description.into(),
            source,
        }
    }
}

/// 可读取内容的资源句柄
///
/// 创建资源本身不会失败，读取失败在 `open` 时才以 I/O 错误的形式出现
pub trait Resource: Send + Sync + fmt::Debug {
    /// 用于日志和错误信息的描述，例如 `file [/etc/app/beans.xml]`
    fn description(&self) -> String;

    fn exists(&self) -> bool;

    /// 打开一个流式读取器
    fn open(&self) -> Result<Box<dyn Read + Send>, ResourceError>;

    /// 相对当前资源创建新资源，用于 `<import>`
    fn create_relative(&self, relative_path: &str) -> Result<Box<dyn Resource>, ResourceError>;

    /// 资源对应的本地文件路径（如果有）
    fn file_path(&self) -> Option<PathBuf> {
        None
    }
}

/// 把相对路径拼到 `path` 所在目录下
///
/// `a/b/beans.xml` + `common.xml` => `a/b/common.xml`
pub(crate) fn apply_relative_path(path: &str, relative_path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => {
            let mut new_path = path[..idx].to_string();
            if !relative_path.starts_with('/') {
                new_path.push('/');
            }
            new_path.push_str(relative_path);
            new_path
        }
        None => relative_path.to_string(),
    }
}

/// 判断位置是否为 http(s) URL
pub(crate) fn is_http_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// 去掉 `file:` / `file://` 前缀，返回其后的路径
pub(crate) fn strip_file_prefix(location: &str) -> Option<&str> {
    let rest = location.strip_prefix(FILE_URL_PREFIX)?;
    // file:///a/b.xml 与 file:/a/b.xml 等价
    Some(rest.strip_prefix("//").unwrap_or(rest))
}
