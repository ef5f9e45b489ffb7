use thiserror::Error;

use crate::beans::BeansError;

/// 容器生命周期相关错误
#[derive(Error, Debug)]
pub enum ContextError {
    /// 定义无法读取或无法解析，刷新失败
    #[error("I/O or parse error loading bean definitions for {display_name}: {source}")]
    Initialization {
        display_name: String,
        #[source]
        source: BeansError,
    },

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error(transparent)]
    Beans(#[from] BeansError),

    #[error("invalid context configuration: {0}")]
    Configuration(String),
}

impl ContextError {
    /// 资源和解析错误包装为 `Initialization`，其余原样传递
    pub(crate) fn from_refresh(display_name: &str, err: BeansError) -> Self {
        if err.is_definition_error() {
            ContextError::Initialization {
                display_name: display_name.to_string(),
                source: err,
            }
        } else {
            ContextError::Beans(err)
        }
    }
}
