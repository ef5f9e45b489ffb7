use std::sync::Arc;

use super::error::BeansError;
use super::type_registry::BeanInstance;

/// 按名称查找 bean 的来源，父容器通过它接入查找链
///
/// 查找链按顺序询问，第一个返回实例的来源胜出，`NoSuchBean` 表示继续询问下一个
pub trait BeanLookup: Send + Sync {
    fn contains_bean(&self, name: &str) -> bool;

    fn get_bean(&self, name: &str) -> Result<BeanInstance, BeansError>;
}

impl<L: BeanLookup + ?Sized> BeanLookup for Arc<L> {
    fn contains_bean(&self, name: &str) -> bool {
        (**self).contains_bean(name)
    }

    fn get_bean(&self, name: &str) -> Result<BeanInstance, BeansError> {
        (**self).get_bean(name)
    }
}
