// bean 类型注册表
//
// 定义中的 `class` 是这里注册的名称，创建 bean 时按名称取出构造函数

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use super::bean_context::BeanContext;

/// 容器持有的 bean 实例
pub type BeanInstance = Arc<dyn Any + Send + Sync>;

/// 销毁回调，容器关闭或刷新时按创建顺序的逆序调用
pub type DestroyCallback = Box<dyn FnOnce() -> Result<()> + Send>;

pub(crate) type BeanConstructor = dyn Fn(&BeanContext) -> Result<CreatedBean> + Send + Sync;

static BEAN_TYPE_REGISTRY: Lazy<RwLock<HashMap<String, Arc<BeanConstructor>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// 需要在容器关闭时释放资源的 bean
pub trait DisposableBean: Send + Sync {
    fn destroy(&self) -> Result<()>;
}

/// 构造函数的产出：实例和可选的销毁回调
pub struct CreatedBean {
    pub instance: BeanInstance,
    pub destroy: Option<DestroyCallback>,
}

impl CreatedBean {
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            instance: value,
            destroy: None,
        }
    }

    pub fn with_destroy<F>(mut self, destroy: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.destroy = Some(Box::new(destroy));
        self
    }
}

impl fmt::Debug for CreatedBean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedBean")
            .field("has_destroy", &self.destroy.is_some())
            .finish()
    }
}

fn insert(type_name: &str, constructor: Arc<BeanConstructor>) -> Result<()> {
    let mut registry = BEAN_TYPE_REGISTRY
        .write()
        .map_err(|_| anyhow!("Failed to acquire write lock"))?;
    registry.insert(type_name.to_string(), constructor);
    Ok(())
}

/// 注册一个由配置构造的 bean 类型
///
/// 属性（或构造参数数组）经 serde 反序列化为 `Config`，引用以 bean 名称的形式出现
///
/// ```ignore
/// register_bean_type::<ConnectionPool, ConnectionPoolConfig>("ConnectionPool")?;
/// ```
pub fn register_bean_type<T, Config>(type_name: &str) -> Result<()>
where
    T: From<Config> + Send + Sync + 'static,
    Config: DeserializeOwned + 'static,
{
    insert(
        type_name,
        Arc::new(|ctx: &BeanContext| {
            let config: Config = ctx.config()?;
            Ok(CreatedBean::new(T::from(config)))
        }),
    )
}

/// 与 `register_bean_type` 相同，并在销毁时调用 `DisposableBean::destroy`
pub fn register_disposable_bean_type<T, Config>(type_name: &str) -> Result<()>
where
    T: From<Config> + DisposableBean + 'static,
    Config: DeserializeOwned + 'static,
{
    insert(
        type_name,
        Arc::new(|ctx: &BeanContext| {
            let config: Config = ctx.config()?;
            let instance = Arc::new(T::from(config));
            let target = instance.clone();
            Ok(CreatedBean::from_arc(instance).with_destroy(move || target.destroy()))
        }),
    )
}

/// 注册自定义构造闭包，可以通过 `BeanContext` 取到引用的 bean 实例
pub fn register_bean_factory<F>(type_name: &str, factory: F) -> Result<()>
where
    F: Fn(&BeanContext) -> Result<CreatedBean> + Send + Sync + 'static,
{
    insert(type_name, Arc::new(factory))
}

pub(crate) fn bean_constructor(type_name: &str) -> Option<Arc<BeanConstructor>> {
    BEAN_TYPE_REGISTRY
        .read()
        .ok()
        .and_then(|registry| registry.get(type_name).cloned())
}

pub fn is_bean_type_registered(type_name: &str) -> bool {
    bean_constructor(type_name).is_some()
}

/// 已注册的类型名称（排序后返回）
pub fn registered_bean_types() -> Vec<String> {
    let Ok(registry) = BEAN_TYPE_REGISTRY.read() else {
        return Vec::new();
    };
    let mut names: Vec<String> = registry.keys().cloned().collect();
    names.sort();
    names
}
