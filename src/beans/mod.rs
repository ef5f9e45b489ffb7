//! beans 模块 - 定义注册表
//!
//! 保存 bean 定义、别名和单例缓存，按定义创建并装配对象。
//! 定义中的 `class` 对应 `register_bean_type` 等函数注册的类型名称

pub mod bean_context;
pub mod candidate;
pub mod definition;
pub mod error;
pub mod factory;
pub mod lookup;
pub mod type_registry;

pub use bean_context::BeanContext;
pub use candidate::{AllCandidatesResolver, AutowireCandidateResolver, SimpleAutowireCandidateResolver};
pub use definition::{BeanDefinition, PropertyValue, Scope};
pub use error::BeansError;
pub use factory::BeanFactory;
pub use lookup::BeanLookup;
pub use type_registry::{
    is_bean_type_registered, register_bean_factory, register_bean_type,
    register_disposable_bean_type, registered_bean_types, BeanInstance, CreatedBean,
    DestroyCallback, DisposableBean,
};
