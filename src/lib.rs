//! iocx - 基于 XML 定义的轻量依赖注入容器
//!
//! 解析配置文件位置，读取 XML bean 定义，构建并发布负责创建和装配对象的注册表。
//!
//! ## 模块
//!
//! - **cfg**: 按名称选择实现的配置（`TypeOptions` 与 trait 注册表）
//! - **resource**: 资源定位，支持文件系统、类路径、URL 和 glob 模式
//! - **beans**: bean 定义、类型注册表和 `BeanFactory`
//! - **xml**: XML 定义文档的读取
//! - **context**: 可刷新容器与 `XmlApplicationContext`
//!
//! ## 示例
//!
//! ```no_run
//! use iocx::{register_bean_type, XmlApplicationContext};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct ServerConfig {
//!     port: u16,
//! }
//!
//! struct Server {
//!     port: u16,
//! }
//!
//! impl From<ServerConfig> for Server {
//!     fn from(config: ServerConfig) -> Self {
//!         Self { port: config.port }
//!     }
//! }
//!
//! register_bean_type::<Server, ServerConfig>("Server").unwrap();
//! let context = XmlApplicationContext::file_system(&["conf/beans.xml"]).unwrap();
//! let server = context.get_bean_as::<Server>("server").unwrap();
//! println!("listening on {}", server.port);
//! ```

pub mod beans;
pub mod cfg;
pub mod context;
pub mod resource;
pub mod xml;

// 重新导出主要的公共 API
pub use cfg::{create_trait_from_type_options, register_trait, TypeOptions};

pub use resource::{
    register_resource_loaders, ClassPathResourceLoader, FileSystemResourceLoader, Resource,
    ResourceError, ResourceLoader,
};

pub use beans::{
    register_bean_factory, register_bean_type, register_disposable_bean_type, BeanContext,
    BeanDefinition, BeanFactory, BeanInstance, BeanLookup, BeansError, CreatedBean,
    DisposableBean, PropertyValue, Scope,
};

pub use xml::XmlBeanDefinitionReader;

pub use context::{
    ContextError, ContextState, DefinitionLoader, RefreshableContext, XmlApplicationContext,
    XmlApplicationContextConfig,
};
