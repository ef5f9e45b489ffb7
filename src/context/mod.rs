//! context 模块 - 容器生命周期
//!
//! `RefreshableContext` 负责刷新、发布和关闭注册表，
//! `XmlApplicationContext` 在其上提供基于 XML 文档的构造方式

pub mod error;
pub mod refreshable;
pub mod xml_context;

pub use error::ContextError;
pub use refreshable::{ContextState, DefinitionLoader, RefreshableContext};
pub use xml_context::{
    resolve_location, XmlApplicationContext, XmlApplicationContextConfig, XmlDefinitionLoader,
};
