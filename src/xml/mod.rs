//! xml 模块 - 定义读取
//!
//! 用 quick-xml 流式读取 `<beans>` 文档，解释为 bean 定义后注册到 `BeanFactory`

pub mod definition_parser;
pub mod document;
pub mod reader;

pub use definition_parser::{parse_document, DocumentEntry};
pub use document::Element;
pub use reader::XmlBeanDefinitionReader;
