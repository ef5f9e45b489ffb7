// TypeOptions：按名称选择实现的配置片段

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 类型选项
///
/// `type` 字段是注册表中的实现名称，`options` 是该实现的配置，
/// 交给 serde 反序列化为具体的 Config 类型
///
/// ```
/// use iocx::cfg::TypeOptions;
///
/// let opts = TypeOptions::from_json(r#"{
///     type: "ClassPathResourceLoader",
///     options: { roots: ["conf", "/etc/app"] },
/// }"#).unwrap();
/// assert_eq!(opts.type_name, "ClassPathResourceLoader");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeOptions {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub options: JsonValue,
}

impl TypeOptions {
    pub fn new(type_name: impl Into<String>, options: JsonValue) -> Self {
        Self {
            type_name: type_name.into(),
            options,
        }
    }

    /// 从 JSON 字符串创建（使用 json5，允许注释、尾随逗号和未加引号的键）
    pub fn from_json(json_str: &str) -> Result<Self> {
        Ok(json5::from_str(json_str)?)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
