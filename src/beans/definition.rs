// Bean 定义记录

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use smart_default::SmartDefault;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SmartDefault)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// 每个注册表只创建一次，销毁时回调
    #[default]
    Singleton,
    /// 每次获取都创建新实例，注册表不持有
    Prototype,
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "singleton" => Ok(Scope::Singleton),
            "prototype" => Ok(Scope::Prototype),
            other => Err(format!("unknown scope '{}'", other)),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Singleton => write!(f, "singleton"),
            Scope::Prototype => write!(f, "prototype"),
        }
    }
}

/// 属性或构造参数的取值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    /// 字面量
    Value(JsonValue),
    /// 引用另一个 bean
    Ref(String),
    List(Vec<PropertyValue>),
    Null,
}

impl PropertyValue {
    /// 解析字面量：数字和布尔值保留类型，带引号的 JSON 字符串去掉引号，其余按原文
    ///
    /// `"8080"` => 8080，`"true"` => true，`"\"8080\""` => "8080"，`"localhost"` => "localhost"
    pub fn literal(raw: &str) -> Self {
        match serde_json::from_str::<JsonValue>(raw) {
            Ok(value @ (JsonValue::Number(_) | JsonValue::Bool(_) | JsonValue::String(_))) => {
                PropertyValue::Value(value)
            }
            _ => PropertyValue::Value(JsonValue::String(raw.to_string())),
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        PropertyValue::Ref(name.into())
    }

    /// 转为传给构造函数的 JSON，引用以 bean 名称表示
    pub fn to_json(&self) -> JsonValue {
        match self {
            PropertyValue::Value(value) => value.clone(),
            PropertyValue::Ref(name) => JsonValue::String(name.clone()),
            PropertyValue::List(items) => {
                JsonValue::Array(items.iter().map(PropertyValue::to_json).collect())
            }
            PropertyValue::Null => JsonValue::Null,
        }
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            PropertyValue::Ref(name) => out.push(name),
            PropertyValue::List(items) => items.iter().for_each(|item| item.collect_refs(out)),
            PropertyValue::Value(_) | PropertyValue::Null => {}
        }
    }
}

/// Bean 定义：如何构造并装配一个对象
///
/// 名称是身份标识，同名的后注册定义会替换先注册的定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SmartDefault)]
#[serde(default)]
pub struct BeanDefinition {
    pub name: String,
    pub aliases: Vec<String>,
    /// 类型注册表中的名称（XML 中的 `class`）
    pub type_name: String,
    pub scope: Scope,
    pub lazy_init: bool,
    pub primary: bool,
    #[default = true]
    pub autowire_candidate: bool,
    pub depends_on: Vec<String>,
    pub constructor_args: Vec<PropertyValue>,
    pub properties: BTreeMap<String, PropertyValue>,
    pub description: Option<String>,
    /// 定义来源的资源描述
    pub resource_description: Option<String>,
}

impl BeanDefinition {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn with_value(self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.with_property(name, PropertyValue::Value(value.into()))
    }

    pub fn with_ref(self, name: impl Into<String>, bean: impl Into<String>) -> Self {
        self.with_property(name, PropertyValue::Ref(bean.into()))
    }

    pub fn with_constructor_arg(mut self, value: PropertyValue) -> Self {
        self.constructor_args.push(value);
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_lazy_init(mut self, lazy_init: bool) -> Self {
        self.lazy_init = lazy_init;
        self
    }

    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    pub fn with_autowire_candidate(mut self, autowire_candidate: bool) -> Self {
        self.autowire_candidate = autowire_candidate;
        self
    }

    pub fn with_depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }

    pub fn with_resource_description(mut self, description: impl Into<String>) -> Self {
        self.resource_description = Some(description.into());
        self
    }

    pub fn is_singleton(&self) -> bool {
        self.scope == Scope::Singleton
    }

    pub fn is_prototype(&self) -> bool {
        self.scope == Scope::Prototype
    }

    /// 属性和构造参数中引用的 bean 名称（按出现顺序，不去重）
    pub fn references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        for arg in &self.constructor_args {
            arg.collect_refs(&mut refs);
        }
        for value in self.properties.values() {
            value.collect_refs(&mut refs);
        }
        refs
    }

    /// 引用加上 depends-on，即创建该 bean 之前必须存在的 bean
    pub fn dependencies(&self) -> Vec<&str> {
        let mut deps: Vec<&str> = self.depends_on.iter().map(String::as_str).collect();
        deps.extend(self.references());
        deps
    }

    /// 构造函数看到的配置：有构造参数时为数组，否则为属性对象
    pub fn options(&self) -> Result<JsonValue, String> {
        if !self.constructor_args.is_empty() {
            if !self.properties.is_empty() {
                return Err("constructor arguments and properties cannot be mixed".to_string());
            }
            return Ok(JsonValue::Array(
                self.constructor_args.iter().map(PropertyValue::to_json).collect(),
            ));
        }
        Ok(JsonValue::Object(
            self.properties
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        ))
    }

    pub(crate) fn source(&self) -> String {
        self.resource_description
            .clone()
            .unwrap_or_else(|| "<unknown source>".to_string())
    }
}
