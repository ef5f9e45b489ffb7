use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::any::Any;
use std::sync::Arc;

use super::definition::{BeanDefinition, PropertyValue};
use super::error::BeansError;
use super::factory::BeanFactory;
use super::type_registry::BeanInstance;

/// 构造函数看到的创建上下文
///
/// 通过它读取配置、按名称取引用的 bean，取 bean 时沿用当前创建链，循环引用会被检测到
pub struct BeanContext<'a> {
    name: &'a str,
    definition: &'a BeanDefinition,
    factory: &'a BeanFactory,
    options: JsonValue,
    chain: Vec<String>,
}

impl<'a> BeanContext<'a> {
    pub(crate) fn new(
        name: &'a str,
        definition: &'a BeanDefinition,
        factory: &'a BeanFactory,
        options: JsonValue,
        chain: Vec<String>,
    ) -> Self {
        Self {
            name,
            definition,
            factory,
            options,
            chain,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn definition(&self) -> &BeanDefinition {
        self.definition
    }

    pub fn factory(&self) -> &BeanFactory {
        self.factory
    }

    /// 属性对象，或构造参数数组
    pub fn options(&self) -> &JsonValue {
        &self.options
    }

    /// 把配置反序列化为 `C`
    pub fn config<C: DeserializeOwned>(&self) -> Result<C> {
        serde_json::from_value(self.options.clone())
            .map_err(|e| anyhow!("invalid configuration for bean '{}': {}", self.name, e))
    }

    pub fn get_bean(&self, name: &str) -> Result<BeanInstance, BeansError> {
        let mut chain = self.chain.clone();
        self.factory.do_get_bean(name, &mut chain)
    }

    pub fn get_bean_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, BeansError> {
        let instance = self.get_bean(name)?;
        instance
            .downcast::<T>()
            .map_err(|_| BeansError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// 取属性 `property` 引用的 bean
    pub fn get_ref(&self, property: &str) -> Result<BeanInstance, BeansError> {
        match self.definition.properties.get(property) {
            Some(PropertyValue::Ref(bean)) => self.get_bean(bean),
            Some(_) => Err(BeansError::creation(
                self.name,
                format!("property '{}' is not a bean reference", property),
            )),
            None => Err(BeansError::creation(
                self.name,
                format!("property '{}' is not defined", property),
            )),
        }
    }

    pub fn get_ref_as<T: Any + Send + Sync>(&self, property: &str) -> Result<Arc<T>, BeansError> {
        let instance = self.get_ref(property)?;
        instance
            .downcast::<T>()
            .map_err(|_| BeansError::TypeMismatch {
                name: format!("{}.{}", self.name, property),
                expected: std::any::type_name::<T>(),
            })
    }

    /// 取列表属性中所有引用的 bean，忽略字面量
    pub fn get_refs(&self, property: &str) -> Result<Vec<BeanInstance>, BeansError> {
        match self.definition.properties.get(property) {
            Some(PropertyValue::List(items)) => items
                .iter()
                .filter_map(|item| match item {
                    PropertyValue::Ref(bean) => Some(self.get_bean(bean)),
                    _ => None,
                })
                .collect(),
            Some(PropertyValue::Ref(bean)) => Ok(vec![self.get_bean(bean)?]),
            Some(_) | None => Ok(Vec::new()),
        }
    }

    /// 取第 `index` 个构造参数引用的 bean
    pub fn get_constructor_ref(&self, index: usize) -> Result<BeanInstance, BeansError> {
        match self.definition.constructor_args.get(index) {
            Some(PropertyValue::Ref(bean)) => self.get_bean(bean),
            _ => Err(BeansError::creation(
                self.name,
                format!("constructor argument {} is not a bean reference", index),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beans::{register_bean_factory, BeanDefinition, CreatedBean};

    struct Repository {
        url: String,
    }

    struct Service {
        repository: Arc<Repository>,
        listeners: usize,
    }

    #[test]
    fn test_refs_are_resolved_through_context() -> anyhow::Result<()> {
        register_bean_factory("bean-context-test-repository", |ctx| {
            let url = ctx.options()["url"].as_str().unwrap_or_default().to_string();
            Ok(CreatedBean::new(Repository { url }))
        })?;
        register_bean_factory("bean-context-test-service", |ctx| {
            Ok(CreatedBean::new(Service {
                repository: ctx.get_ref_as::<Repository>("repository")?,
                listeners: ctx.get_refs("listeners")?.len(),
            }))
        })?;

        let mut factory = BeanFactory::new();
        factory.register_bean_definition(
            BeanDefinition::new("repository", "bean-context-test-repository")
                .with_value("url", "mem://"),
        )?;
        factory.register_bean_definition(
            BeanDefinition::new("service", "bean-context-test-service")
                .with_ref("repository", "repository")
                .with_property(
                    "listeners",
                    PropertyValue::List(vec![
                        PropertyValue::reference("repository"),
                        PropertyValue::literal("ignored"),
                    ]),
                ),
        )?;

        let service = factory.get_bean_as::<Service>("service")?;
        assert_eq!(service.repository.url, "mem://");
        assert_eq!(service.listeners, 1);

        // 单例引用指向同一个实例
        let repository = factory.get_bean_as::<Repository>("repository")?;
        assert!(Arc::ptr_eq(&repository, &service.repository));
        Ok(())
    }

    #[test]
    fn test_get_ref_on_literal_fails() -> anyhow::Result<()> {
        register_bean_factory("bean-context-test-literal", |ctx| {
            ctx.get_ref("port")?;
            Ok(CreatedBean::new(()))
        })?;

        let mut factory = BeanFactory::new();
        factory.register_bean_definition(
            BeanDefinition::new("server", "bean-context-test-literal").with_value("port", 80),
        )?;
        let err = factory.get_bean("server").err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("not a bean reference"));
        Ok(())
    }
}
