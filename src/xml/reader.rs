use std::sync::Arc;

use super::definition_parser::{parse_document, DocumentEntry};
use super::document::Element;
use crate::beans::{BeanFactory, BeansError};
use crate::resource::core::is_http_url;
use crate::resource::{is_pattern, Resource, ResourceLoader, CLASSPATH_URL_PREFIX, FILE_URL_PREFIX};

/// 从 XML 资源读取 bean 定义并注册到 `BeanFactory`
///
/// 文档按给定顺序处理，后处理的同名定义覆盖先处理的
pub struct XmlBeanDefinitionReader<'a> {
    registry: &'a mut BeanFactory,
    resource_loader: Arc<dyn ResourceLoader>,
    validating: bool,
    // 正在加载的资源描述，用于检测循环 import
    resources_in_progress: Vec<String>,
}

impl<'a> XmlBeanDefinitionReader<'a> {
    pub fn new(registry: &'a mut BeanFactory, resource_loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            registry,
            resource_loader,
            validating: true,
            resources_in_progress: Vec::new(),
        }
    }

    /// 关闭后未知元素和属性只记录警告
    pub fn set_validating(&mut self, validating: bool) {
        self.validating = validating;
    }

    pub fn is_validating(&self) -> bool {
        self.validating
    }

    pub fn registry(&self) -> &BeanFactory {
        &*self.registry
    }

    /// 按顺序加载预先构造好的资源，返回新注册的定义数量
    pub fn load_bean_definitions_from_resources(
        &mut self,
        resources: &[Arc<dyn Resource>],
    ) -> Result<usize, BeansError> {
        let mut count = 0;
        for resource in resources {
            count += self.load_bean_definitions_from_resource(resource.as_ref())?;
        }
        Ok(count)
    }

    /// 按顺序加载多个位置，每个位置都可以是模式
    pub fn load_bean_definitions_from_locations<S: AsRef<str>>(
        &mut self,
        locations: &[S],
    ) -> Result<usize, BeansError> {
        let mut count = 0;
        for location in locations {
            count += self.load_bean_definitions(location.as_ref())?;
        }
        Ok(count)
    }

    /// 加载一个位置，模式会展开为多个资源，按排序后的顺序加载
    pub fn load_bean_definitions(&mut self, location: &str) -> Result<usize, BeansError> {
        let resources = self.resource_loader.get_resources(location)?;
        let mut count = 0;
        for resource in &resources {
            count += self.load_bean_definitions_from_resource(resource.as_ref())?;
        }
        log::debug!("Loaded {} bean definitions from location [{}]", count, location);
        Ok(count)
    }

    pub fn load_bean_definitions_from_resource(
        &mut self,
        resource: &dyn Resource,
    ) -> Result<usize, BeansError> {
        let description = resource.description();
        log::info!("Loading XML bean definitions from {}", description);

        if self.resources_in_progress.contains(&description) {
            return Err(BeansError::parse(
                description,
                "detected cyclic loading, check your import definitions",
            ));
        }
        self.resources_in_progress.push(description.clone());
        let result = self.do_load_bean_definitions(resource, &description);
        self.resources_in_progress.pop();
        result
    }

    fn do_load_bean_definitions(
        &mut self,
        resource: &dyn Resource,
        description: &str,
    ) -> Result<usize, BeansError> {
        let before = self.registry.bean_definition_count();
        let root = Element::parse(resource.open()?, description)?;

        for entry in parse_document(&root, description, self.validating)? {
            match entry {
                DocumentEntry::Bean(mut definition) => {
                    if definition.name.is_empty() {
                        definition.name = self.generate_bean_name(&definition.type_name);
                    }
                    self.registry.register_bean_definition(definition)?;
                }
                DocumentEntry::Alias { name, alias } => {
                    self.registry.register_alias(&name, &alias)?;
                }
                DocumentEntry::Import { resource: location } => {
                    self.import_bean_definitions(resource, &location)?;
                }
            }
        }

        Ok(self.registry.bean_definition_count() - before)
    }

    /// 带前缀或模式的位置交给加载策略，其余相对当前资源解析
    fn import_bean_definitions(&mut self, current: &dyn Resource, location: &str) -> Result<(), BeansError> {
        let absolute = location.starts_with(CLASSPATH_URL_PREFIX)
            || location.starts_with(FILE_URL_PREFIX)
            || is_http_url(location);
        let count = if absolute || is_pattern(location) {
            self.load_bean_definitions(location)?
        } else {
            let relative = current.create_relative(location)?;
            self.load_bean_definitions_from_resource(relative.as_ref())?
        };
        log::debug!("Imported {} bean definitions from [{}]", count, location);
        Ok(())
    }

    /// 未命名的 bean 使用 `<class>#<n>`，n 从 0 开始取第一个未被占用的
    fn generate_bean_name(&self, type_name: &str) -> String {
        let mut counter = 0;
        loop {
            let name = format!("{}#{}", type_name, counter);
            if !self.registry.contains_bean_definition(&name) {
                return name;
            }
            counter += 1;
        }
    }
}
