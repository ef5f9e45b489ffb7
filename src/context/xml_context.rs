// XML 容器
//
// 提供配置位置、预先构造的资源、validating 开关和资源加载策略，生命周期委托给 RefreshableContext

use anyhow::anyhow;
use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use smart_default::SmartDefault;
use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use super::error::ContextError;
use super::refreshable::{ContextState, DefinitionLoader, RefreshableContext};
use crate::beans::{
    AutowireCandidateResolver, BeanFactory, BeanInstance, BeanLookup, BeansError,
};
use crate::cfg::{create_trait_from_type_options, TypeOptions};
use crate::resource::{
    register_resource_loaders, ClassPathResourceLoader, ClassPathResourceLoaderConfig,
    FileSystemResourceLoader, Resource, ResourceError, ResourceLoader,
};
use crate::xml::XmlBeanDefinitionReader;

/// XmlApplicationContext 配置
#[derive(Debug, Clone, Serialize, Deserialize, SmartDefault, Validate)]
#[serde(default)]
pub struct XmlApplicationContextConfig {
    /// 有序的定义位置，支持 `${VAR}`、`$VAR` 和 `~`
    #[garde(inner(length(min = 1)))]
    pub config_locations: Vec<String>,

    /// 严格校验文档结构
    #[default = true]
    #[garde(skip)]
    pub validating: bool,

    /// 未设置时允许
    #[garde(skip)]
    pub allow_bean_definition_overriding: Option<bool>,

    #[garde(skip)]
    pub allow_circular_references: Option<bool>,

    /// 资源加载策略
    #[default(TypeOptions::new("FileSystemResourceLoader", JsonValue::Null))]
    #[garde(skip)]
    pub resource_loader: TypeOptions,

    #[garde(length(min = 1))]
    pub id: Option<String>,

    #[garde(length(min = 1))]
    pub display_name: Option<String>,

    /// 创建后立即刷新
    #[default = true]
    #[garde(skip)]
    pub refresh: bool,

    /// 刷新时预先创建非延迟单例
    #[default = true]
    #[garde(skip)]
    pub eager_init: bool,
}

impl XmlApplicationContextConfig {
    pub fn from_json(json_str: &str) -> anyhow::Result<Self> {
        Ok(json5::from_str(json_str)?)
    }

    pub fn from_yaml(yaml_str: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// 按扩展名选择格式读取配置文件
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") | Some("json5") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("toml") => Self::from_toml(&content),
            other => Err(anyhow!("unsupported config format: {:?}", other)),
        }
    }
}

/// 解析位置中的 `${NAME}` / `${NAME:default}` 占位符和开头的 `~`
///
/// 不带花括号的 `$` 按字面保留，没有默认值的未定义变量返回 `Resolution` 错误
pub fn resolve_location(location: &str) -> Result<String, ResourceError> {
    let location = location.trim();
    let mut resolved = String::with_capacity(location.len());
    let mut rest = location;
    while let Some(start) = rest.find("${") {
        resolved.push_str(&rest[..start]);
        let placeholder = &rest[start + 2..];
        let end = placeholder
            .find('}')
            .ok_or_else(|| ResourceError::resolution(location, "unclosed placeholder"))?;
        let (name, default) = match placeholder[..end].split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (&placeholder[..end], None),
        };
        if name.is_empty() {
            return Err(ResourceError::resolution(location, "empty placeholder name"));
        }
        match (shellexpand::env(&format!("${{{}}}", name)), default) {
            (Ok(value), _) => resolved.push_str(&value),
            (Err(_), Some(default)) => resolved.push_str(default),
            (Err(e), None) => return Err(ResourceError::resolution(location, e)),
        }
        rest = &placeholder[end + 1..];
    }
    resolved.push_str(rest);
    Ok(shellexpand::tilde(&resolved).into_owned())
}

/// 从 XML 文档加载定义：先加载预先构造的资源，再按顺序加载配置位置
pub struct XmlDefinitionLoader {
    config_locations: Vec<String>,
    config_resources: Vec<Arc<dyn Resource>>,
    resource_loader: Arc<dyn ResourceLoader>,
    validating: bool,
}

impl XmlDefinitionLoader {
    pub fn new(resource_loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            config_locations: Vec::new(),
            config_resources: Vec::new(),
            resource_loader,
            validating: true,
        }
    }

    /// 设置配置位置，占位符在这里解析
    pub fn set_config_locations<S: AsRef<str>>(&mut self, locations: &[S]) -> Result<(), ResourceError> {
        self.config_locations = locations
            .iter()
            .map(|location| resolve_location(location.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }

    pub fn config_locations(&self) -> &[String] {
        &self.config_locations
    }

    pub fn set_config_resources(&mut self, resources: Vec<Arc<dyn Resource>>) {
        self.config_resources = resources;
    }

    pub fn config_resources(&self) -> &[Arc<dyn Resource>] {
        &self.config_resources
    }

    pub fn set_validating(&mut self, validating: bool) {
        self.validating = validating;
    }

    pub fn resource_loader(&self) -> &Arc<dyn ResourceLoader> {
        &self.resource_loader
    }
}

impl DefinitionLoader for XmlDefinitionLoader {
    fn load_bean_definitions(&self, factory: &mut BeanFactory) -> Result<(), BeansError> {
        let mut reader = XmlBeanDefinitionReader::new(factory, self.resource_loader.clone());
        reader.set_validating(self.validating);
        let from_resources = reader.load_bean_definitions_from_resources(&self.config_resources)?;
        let from_locations = reader.load_bean_definitions_from_locations(&self.config_locations)?;
        log::debug!(
            "Loaded {} bean definitions from resources and {} from locations {:?}",
            from_resources,
            from_locations,
            self.config_locations
        );
        Ok(())
    }
}

/// 从 XML 定义文档构建的容器
///
/// ```no_run
/// use iocx::context::XmlApplicationContext;
///
/// let context = XmlApplicationContext::file_system(&["conf/base.xml", "conf/override.xml"]).unwrap();
/// let factory = context.get_bean_factory().unwrap();
/// println!("{:?}", factory.bean_definition_names());
/// ```
pub struct XmlApplicationContext {
    inner: RefreshableContext<XmlDefinitionLoader>,
}

impl XmlApplicationContext {
    /// 按配置创建，`refresh` 为 true 时立即刷新
    pub fn new(config: XmlApplicationContextConfig) -> Result<Self, ContextError> {
        config
            .validate()
            .map_err(|e| ContextError::Configuration(e.to_string()))?;

        register_resource_loaders().map_err(|e| ContextError::Configuration(e.to_string()))?;
        let resource_loader: Box<dyn ResourceLoader> =
            create_trait_from_type_options(&config.resource_loader)
                .map_err(|e| ContextError::Configuration(format!("{:#}", e)))?;

        let mut context = Self::with_resource_loader(Arc::from(resource_loader));
        if let Some(id) = config.id {
            context.set_id(id);
        }
        if let Some(display_name) = config.display_name {
            context.set_display_name(display_name);
        }
        if let Some(allow) = config.allow_bean_definition_overriding {
            context.set_allow_bean_definition_overriding(allow);
        }
        if let Some(allow) = config.allow_circular_references {
            context.set_allow_circular_references(allow);
        }
        context.set_validating(config.validating);
        context.set_eager_init(config.eager_init);
        context.set_config_locations(&config.config_locations)?;

        if config.refresh {
            context.refresh()?;
        }
        Ok(context)
    }

    /// 未刷新、没有配置位置的容器
    pub fn with_resource_loader(resource_loader: Arc<dyn ResourceLoader>) -> Self {
        let mut inner = RefreshableContext::new(XmlDefinitionLoader::new(resource_loader));
        let display_name = format!("XmlApplicationContext[{}]", inner.id());
        inner.set_display_name(display_name);
        Self { inner }
    }

    /// 文件系统策略，立即刷新
    pub fn file_system<S: AsRef<str>>(locations: &[S]) -> Result<Self, ContextError> {
        Self::file_system_with(locations, true, None)
    }

    pub fn file_system_with_parent<S: AsRef<str>>(
        locations: &[S],
        parent: Arc<dyn BeanLookup>,
    ) -> Result<Self, ContextError> {
        Self::file_system_with(locations, true, Some(parent))
    }

    pub fn file_system_with_refresh<S: AsRef<str>>(
        locations: &[S],
        refresh: bool,
    ) -> Result<Self, ContextError> {
        Self::file_system_with(locations, refresh, None)
    }

    pub fn file_system_with<S: AsRef<str>>(
        locations: &[S],
        refresh: bool,
        parent: Option<Arc<dyn BeanLookup>>,
    ) -> Result<Self, ContextError> {
        Self::create(Arc::new(FileSystemResourceLoader::default()), locations, refresh, parent)
    }

    /// 类路径策略，按 `roots` 顺序查找，立即刷新
    pub fn class_path<S: AsRef<str>>(roots: &[S], locations: &[S]) -> Result<Self, ContextError> {
        Self::class_path_with(roots, locations, true, None)
    }

    pub fn class_path_with<S: AsRef<str>>(
        roots: &[S],
        locations: &[S],
        refresh: bool,
        parent: Option<Arc<dyn BeanLookup>>,
    ) -> Result<Self, ContextError> {
        let loader = ClassPathResourceLoader::new(ClassPathResourceLoaderConfig {
            roots: roots.iter().map(|root| root.as_ref().to_string()).collect(),
        });
        Self::create(Arc::new(loader), locations, refresh, parent)
    }

    fn create<S: AsRef<str>>(
        resource_loader: Arc<dyn ResourceLoader>,
        locations: &[S],
        refresh: bool,
        parent: Option<Arc<dyn BeanLookup>>,
    ) -> Result<Self, ContextError> {
        let mut context = Self::with_resource_loader(resource_loader);
        if let Some(parent) = parent {
            context.add_parent(parent);
        }
        context.set_config_locations(locations)?;
        if refresh {
            context.refresh()?;
        }
        Ok(context)
    }

    /// 设置有序的配置位置，占位符无法解析时返回错误
    pub fn set_config_locations<S: AsRef<str>>(&mut self, locations: &[S]) -> Result<(), ContextError> {
        self.inner
            .loader_mut()
            .set_config_locations(locations)
            .map_err(|e| ContextError::from_refresh(self.inner.display_name(), BeansError::from(e)))
    }

    pub fn config_locations(&self) -> &[String] {
        self.inner.loader().config_locations()
    }

    /// 预先构造的资源，在配置位置之前加载
    pub fn set_config_resources(&mut self, resources: Vec<Arc<dyn Resource>>) {
        self.inner.loader_mut().set_config_resources(resources);
    }

    pub fn set_validating(&mut self, validating: bool) {
        self.inner.loader_mut().set_validating(validating);
    }

    pub fn set_allow_bean_definition_overriding(&mut self, allow: bool) {
        self.inner.set_allow_bean_definition_overriding(allow);
    }

    pub fn set_allow_circular_references(&mut self, allow: bool) {
        self.inner.set_allow_circular_references(allow);
    }

    pub fn set_autowire_candidate_resolver(&mut self, resolver: Arc<dyn AutowireCandidateResolver>) {
        self.inner.set_autowire_candidate_resolver(resolver);
    }

    pub fn add_parent(&mut self, parent: Arc<dyn BeanLookup>) {
        self.inner.add_parent(parent);
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.inner.set_id(id);
    }

    pub fn id(&self) -> &str {
        self.inner.id()
    }

    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.inner.set_display_name(display_name);
    }

    pub fn display_name(&self) -> &str {
        self.inner.display_name()
    }

    pub fn set_eager_init(&mut self, eager_init: bool) {
        self.inner.set_eager_init(eager_init);
    }

    pub fn resource_loader(&self) -> &Arc<dyn ResourceLoader> {
        self.inner.loader().resource_loader()
    }

    pub fn refresh(&self) -> Result<(), ContextError> {
        self.inner.refresh()
    }

    pub fn close(&self) {
        self.inner.close()
    }

    pub fn state(&self) -> ContextState {
        self.inner.state()
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    pub fn get_bean_factory(&self) -> Result<Arc<BeanFactory>, ContextError> {
        self.inner.get_bean_factory()
    }

    pub fn get_bean(&self, name: &str) -> Result<BeanInstance, ContextError> {
        self.inner.get_bean(name)
    }

    pub fn get_bean_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ContextError> {
        self.inner.get_bean_as::<T>(name)
    }

    pub fn contains_bean(&self, name: &str) -> bool {
        self.inner.contains_bean(name)
    }
}

impl std::fmt::Debug for XmlApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlApplicationContext")
            .field("display_name", &self.display_name())
            .field("config_locations", &self.config_locations())
            .field("state", &self.state())
            .finish()
    }
}

impl BeanLookup for XmlApplicationContext {
    fn contains_bean(&self, name: &str) -> bool {
        self.inner.contains_bean(name)
    }

    fn get_bean(&self, name: &str) -> Result<BeanInstance, BeansError> {
        BeanLookup::get_bean(&self.inner, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beans::{register_bean_factory, CreatedBean};
    use crate::resource::ByteArrayResource;
    use anyhow::Result;
    use std::fs;
    use tempfile::TempDir;

    fn register_types() -> Result<()> {
        register_bean_factory("xml-context-test-endpoint", |ctx| {
            let url = ctx.options()["url"].as_str().unwrap_or_default().to_string();
            Ok(CreatedBean::new(url))
        })
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> Result<String> {
        let path = dir.path().join(name);
        fs::write(&path, content)?;
        Ok(format!("file:{}", path.to_string_lossy()))
    }

    #[test]
    fn test_base_and_override_round_trip() -> Result<()> {
        register_types()?;
        let dir = TempDir::new()?;
        let base = write(
            &dir,
            "base.xml",
            r#"<beans>
                 <bean id="endpoint" class="xml-context-test-endpoint"><property name="url" value="http://base"/></bean>
                 <bean id="fallback" class="xml-context-test-endpoint"><property name="url" value="http://fallback"/></bean>
               </beans>"#,
        )?;
        let overrides = write(
            &dir,
            "override.xml",
            r#"<beans><bean id="endpoint" class="xml-context-test-endpoint"><property name="url" value="http://override"/></bean></beans>"#,
        )?;

        let context = XmlApplicationContext::file_system(&[&base, &overrides])?;
        assert!(context.is_active());
        assert_eq!(context.get_bean_as::<String>("endpoint")?.as_str(), "http://override");
        assert_eq!(context.get_bean_as::<String>("fallback")?.as_str(), "http://fallback");

        let factory = context.get_bean_factory()?;
        assert_eq!(factory.bean_definition_names(), &["endpoint", "fallback"].map(String::from));
        assert_eq!(factory.serialization_id().as_deref(), Some(context.id()));
        Ok(())
    }

    #[test]
    fn test_overriding_disabled() -> Result<()> {
        let dir = TempDir::new()?;
        let base = write(&dir, "base.xml", r#"<beans><bean id="a" class="A"/></beans>"#)?;
        let overrides = write(&dir, "override.xml", r#"<beans><bean id="a" class="B"/></beans>"#)?;

        let mut context = XmlApplicationContext::file_system_with_refresh(&[&base, &overrides], false)?;
        assert_eq!(context.state(), ContextState::Uninitialized);
        assert!(matches!(context.get_bean_factory(), Err(ContextError::IllegalState(_))));

        context.set_allow_bean_definition_overriding(false);
        context.set_eager_init(false);
        let err = context.refresh().err();
        assert!(matches!(
            err,
            Some(ContextError::Beans(BeansError::DuplicateDefinition { ref name, .. })) if name == "a"
        ));
        assert!(context.get_bean_factory().is_err());
        Ok(())
    }

    #[test]
    fn test_parse_error_is_initialization_error() -> Result<()> {
        let dir = TempDir::new()?;
        let broken = write(&dir, "broken.xml", "<beans><bean id=\"a\" class=\"A\">")?;

        let err = XmlApplicationContext::file_system(&[&broken]).err();
        match err {
            Some(ContextError::Initialization { display_name, source }) => {
                assert!(display_name.starts_with("XmlApplicationContext["));
                assert!(matches!(source, BeansError::Parse { .. }));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_config_resources_load_before_locations() -> Result<()> {
        register_types()?;
        let dir = TempDir::new()?;
        let location = write(
            &dir,
            "beans.xml",
            r#"<beans><bean id="endpoint" class="xml-context-test-endpoint"><property name="url" value="from location"/></bean></beans>"#,
        )?;

        let mut context = XmlApplicationContext::file_system_with_refresh(&[&location], false)?;
        context.set_config_resources(vec![Arc::new(ByteArrayResource::new(
            "inline",
            r#"<beans><bean id="endpoint" class="xml-context-test-endpoint"><property name="url" value="from resource"/></bean></beans>"#,
        ))]);
        context.refresh()?;
        assert_eq!(context.get_bean_as::<String>("endpoint")?.as_str(), "from location");
        Ok(())
    }

    #[test]
    fn test_placeholders_in_locations() -> Result<()> {
        let mut context = XmlApplicationContext::file_system_with_refresh(&["~/beans.xml"], false)?;
        assert!(!context.config_locations()[0].starts_with('~'));

        let err = context.set_config_locations(&["${IOCX_TEST_SURELY_UNDEFINED_VARIABLE}/beans.xml"]);
        assert!(matches!(
            err,
            Err(ContextError::Initialization { source: BeansError::Resource(ResourceError::Resolution { .. }), .. })
        ));
        Ok(())
    }

    #[test]
    fn test_class_path_context() -> Result<()> {
        register_types()?;
        let first = TempDir::new()?;
        let second = TempDir::new()?;
        fs::write(
            second.path().join("app.xml"),
            r#"<beans><bean id="endpoint" class="xml-context-test-endpoint"><property name="url" value="second"/></bean></beans>"#,
        )?;

        let roots = [
            first.path().to_string_lossy().to_string(),
            second.path().to_string_lossy().to_string(),
        ];
        let context = XmlApplicationContext::class_path(&roots, &["/app.xml".to_string()])?;
        assert_eq!(context.get_bean_as::<String>("endpoint")?.as_str(), "second");
        Ok(())
    }

    #[test]
    fn test_new_from_yaml_config() -> Result<()> {
        register_types()?;
        let dir = TempDir::new()?;
        fs::create_dir_all(dir.path().join("conf"))?;
        fs::write(
            dir.path().join("conf/app.xml"),
            r#"<beans><bean id="endpoint" class="xml-context-test-endpoint" lazy-init="true"><property name="url" value="yaml"/></bean></beans>"#,
        )?;

        let config = XmlApplicationContextConfig::from_yaml(&format!(
            r#"
config_locations: ["classpath:conf/*.xml"]
id: app
display_name: application
allow_bean_definition_overriding: false
resource_loader:
  type: ClassPathResourceLoader
  options:
    roots: ["{}"]
"#,
            dir.path().to_string_lossy()
        ))?;
        let context = XmlApplicationContext::new(config)?;

        assert_eq!(context.id(), "app");
        assert_eq!(context.display_name(), "application");
        assert!(!context.get_bean_factory()?.contains_singleton("endpoint"));
        assert_eq!(context.get_bean_as::<String>("endpoint")?.as_str(), "yaml");
        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        let config = XmlApplicationContextConfig {
            config_locations: vec!["".to_string()],
            ..Default::default()
        };
        assert!(matches!(XmlApplicationContext::new(config), Err(ContextError::Configuration(_))));

        let config = XmlApplicationContextConfig {
            resource_loader: TypeOptions::new("NoSuchLoader", JsonValue::Null),
            refresh: false,
            ..Default::default()
        };
        assert!(matches!(XmlApplicationContext::new(config), Err(ContextError::Configuration(_))));
    }

    #[test]
    fn test_parent_context() -> Result<()> {
        register_types()?;
        let dir = TempDir::new()?;
        let parent_xml = write(
            &dir,
            "parent.xml",
            r#"<beans><bean id="shared" class="xml-context-test-endpoint"><property name="url" value="parent"/></bean></beans>"#,
        )?;
        let child_xml = write(&dir, "child.xml", r#"<beans><bean id="local" class="xml-context-test-endpoint"><property name="url" value="child"/></bean></beans>"#)?;

        let parent = Arc::new(XmlApplicationContext::file_system(&[&parent_xml])?);
        let child = XmlApplicationContext::file_system_with_parent(&[&child_xml], parent.clone())?;

        assert_eq!(child.get_bean_as::<String>("shared")?.as_str(), "parent");
        assert!(!parent.contains_bean("local"));

        // 父容器关闭后查找链中不再有它的 bean
        parent.close();
        assert!(matches!(child.get_bean("shared"), Err(ContextError::Beans(BeansError::NoSuchBean { .. }))));
        Ok(())
    }

    #[test]
    #[serial_test::serial]
    fn test_resolve_location_placeholders() -> Result<()> {
        std::env::set_var("IOCX_TEST_CONF_DIR", "/etc/iocx");
        std::env::remove_var("IOCX_TEST_UNSET");

        assert_eq!(resolve_location(" ${IOCX_TEST_CONF_DIR}/beans.xml ")?, "/etc/iocx/beans.xml");
        assert_eq!(resolve_location("${IOCX_TEST_UNSET:conf}/beans.xml")?, "conf/beans.xml");
        assert_eq!(resolve_location("conf/Outer$Inner.xml")?, "conf/Outer$Inner.xml");
        assert!(matches!(
            resolve_location("${IOCX_TEST_UNSET}/beans.xml"),
            Err(ResourceError::Resolution { .. })
        ));
        assert!(matches!(
            resolve_location("${IOCX_TEST_CONF_DIR/beans.xml"),
            Err(ResourceError::Resolution { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_dollar_in_file_name() -> Result<()> {
        register_types()?;
        let dir = TempDir::new()?;
        let location = write(
            &dir,
            "Outer$Inner.xml",
            r#"<beans><bean id="endpoint" class="xml-context-test-endpoint"><property name="url" value="inner"/></bean></beans>"#,
        )?;

        let context = XmlApplicationContext::file_system(&[&location])?;
        assert_eq!(context.get_bean_as::<String>("endpoint")?.as_str(), "inner");
        Ok(())
    }
}
