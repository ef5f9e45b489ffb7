#[cfg(test)]
mod integration_tests {
    use anyhow::Result;
    use iocx::{
        register_bean_factory, register_bean_type, register_disposable_bean_type, BeanFactory,
        BeansError, ContextError, ContextState, CreatedBean, DisposableBean,
        XmlApplicationContext, XmlApplicationContextConfig,
    };
    use serde::Deserialize;
    use serial_test::serial;
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    // 模拟一个带连接池的数据访问层
    #[derive(Debug, Clone, Deserialize)]
    struct ConnectionPoolConfig {
        url: String,
        #[serde(default = "default_max_size")]
        max_size: usize,
    }

    fn default_max_size() -> usize {
        8
    }

    struct ConnectionPool {
        url: String,
        max_size: usize,
    }

    impl From<ConnectionPoolConfig> for ConnectionPool {
        fn from(config: ConnectionPoolConfig) -> Self {
            Self {
                url: config.url,
                max_size: config.max_size,
            }
        }
    }

    static CLOSED_POOLS: Mutex<Vec<String>> = Mutex::new(Vec::new());

    impl DisposableBean for ConnectionPool {
        fn destroy(&self) -> Result<()> {
            CLOSED_POOLS.lock().unwrap().push(self.url.clone());
            Ok(())
        }
    }

    struct UserRepository {
        pool: Arc<ConnectionPool>,
        table: String,
    }

    #[derive(Debug, Deserialize)]
    struct GreeterConfig {
        greeting: String,
    }

    struct Greeter {
        greeting: String,
    }

    impl From<GreeterConfig> for Greeter {
        fn from(config: GreeterConfig) -> Self {
            Self {
                greeting: config.greeting,
            }
        }
    }

    fn register_types() -> Result<()> {
        register_disposable_bean_type::<ConnectionPool, ConnectionPoolConfig>("ConnectionPool")?;
        register_bean_type::<Greeter, GreeterConfig>("Greeter")?;
        register_bean_factory("UserRepository", |ctx| {
            Ok(CreatedBean::new(UserRepository {
                pool: ctx.get_ref_as::<ConnectionPool>("pool")?,
                table: ctx.options()["table"].as_str().unwrap_or("users").to_string(),
            }))
        })?;
        Ok(())
    }

    fn write(dir: &Path, name: &str, content: &str) -> Result<()> {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    const BASE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<beans>
  <bean id="pool" class="ConnectionPool">
    <property name="url" value="postgres://base"/>
  </bean>
  <bean id="userRepository" name="users" class="UserRepository">
    <property name="pool" ref="pool"/>
    <property name="table" value="app_users"/>
  </bean>
  <bean id="greeter" class="Greeter" lazy-init="true">
    <property name="greeting" value="hello"/>
  </bean>
</beans>"#;

    const OVERRIDE_XML: &str = r#"<beans>
  <bean id="pool" class="ConnectionPool">
    <property name="url" value="postgres://override"/>
    <property name="max_size" value="32"/>
  </bean>
</beans>"#;

    #[test]
    #[serial]
    fn test_leading_separator_is_stripped_against_working_directory() -> Result<()> {
        register_types()?;
        let dir = TempDir::new()?;
        write(dir.path(), "base.xml", BASE_XML)?;
        write(dir.path(), "conf/override.xml", OVERRIDE_XML)?;

        let original = std::env::current_dir()?;
        std::env::set_current_dir(dir.path())?;
        let result = XmlApplicationContext::file_system(&["/base.xml", "/conf/override.xml"]);
        std::env::set_current_dir(original)?;

        let context = result?;
        let repository = context.get_bean_as::<UserRepository>("users")?;
        assert_eq!(repository.pool.url, "postgres://override");
        assert_eq!(repository.pool.max_size, 32);
        assert_eq!(repository.table, "app_users");
        Ok(())
    }

    #[test]
    fn test_file_prefix_keeps_absolute_path() -> Result<()> {
        register_types()?;
        let dir = TempDir::new()?;
        write(dir.path(), "base.xml", BASE_XML)?;

        let location = format!("file:{}", dir.path().join("base.xml").to_string_lossy());
        let context = XmlApplicationContext::file_system(&[location])?;
        assert_eq!(context.get_bean_as::<ConnectionPool>("pool")?.url, "postgres://base");
        Ok(())
    }

    #[test]
    fn test_round_trip_and_close_destroys_singletons() -> Result<()> {
        register_types()?;
        let dir = TempDir::new()?;
        write(dir.path(), "base.xml", BASE_XML)?;
        write(dir.path(), "override.xml", OVERRIDE_XML)?;
        let base = dir.path().join("base.xml").to_string_lossy().to_string();
        let overrides = dir.path().join("override.xml").to_string_lossy().to_string();

        let context = XmlApplicationContext::file_system(&[
            format!("file:{}", base),
            format!("file:{}", overrides),
        ])?;
        let factory = context.get_bean_factory()?;
        assert_eq!(
            factory.bean_definition_names(),
            &["pool", "userRepository", "greeter"].map(String::from)
        );
        assert!(factory.contains_singleton("userRepository"));
        assert!(!factory.contains_singleton("greeter"));
        assert_eq!(context.get_bean_as::<Greeter>("greeter")?.greeting, "hello");

        context.close();
        assert_eq!(context.state(), ContextState::Closed);
        assert!(CLOSED_POOLS
            .lock()
            .unwrap()
            .contains(&"postgres://override".to_string()));
        assert!(matches!(context.get_bean_factory(), Err(ContextError::IllegalState(_))));
        Ok(())
    }

    #[test]
    fn test_failed_refresh_after_success_leaves_no_registry() -> Result<()> {
        register_types()?;
        let dir = TempDir::new()?;
        write(dir.path(), "beans.xml", BASE_XML)?;
        let location = format!("file:{}", dir.path().join("beans.xml").to_string_lossy());

        let context = XmlApplicationContext::file_system(&[&location])?;
        assert!(context.is_active());

        write(dir.path(), "beans.xml", "<beans><bean id=\"pool\"")?;
        let err = context.refresh().err();
        assert!(matches!(
            err,
            Some(ContextError::Initialization { source: BeansError::Parse { .. }, .. })
        ));
        assert_eq!(context.state(), ContextState::Uninitialized);
        assert!(context.get_bean_factory().is_err());

        write(dir.path(), "beans.xml", BASE_XML)?;
        context.refresh()?;
        assert!(context.get_bean_as::<UserRepository>("userRepository").is_ok());
        Ok(())
    }

    #[test]
    fn test_missing_location_is_initialization_error() -> Result<()> {
        let dir = TempDir::new()?;
        let location = format!("file:{}", dir.path().join("absent.xml").to_string_lossy());
        let err = XmlApplicationContext::file_system(&[location]).err();
        assert!(matches!(
            err,
            Some(ContextError::Initialization { source: BeansError::Resource(_), .. })
        ));
        Ok(())
    }

    #[test]
    fn test_url_location() -> Result<()> {
        register_types()?;
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/conf/beans.xml")
            .with_status(200)
            .with_header("content-type", "application/xml")
            .with_body(r#"<beans><import resource="greeter.xml"/></beans>"#)
            .create();
        let imported = server
            .mock("GET", "/conf/greeter.xml")
            .with_status(200)
            .with_body(r#"<beans><bean id="greeter" class="Greeter"><property name="greeting" value="remote"/></bean></beans>"#)
            .create();

        let context = XmlApplicationContext::file_system(&[format!("{}/conf/beans.xml", server.url())])?;
        assert_eq!(context.get_bean_as::<Greeter>("greeter")?.greeting, "remote");
        mock.assert();
        imported.assert();
        Ok(())
    }

    #[test]
    fn test_circular_references_disallowed() -> Result<()> {
        static CREATED: AtomicUsize = AtomicUsize::new(0);
        register_bean_factory("CycleNode", |_| {
            CREATED.fetch_add(1, Ordering::SeqCst);
            Ok(CreatedBean::new(()))
        })?;
        let dir = TempDir::new()?;
        write(
            dir.path(),
            "cycle.xml",
            r#"<beans>
                 <bean id="a" class="CycleNode"><property name="next" ref="b"/></bean>
                 <bean id="b" class="CycleNode" depends-on="a"/>
               </beans>"#,
        )?;
        let location = format!("file:{}", dir.path().join("cycle.xml").to_string_lossy());

        let mut context = XmlApplicationContext::file_system_with_refresh(&[&location], false)?;
        context.set_allow_circular_references(false);
        let err = context.refresh().err();
        assert!(matches!(
            err,
            Some(ContextError::Beans(BeansError::CircularReference { .. }))
        ));
        assert_eq!(CREATED.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[test]
    fn test_config_file_with_patterns() -> Result<()> {
        register_types()?;
        let dir = TempDir::new()?;
        write(dir.path(), "conf/10-base.xml", BASE_XML)?;
        write(dir.path(), "conf/20-override.xml", OVERRIDE_XML)?;
        write(
            dir.path(),
            "context.toml",
            &format!(
                r#"
config_locations = ["classpath:conf/*.xml"]
id = "patterns"

[resource_loader]
type = "FileSystemResourceLoader"
options = {{ class_path_roots = ["{}"] }}
"#,
                dir.path().to_string_lossy()
            ),
        )?;

        let config = XmlApplicationContextConfig::from_file(dir.path().join("context.toml"))?;
        let context = XmlApplicationContext::new(config)?;
        assert_eq!(context.get_bean_as::<ConnectionPool>("pool")?.url, "postgres://override");
        let factory: Arc<BeanFactory> = context.get_bean_factory()?;
        assert_eq!(factory.serialization_id().as_deref(), Some("patterns"));
        Ok(())
    }
}
