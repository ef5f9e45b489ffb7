// 按 trait 分组的实现注册表
//
// 同一个 trait 可以注册多个实现，运行时通过 TypeOptions 中的名称选择

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::RwLock;

use super::type_options::TypeOptions;

// 返回值实际是 Box<Box<dyn Trait>>，通过 Any 擦除后再 downcast 回来
type TraitConstructor = Box<dyn Fn(JsonValue) -> Result<Box<dyn Any + Send + Sync>> + Send + Sync>;

// 外层 key 是 trait 的 TypeId，内层 key 是实现名称
static TRAIT_REGISTRY: Lazy<RwLock<HashMap<TypeId, HashMap<String, TraitConstructor>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// 为实现 `Trait` 的类型 `T` 注册构造函数
///
/// 同名重复注册会覆盖之前的构造函数
///
/// ```ignore
/// register_trait::<FileSystemResourceLoader, dyn ResourceLoader, FileSystemResourceLoaderConfig>(
///     "FileSystemResourceLoader",
/// )?;
/// ```
pub fn register_trait<T, Trait, Config>(type_name: &str) -> Result<()>
where
    T: Send + Sync + 'static,
    Trait: ?Sized + Send + Sync + 'static,
    Config: DeserializeOwned + Send + Sync + 'static,
    T: From<Config>,
    Box<T>: Into<Box<Trait>>,
{
    let constructor: TraitConstructor = Box::new(|value| {
        let config: Config = serde_json::from_value(value)?;
        let trait_object: Box<Trait> = Box::new(T::from(config)).into();
        Ok(Box::new(trait_object) as Box<dyn Any + Send + Sync>)
    });

    let mut registry = TRAIT_REGISTRY
        .write()
        .map_err(|_| anyhow!("Failed to acquire write lock"))?;
    registry
        .entry(TypeId::of::<Trait>())
        .or_default()
        .insert(type_name.to_string(), constructor);

    Ok(())
}

/// 根据 TypeOptions 创建 trait object
///
/// `options` 缺省（null）时按空对象处理，方便全部字段都有默认值的配置
pub fn create_trait_from_type_options<Trait>(type_options: &TypeOptions) -> Result<Box<Trait>>
where
    Trait: ?Sized + Send + Sync + 'static,
{
    let registry = TRAIT_REGISTRY
        .read()
        .map_err(|_| anyhow!("Failed to acquire read lock"))?;

    let constructor = registry
        .get(&TypeId::of::<Trait>())
        .and_then(|impls| impls.get(&type_options.type_name))
        .ok_or_else(|| anyhow!("Type '{}' not registered for this trait", type_options.type_name))?;

    let options = match &type_options.options {
        JsonValue::Null => JsonValue::Object(Default::default()),
        other => other.clone(),
    };

    constructor(options)?
        .downcast::<Box<Trait>>()
        .map(|boxed| *boxed)
        .map_err(|_| anyhow!("Failed to downcast to target trait type"))
}

/// 列出某个 trait 已注册的实现名称（排序后返回）
pub fn registered_names<Trait>() -> Vec<String>
where
    Trait: ?Sized + 'static,
{
    let Ok(registry) = TRAIT_REGISTRY.read() else {
        return Vec::new();
    };
    let mut names: Vec<String> = registry
        .get(&TypeId::of::<Trait>())
        .map(|impls| impls.keys().cloned().collect())
        .unwrap_or_default();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    #[derive(Debug, Clone, Deserialize)]
    struct PlainConfig {
        #[serde(default = "default_word")]
        word: String,
    }

    fn default_word() -> String {
        "hello".to_string()
    }

    struct Plain {
        word: String,
    }

    impl From<PlainConfig> for Plain {
        fn from(config: PlainConfig) -> Self {
            Self { word: config.word }
        }
    }

    impl Greeter for Plain {
        fn greet(&self) -> String {
            self.word.clone()
        }
    }

    crate::impl_box_from!(Plain => dyn Greeter);

    #[test]
    fn test_register_and_create() -> Result<()> {
        register_trait::<Plain, dyn Greeter, PlainConfig>("registry-test-plain")?;

        let opts = TypeOptions::new("registry-test-plain", serde_json::json!({ "word": "hi" }));
        let greeter: Box<dyn Greeter> = create_trait_from_type_options(&opts)?;
        assert_eq!(greeter.greet(), "hi");
        assert!(registered_names::<dyn Greeter>().contains(&"registry-test-plain".to_string()));
        Ok(())
    }

    #[test]
    fn test_null_options_use_defaults() -> Result<()> {
        register_trait::<Plain, dyn Greeter, PlainConfig>("registry-test-null")?;

        let opts = TypeOptions::new("registry-test-null", JsonValue::Null);
        let greeter: Box<dyn Greeter> = create_trait_from_type_options(&opts)?;
        assert_eq!(greeter.greet(), "hello");
        Ok(())
    }

    #[test]
    fn test_unregistered_type() {
        let opts = TypeOptions::new("registry-test-missing", JsonValue::Null);
        let result: Result<Box<dyn Greeter>> = create_trait_from_type_options(&opts);
        let message = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(message.contains("not registered"));
        assert!(message.contains("registry-test-missing"));
    }

    #[test]
    fn test_invalid_options() -> Result<()> {
        register_trait::<Plain, dyn Greeter, PlainConfig>("registry-test-invalid")?;

        let opts = TypeOptions::new("registry-test-invalid", serde_json::json!({ "word": 42 }));
        let result: Result<Box<dyn Greeter>> = create_trait_from_type_options(&opts);
        assert!(result.is_err());
        Ok(())
    }
}
