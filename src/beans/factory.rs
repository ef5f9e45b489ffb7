// 定义注册表
//
// 发布前通过 &mut self 填充定义，发布后只读；单例缓存和销毁回调由内部锁保护

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use super::bean_context::BeanContext;
use super::candidate::{AutowireCandidateResolver, SimpleAutowireCandidateResolver};
use super::definition::BeanDefinition;
use super::error::BeansError;
use super::lookup::BeanLookup;
use super::type_registry::{bean_constructor, BeanInstance, DestroyCallback};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// bean 工厂：名称到定义的映射、别名、单例缓存和销毁回调
pub struct BeanFactory {
    definitions: HashMap<String, BeanDefinition>,
    // 注册顺序，覆盖时保持原位置
    definition_names: Vec<String>,
    // 别名 => 名称
    aliases: HashMap<String, String>,
    allow_definition_overriding: bool,
    allow_circular_references: bool,
    candidate_resolver: Arc<dyn AutowireCandidateResolver>,
    parents: Vec<Arc<dyn BeanLookup>>,
    serialization_id: RwLock<Option<String>>,
    singletons: Mutex<HashMap<String, BeanInstance>>,
    disposables: Mutex<Vec<(String, DestroyCallback)>>,
    // destroy_singletons 之后拒绝创建
    destroyed: AtomicBool,
}

impl Default for BeanFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BeanFactory {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            definition_names: Vec::new(),
            aliases: HashMap::new(),
            allow_definition_overriding: true,
            allow_circular_references: true,
            candidate_resolver: Arc::new(SimpleAutowireCandidateResolver),
            parents: Vec::new(),
            serialization_id: RwLock::new(None),
            singletons: Mutex::new(HashMap::new()),
            disposables: Mutex::new(Vec::new()),
            destroyed: AtomicBool::new(false),
        }
    }

    /// 查找链中的父容器，按顺序询问
    pub fn with_parents(parents: Vec<Arc<dyn BeanLookup>>) -> Self {
        Self {
            parents,
            ..Self::new()
        }
    }

    pub fn add_parent(&mut self, parent: Arc<dyn BeanLookup>) {
        self.parents.push(parent);
    }

    pub fn parents(&self) -> &[Arc<dyn BeanLookup>] {
        &self.parents
    }

    pub fn set_allow_definition_overriding(&mut self, allow: bool) {
        self.allow_definition_overriding = allow;
    }

    pub fn is_allow_definition_overriding(&self) -> bool {
        self.allow_definition_overriding
    }

    pub fn set_allow_circular_references(&mut self, allow: bool) {
        self.allow_circular_references = allow;
    }

    pub fn is_allow_circular_references(&self) -> bool {
        self.allow_circular_references
    }

    pub fn set_autowire_candidate_resolver(&mut self, resolver: Arc<dyn AutowireCandidateResolver>) {
        self.candidate_resolver = resolver;
    }

    pub fn autowire_candidate_resolver(&self) -> &Arc<dyn AutowireCandidateResolver> {
        &self.candidate_resolver
    }

    pub fn set_serialization_id(&self, id: Option<String>) {
        let mut guard = self
            .serialization_id
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = id;
    }

    pub fn serialization_id(&self) -> Option<String> {
        self.serialization_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 注册定义
    ///
    /// 同名定义已存在时：允许覆盖则原位替换（保持注册顺序），否则返回 `DuplicateDefinition`
    pub fn register_bean_definition(&mut self, definition: BeanDefinition) -> Result<(), BeansError> {
        let name = definition.name.clone();
        if name.is_empty() {
            return Err(BeansError::parse(definition.source(), "bean name must not be empty"));
        }
        if definition.type_name.is_empty() {
            return Err(BeansError::parse(
                definition.source(),
                format!("bean '{}' has no type", name),
            ));
        }

        match self.definitions.get(&name) {
            Some(existing) if !self.allow_definition_overriding => {
                return Err(BeansError::DuplicateDefinition {
                    name,
                    resource: definition.source(),
                    existing: existing.source(),
                });
            }
            Some(existing) => {
                log::info!(
                    "Overriding bean definition for bean '{}': replacing definition from {} with definition from {}",
                    name,
                    existing.source(),
                    definition.source()
                );
                self.singletons.get_mut().unwrap_or_else(PoisonError::into_inner).remove(&name);
            }
            None => {
                if self.aliases.remove(&name).is_some() {
                    log::debug!("Bean definition '{}' replaces an alias of the same name", name);
                }
                self.definition_names.push(name.clone());
            }
        }

        let aliases = definition.aliases.clone();
        self.definitions.insert(name.clone(), definition);
        for alias in aliases {
            self.register_alias(&name, &alias)?;
        }
        Ok(())
    }

    /// 注册别名，别名不能形成环
    pub fn register_alias(&mut self, name: &str, alias: &str) -> Result<(), BeansError> {
        if alias == name {
            self.aliases.remove(alias);
            return Ok(());
        }
        if let Some(existing) = self.aliases.get(alias) {
            if existing == name {
                return Ok(());
            }
            if !self.allow_definition_overriding {
                return Err(BeansError::DuplicateDefinition {
                    name: alias.to_string(),
                    resource: format!("alias for bean '{}'", name),
                    existing: format!("alias for bean '{}'", existing),
                });
            }
            log::info!(
                "Overriding alias '{}' for bean '{}' with new target '{}'",
                alias,
                existing,
                name
            );
        }
        if self.canonical_name(name) == alias {
            return Err(BeansError::CircularReference {
                chain: vec![alias.to_string(), name.to_string(), alias.to_string()],
            });
        }
        self.aliases.insert(alias.to_string(), name.to_string());
        Ok(())
    }

    /// 解析别名得到定义名称
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        let mut current = name;
        // 别名注册时已保证无环，这里的上限只是防御
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(target) => current = target,
                None => break,
            }
        }
        current
    }

    pub fn aliases_of(&self, name: &str) -> Vec<String> {
        let mut aliases: Vec<String> = self
            .aliases
            .keys()
            .filter(|alias| self.canonical_name(alias) == name)
            .cloned()
            .collect();
        aliases.sort();
        aliases
    }

    pub fn contains_bean_definition(&self, name: &str) -> bool {
        self.definitions.contains_key(self.canonical_name(name))
    }

    pub fn get_bean_definition(&self, name: &str) -> Result<&BeanDefinition, BeansError> {
        self.definitions
            .get(self.canonical_name(name))
            .ok_or_else(|| BeansError::NoSuchBean {
                name: name.to_string(),
            })
    }

    /// 定义名称，按注册顺序
    pub fn bean_definition_names(&self) -> &[String] {
        &self.definition_names
    }

    pub fn bean_definition_count(&self) -> usize {
        self.definition_names.len()
    }

    /// 指定类型的全部定义名称，按注册顺序
    pub fn bean_names_for_type(&self, type_name: &str) -> Vec<String> {
        self.definition_names
            .iter()
            .filter(|name| {
                self.definitions
                    .get(*name)
                    .is_some_and(|definition| definition.type_name == type_name)
            })
            .cloned()
            .collect()
    }

    /// 本地定义、已创建的单例或任一父容器中存在该名称
    pub fn contains_bean(&self, name: &str) -> bool {
        let name = self.canonical_name(name);
        self.definitions.contains_key(name)
            || lock(&self.singletons).contains_key(name)
            || self.parents.iter().any(|parent| parent.contains_bean(name))
    }

    pub fn contains_singleton(&self, name: &str) -> bool {
        lock(&self.singletons).contains_key(self.canonical_name(name))
    }

    pub fn singleton_count(&self) -> usize {
        lock(&self.singletons).len()
    }

    pub fn get_bean(&self, name: &str) -> Result<BeanInstance, BeansError> {
        self.do_get_bean(name, &mut Vec::new())
    }

    pub fn get_bean_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, BeansError> {
        self.get_bean(name)?
            .downcast::<T>()
            .map_err(|_| BeansError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// 按类型获取唯一的候选 bean，多个候选时取 primary
    pub fn get_bean_by_type(&self, type_name: &str) -> Result<BeanInstance, BeansError> {
        let name = self.resolve_candidate(type_name)?;
        self.get_bean(&name)
    }

    pub fn resolve_candidate(&self, type_name: &str) -> Result<String, BeansError> {
        let candidates: Vec<String> = self
            .bean_names_for_type(type_name)
            .into_iter()
            .filter(|name| {
                self.definitions
                    .get(name)
                    .is_some_and(|definition| self.candidate_resolver.is_autowire_candidate(definition))
            })
            .collect();
        if candidates.len() == 1 {
            return Ok(candidates[0].clone());
        }

        let primaries: Vec<&String> = candidates
            .iter()
            .filter(|name| self.definitions.get(*name).is_some_and(|definition| definition.primary))
            .collect();
        match primaries.as_slice() {
            [primary] => Ok((*primary).clone()),
            _ => Err(BeansError::NoUniqueBean {
                type_name: type_name.to_string(),
                candidates,
            }),
        }
    }

    pub(crate) fn do_get_bean(
        &self,
        name: &str,
        chain: &mut Vec<String>,
    ) -> Result<BeanInstance, BeansError> {
        let name = self.canonical_name(name);
        let Some(definition) = self.definitions.get(name) else {
            if let Some(instance) = lock(&self.singletons).get(name) {
                return Ok(instance.clone());
            }
            return self.get_bean_from_parents(name);
        };

        if definition.is_singleton() {
            if let Some(instance) = lock(&self.singletons).get(name) {
                return Ok(instance.clone());
            }
        }

        if let Some(start) = chain.iter().position(|current| current == name) {
            let mut cycle = chain[start..].to_vec();
            cycle.push(name.to_string());
            return Err(BeansError::CircularReference { chain: cycle });
        }

        if self.is_destroyed() {
            return Err(BeansError::CreationNotAllowed {
                name: name.to_string(),
            });
        }

        chain.push(name.to_string());
        let result = self.create_bean(name, definition, chain);
        chain.pop();
        result
    }

    fn get_bean_from_parents(&self, name: &str) -> Result<BeanInstance, BeansError> {
        for parent in &self.parents {
            match parent.get_bean(name) {
                Ok(instance) => return Ok(instance),
                Err(BeansError::NoSuchBean { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(BeansError::NoSuchBean {
            name: name.to_string(),
        })
    }

    fn create_bean(
        &self,
        name: &str,
        definition: &BeanDefinition,
        chain: &mut Vec<String>,
    ) -> Result<BeanInstance, BeansError> {
        log::debug!("Creating instance of bean '{}'", name);

        for dependency in &definition.depends_on {
            self.do_get_bean(dependency, chain)?;
        }
        // 原型引用由构造函数按需获取，其余引用先创建出来
        for reference in definition.references() {
            let is_prototype = self
                .definitions
                .get(self.canonical_name(reference))
                .is_some_and(BeanDefinition::is_prototype);
            if !is_prototype {
                self.do_get_bean(reference, chain)?;
            }
        }

        let constructor =
            bean_constructor(&definition.type_name).ok_or_else(|| BeansError::UnknownType {
                name: name.to_string(),
                type_name: definition.type_name.clone(),
            })?;
        let options = definition
            .options()
            .map_err(|message| BeansError::creation(name, message))?;
        let ctx = BeanContext::new(name, definition, self, options, chain.clone());
        let created = constructor(&ctx).map_err(|err| match err.downcast::<BeansError>() {
            Ok(err) => err,
            Err(err) => BeansError::creation(name, format!("{:#}", err)),
        })?;

        if !definition.is_singleton() {
            if created.destroy.is_some() {
                log::debug!("Ignoring destroy callback of prototype bean '{}'", name);
            }
            return Ok(created.instance);
        }

        let mut singletons = lock(&self.singletons);
        // 创建期间工厂被销毁，新实例不能留下来
        if self.is_destroyed() {
            drop(singletons);
            if let Some(destroy) = created.destroy {
                run_destroy(name, destroy);
            }
            return Err(BeansError::CreationNotAllowed {
                name: name.to_string(),
            });
        }
        if let Some(existing) = singletons.get(name) {
            // 并发创建时先写入的实例胜出，丢弃当前实例
            let existing = existing.clone();
            drop(singletons);
            if let Some(destroy) = created.destroy {
                run_destroy(name, destroy);
            }
            return Ok(existing);
        }
        singletons.insert(name.to_string(), created.instance.clone());
        // 持有单例锁时登记回调，销毁时不会漏掉
        if let Some(destroy) = created.destroy {
            lock(&self.disposables).push((name.to_string(), destroy));
        }
        drop(singletons);
        Ok(created.instance)
    }

    /// 创建所有非延迟的单例，按注册顺序
    ///
    /// 不允许循环引用时，先对整个引用图做检查，有环则不创建任何 bean
    pub fn preinstantiate_singletons(&self) -> Result<(), BeansError> {
        if !self.allow_circular_references {
            self.check_reference_cycles()?;
        }
        log::debug!("Pre-instantiating singletons in {:?}", self);
        for name in &self.definition_names {
            let Some(definition) = self.definitions.get(name) else {
                continue;
            };
            if definition.is_singleton() && !definition.lazy_init {
                self.get_bean(name)?;
            }
        }
        Ok(())
    }

    /// 检查本地定义之间的引用和 depends-on 是否成环
    pub fn check_reference_cycles(&self) -> Result<(), BeansError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            factory: &'a BeanFactory,
            name: &'a str,
            marks: &mut HashMap<&'a str, Mark>,
            path: &mut Vec<&'a str>,
        ) -> Result<(), BeansError> {
            match marks.get(name) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|current| *current == name).unwrap_or(0);
                    let mut chain: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                    chain.push(name.to_string());
                    return Err(BeansError::CircularReference { chain });
                }
                None => {}
            }
            let Some(definition) = factory.definitions.get(name) else {
                return Ok(());
            };

            marks.insert(name, Mark::Visiting);
            path.push(name);
            for dependency in definition.dependencies() {
                let dependency = factory.canonical_name(dependency);
                if factory.definitions.contains_key(dependency) {
                    visit(factory, dependency, marks, path)?;
                }
            }
            path.pop();
            marks.insert(name, Mark::Done);
            Ok(())
        }

        let mut marks = HashMap::new();
        let mut path = Vec::new();
        for name in &self.definition_names {
            visit(self, name, &mut marks, &mut path)?;
        }
        Ok(())
    }

    /// 本地和父容器中都找不到的引用，返回 (bean, 引用) 对
    pub fn unresolvable_references(&self) -> Vec<(String, String)> {
        let mut missing = Vec::new();
        for name in &self.definition_names {
            let Some(definition) = self.definitions.get(name) else {
                continue;
            };
            for dependency in definition.dependencies() {
                if !self.contains_bean(dependency) {
                    missing.push((name.clone(), dependency.to_string()));
                }
            }
        }
        missing
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// 按创建顺序的逆序调用销毁回调并清空单例缓存，回调失败只记录日志
    ///
    /// 之后工厂不再创建 bean，`get_bean` 返回 `CreationNotAllowed`
    pub fn destroy_singletons(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
        let callbacks = {
            let mut singletons = lock(&self.singletons);
            singletons.clear();
            std::mem::take(&mut *lock(&self.disposables))
        };
        for (name, destroy) in callbacks.into_iter().rev() {
            run_destroy(&name, destroy);
        }
    }
}

fn run_destroy(name: &str, destroy: DestroyCallback) {
    log::debug!("Invoking destroy callback of bean '{}'", name);
    if let Err(err) = destroy() {
        log::warn!("Destroy callback of bean '{}' failed: {:#}", name, err);
    }
}

impl fmt::Debug for BeanFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanFactory")
            .field("serialization_id", &self.serialization_id())
            .field("definitions", &self.definition_names)
            .field("parents", &self.parents.len())
            .finish()
    }
}

impl BeanLookup for BeanFactory {
    fn contains_bean(&self, name: &str) -> bool {
        BeanFactory::contains_bean(self, name)
    }

    fn get_bean(&self, name: &str) -> Result<BeanInstance, BeansError> {
        BeanFactory::get_bean(self, name)
    }
}
