// 可刷新容器
//
// 每次刷新先撤下并销毁旧注册表，再私有地构建新注册表，成功后原子发布。
// 读者通过 ArcSwapOption 看到完整的旧注册表、完整的新注册表或者没有注册表。
// 刷新和关闭由 lifecycle 锁串行化，状态锁只在状态切换时持有

use arc_swap::ArcSwapOption;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::error::ContextError;
use crate::beans::{AutowireCandidateResolver, BeanFactory, BeanInstance, BeanLookup, BeansError};

static CONTEXT_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 向新建的注册表填充定义
pub trait DefinitionLoader: Send + Sync {
    fn load_bean_definitions(&self, factory: &mut BeanFactory) -> Result<(), BeansError>;
}

impl<F> DefinitionLoader for F
where
    F: Fn(&mut BeanFactory) -> Result<(), BeansError> + Send + Sync,
{
    fn load_bean_definitions(&self, factory: &mut BeanFactory) -> Result<(), BeansError> {
        self(factory)
    }
}

/// 容器状态
///
/// `Uninitialized -> Active -> Closed`，`Active` 可以重复刷新；刷新失败回到 `Uninitialized`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Uninitialized,
    Active,
    Closed,
}

/// 持有注册表并管理其生命周期的容器
pub struct RefreshableContext<L: DefinitionLoader> {
    id: String,
    display_name: String,
    allow_bean_definition_overriding: Option<bool>,
    allow_circular_references: Option<bool>,
    candidate_resolver: Option<Arc<dyn AutowireCandidateResolver>>,
    parents: Vec<Arc<dyn BeanLookup>>,
    eager_init: bool,
    loader: L,
    bean_factory: ArcSwapOption<BeanFactory>,
    lifecycle: Mutex<()>,
    state: Mutex<ContextState>,
}

impl<L: DefinitionLoader> RefreshableContext<L> {
    pub fn new(loader: L) -> Self {
        let id = format!("context-{}", CONTEXT_COUNTER.fetch_add(1, Ordering::Relaxed));
        Self {
            display_name: id.clone(),
            id,
            allow_bean_definition_overriding: None,
            allow_circular_references: None,
            candidate_resolver: None,
            parents: Vec::new(),
            eager_init: true,
            loader,
            bean_factory: ArcSwapOption::empty(),
            lifecycle: Mutex::new(()),
            state: Mutex::new(ContextState::Uninitialized),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 下次刷新时作为注册表的序列化 id
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }

    /// 未设置时使用注册表的默认值（允许）
    pub fn set_allow_bean_definition_overriding(&mut self, allow: bool) {
        self.allow_bean_definition_overriding = Some(allow);
    }

    pub fn set_allow_circular_references(&mut self, allow: bool) {
        self.allow_circular_references = Some(allow);
    }

    pub fn set_autowire_candidate_resolver(&mut self, resolver: Arc<dyn AutowireCandidateResolver>) {
        self.candidate_resolver = Some(resolver);
    }

    /// 追加一个父容器，查找链按添加顺序询问
    pub fn add_parent(&mut self, parent: Arc<dyn BeanLookup>) {
        self.parents.push(parent);
    }

    pub fn parents(&self) -> &[Arc<dyn BeanLookup>] {
        &self.parents
    }

    /// 关闭后刷新时不再预先创建单例
    pub fn set_eager_init(&mut self, eager_init: bool) {
        self.eager_init = eager_init;
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    pub fn state(&self) -> ContextState {
        *lock(&self.state)
    }

    pub fn is_active(&self) -> bool {
        self.state() == ContextState::Active
    }

    fn set_state(&self, state: ContextState) {
        *lock(&self.state) = state;
    }

    /// 销毁旧注册表，构建并发布新注册表
    ///
    /// 构建期间状态为 `Uninitialized`，失败时不保留任何注册表
    pub fn refresh(&self) -> Result<(), ContextError> {
        let _lifecycle = lock(&self.lifecycle);
        if self.state() == ContextState::Closed {
            return Err(ContextError::IllegalState(format!(
                "{} has been closed already and cannot be refreshed",
                self.display_name
            )));
        }

        log::info!("Refreshing {}", self.display_name);
        self.release_bean_factory();
        self.set_state(ContextState::Uninitialized);

        match self.build_bean_factory() {
            Ok(factory) => {
                log::debug!(
                    "Publishing bean factory for {} with {} bean definitions",
                    self.display_name,
                    factory.bean_definition_count()
                );
                self.bean_factory.store(Some(Arc::new(factory)));
                self.set_state(ContextState::Active);
                Ok(())
            }
            Err(err) => {
                log::warn!("Refresh of {} failed: {}", self.display_name, err);
                Err(ContextError::from_refresh(&self.display_name, err))
            }
        }
    }

    /// 构建新注册表：创建、设置序列化 id、定制、加载定义、预先创建单例
    ///
    /// 结果只有在返回后才会被发布
    fn build_bean_factory(&self) -> Result<BeanFactory, BeansError> {
        let mut factory = BeanFactory::with_parents(self.parents.clone());
        factory.set_serialization_id(Some(self.id.clone()));
        self.customize_bean_factory(&mut factory);

        let populated = self.loader.load_bean_definitions(&mut factory).and_then(|()| {
            if self.eager_init {
                factory.preinstantiate_singletons()
            } else {
                Ok(())
            }
        });
        if let Err(err) = populated {
            self.cancel_refresh(&factory);
            return Err(err);
        }
        Ok(factory)
    }

    fn customize_bean_factory(&self, factory: &mut BeanFactory) {
        if let Some(allow) = self.allow_bean_definition_overriding {
            factory.set_allow_definition_overriding(allow);
        }
        if let Some(allow) = self.allow_circular_references {
            factory.set_allow_circular_references(allow);
        }
        if let Some(resolver) = &self.candidate_resolver {
            factory.set_autowire_candidate_resolver(resolver.clone());
        }
    }

    fn cancel_refresh(&self, factory: &BeanFactory) {
        factory.destroy_singletons();
        factory.set_serialization_id(None);
    }

    /// 先撤下再销毁，仍持有旧注册表的读者无法再创建 bean
    fn release_bean_factory(&self) {
        if let Some(factory) = self.bean_factory.swap(None) {
            factory.destroy_singletons();
            factory.set_serialization_id(None);
        }
    }

    /// 销毁单例并释放注册表，重复调用无副作用
    pub fn close(&self) {
        let _lifecycle = lock(&self.lifecycle);
        if self.state() == ContextState::Closed {
            return;
        }
        log::info!("Closing {}", self.display_name);
        self.release_bean_factory();
        self.set_state(ContextState::Closed);
    }

    pub fn has_bean_factory(&self) -> bool {
        self.bean_factory.load().is_some()
    }

    /// 当前发布的注册表
    pub fn get_bean_factory(&self) -> Result<Arc<BeanFactory>, ContextError> {
        self.bean_factory.load_full().ok_or_else(|| {
            ContextError::IllegalState(format!(
                "BeanFactory not initialized or already closed: call 'refresh' before accessing beans via {}",
                self.display_name
            ))
        })
    }

    pub fn get_bean(&self, name: &str) -> Result<BeanInstance, ContextError> {
        Ok(self.get_bean_factory()?.get_bean(name)?)
    }

    pub fn get_bean_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ContextError> {
        Ok(self.get_bean_factory()?.get_bean_as::<T>(name)?)
    }

    pub fn contains_bean(&self, name: &str) -> bool {
        self.bean_factory
            .load()
            .as_ref()
            .is_some_and(|factory| factory.contains_bean(name))
    }
}

impl<L: DefinitionLoader> Drop for RefreshableContext<L> {
    fn drop(&mut self) {
        let state = *self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if state == ContextState::Active {
            self.release_bean_factory();
        }
    }
}

impl<L: DefinitionLoader> fmt::Debug for RefreshableContext<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshableContext")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("state", &self.state())
            .finish()
    }
}

/// 未激活的容器对查找链表现为不包含任何 bean
impl<L: DefinitionLoader> BeanLookup for RefreshableContext<L> {
    fn contains_bean(&self, name: &str) -> bool {
        RefreshableContext::contains_bean(self, name)
    }

    fn get_bean(&self, name: &str) -> Result<BeanInstance, BeansError> {
        match self.bean_factory.load_full() {
            Some(factory) => factory.get_bean(name),
            None => Err(BeansError::NoSuchBean {
                name: name.to_string(),
            }),
        }
    }
}
