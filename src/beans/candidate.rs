use std::fmt::Debug;

use super::definition::BeanDefinition;

/// 决定一个定义能否参与按类型查找
pub trait AutowireCandidateResolver: Send + Sync + Debug {
    fn is_autowire_candidate(&self, definition: &BeanDefinition) -> bool;
}

/// 只看定义上的 `autowire-candidate` 标记
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleAutowireCandidateResolver;

impl AutowireCandidateResolver for SimpleAutowireCandidateResolver {
    fn is_autowire_candidate(&self, definition: &BeanDefinition) -> bool {
        definition.autowire_candidate
    }
}

/// 把所有定义都当作候选
#[derive(Debug, Default, Clone, Copy)]
pub struct AllCandidatesResolver;

impl AutowireCandidateResolver for AllCandidatesResolver {
    fn is_autowire_candidate(&self, _definition: &BeanDefinition) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolvers() {
        let excluded = BeanDefinition::new("a", "A").with_autowire_candidate(false);
        assert!(!SimpleAutowireCandidateResolver.is_autowire_candidate(&excluded));
        assert!(AllCandidatesResolver.is_autowire_candidate(&excluded));
        assert!(SimpleAutowireCandidateResolver.is_autowire_candidate(&BeanDefinition::new("b", "B")));
    }
}
