//! 配置相关的宏
//!
//! 注册表要求实现类型满足 `From<Config>` 以及 `Box<T>: Into<Box<dyn Trait>>`，
//! 这两个宏用来省掉样板代码

/// 为配置类型实现 `From<Config>`
///
/// - `impl_from!(ConfigType => Type)`：调用 `Type::new(config)`
/// - `impl_from!(ConfigType => Type, field: config)`：构造 `Self { config }`
#[macro_export]
macro_rules! impl_from {
    ($config_type:ty => $target_type:ty) => {
        impl From<$config_type> for $target_type {
            fn from(config: $config_type) -> Self {
                <$target_type>::new(config)
            }
        }
    };

    ($config_type:ty => $target_type:ty, field: $field:ident) => {
        impl From<$config_type> for $target_type {
            fn from(config: $config_type) -> Self {
                Self { $field: config }
            }
        }
    };
}

/// 为 `Box<T>` 实现到 `Box<dyn Trait>` 的转换
///
/// 用法：`impl_box_from!(Type => dyn TraitName)`
#[macro_export]
macro_rules! impl_box_from {
    ($source_type:ty => dyn $trait_name:path) => {
        impl From<Box<$source_type>> for Box<dyn $trait_name> {
            fn from(source: Box<$source_type>) -> Self {
                source as Box<dyn $trait_name>
            }
        }
    };
}
