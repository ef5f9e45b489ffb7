// 把元素树解释为 bean 定义
//
// 严格模式下未知元素、未知属性、非法布尔值和作用域都是错误；宽松模式下记录警告后跳过

use glob::Pattern;

use super::document::Element;
use crate::beans::{BeanDefinition, BeansError, PropertyValue, Scope};

/// 文档中的一项声明，按出现顺序排列
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEntry {
    Bean(BeanDefinition),
    Alias { name: String, alias: String },
    Import { resource: String },
}

const BEANS_ATTRIBUTES: &[&str] = &["default-lazy-init", "default-autowire-candidates"];
const BEAN_ATTRIBUTES: &[&str] = &[
    "id",
    "name",
    "class",
    "scope",
    "lazy-init",
    "primary",
    "autowire-candidate",
    "depends-on",
];
const PROPERTY_ATTRIBUTES: &[&str] = &["name", "value", "ref"];
const CONSTRUCTOR_ARG_ATTRIBUTES: &[&str] = &["index", "value", "ref"];
const NAME_DELIMITERS: &[char] = &[',', ';', ' ', '\t', '\n'];

/// 解析一个文档的根元素
pub fn parse_document(
    root: &Element,
    resource: &str,
    validating: bool,
) -> Result<Vec<DocumentEntry>, BeansError> {
    DefinitionParser::new(resource, validating).parse(root)
}

pub(crate) fn split_names(value: &str) -> Vec<String> {
    value
        .split(NAME_DELIMITERS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

struct DefinitionParser<'a> {
    resource: &'a str,
    validating: bool,
    default_lazy_init: bool,
    autowire_candidate_patterns: Vec<Pattern>,
}

impl<'a> DefinitionParser<'a> {
    fn new(resource: &'a str, validating: bool) -> Self {
        Self {
            resource,
            validating,
            default_lazy_init: false,
            autowire_candidate_patterns: Vec::new(),
        }
    }

    fn error(&self, message: impl ToString) -> BeansError {
        BeansError::parse(self.resource, message)
    }

    /// 严格模式返回错误，宽松模式只记录警告
    fn violation(&self, message: String) -> Result<(), BeansError> {
        if self.validating {
            return Err(self.error(message));
        }
        log::warn!("Ignoring invalid content in {}: {}", self.resource, message);
        Ok(())
    }

    fn check_attributes(&self, element: &Element, allowed: &[&str]) -> Result<(), BeansError> {
        for (key, _) in &element.attributes {
            if !allowed.contains(&key.as_str()) {
                self.violation(format!("unknown attribute '{}' on <{}>", key, element.name))?;
            }
        }
        Ok(())
    }

    fn parse_bool(&self, element: &Element, attribute: &str, default: bool) -> Result<bool, BeansError> {
        match element.attribute(attribute) {
            None | Some("default") => Ok(default),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => {
                self.violation(format!(
                    "attribute '{}' on <{}> must be 'true' or 'false', got '{}'",
                    attribute, element.name, other
                ))?;
                Ok(default)
            }
        }
    }

    fn parse(mut self, root: &Element) -> Result<Vec<DocumentEntry>, BeansError> {
        if root.name != "beans" {
            return Err(self.error(format!("root element must be <beans>, found <{}>", root.name)));
        }
        self.check_attributes(root, BEANS_ATTRIBUTES)?;
        self.default_lazy_init = self.parse_bool(root, "default-lazy-init", false)?;
        if let Some(patterns) = root.attribute("default-autowire-candidates") {
            for pattern in split_names(patterns) {
                match Pattern::new(&pattern) {
                    Ok(pattern) => self.autowire_candidate_patterns.push(pattern),
                    Err(e) => self.violation(format!("invalid autowire candidate pattern '{}': {}", pattern, e))?,
                }
            }
        }

        let mut entries = Vec::new();
        for child in &root.children {
            match child.name.as_str() {
                "description" => {}
                "bean" => entries.push(DocumentEntry::Bean(self.parse_bean(child)?)),
                "alias" => entries.push(self.parse_alias(child)?),
                "import" => entries.push(self.parse_import(child)?),
                other => self.violation(format!("unknown element <{}> in <beans>", other))?,
            }
        }
        Ok(entries)
    }

    fn parse_alias(&self, element: &Element) -> Result<DocumentEntry, BeansError> {
        self.check_attributes(element, &["name", "alias"])?;
        match (element.attribute("name"), element.attribute("alias")) {
            (Some(name), Some(alias)) if !name.is_empty() && !alias.is_empty() => Ok(DocumentEntry::Alias {
                name: name.to_string(),
                alias: alias.to_string(),
            }),
            _ => Err(self.error("<alias> requires non-empty 'name' and 'alias' attributes")),
        }
    }

    fn parse_import(&self, element: &Element) -> Result<DocumentEntry, BeansError> {
        self.check_attributes(element, &["resource"])?;
        match element.attribute("resource") {
            Some(resource) if !resource.trim().is_empty() => Ok(DocumentEntry::Import {
                resource: resource.trim().to_string(),
            }),
            _ => Err(self.error("<import> requires a non-empty 'resource' attribute")),
        }
    }

    fn parse_bean(&self, element: &Element) -> Result<BeanDefinition, BeansError> {
        self.check_attributes(element, BEAN_ATTRIBUTES)?;

        let type_name = match element.attribute("class") {
            Some(class) if !class.trim().is_empty() => class.trim().to_string(),
            _ => {
                let id = element.attribute("id").unwrap_or("<anonymous>");
                return Err(self.error(format!("bean '{}' has no 'class' attribute", id)));
            }
        };

        // id 优先，否则取 name 的第一个，其余作为别名
        let mut aliases = element.attribute("name").map(split_names).unwrap_or_default();
        let name = match element.attribute("id").map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None if !aliases.is_empty() => aliases.remove(0),
            None => String::new(),
        };
        aliases.retain(|alias| alias != &name);

        let mut definition = BeanDefinition::new(name, type_name);
        definition.aliases = aliases;
        definition.resource_description = Some(self.resource.to_string());

        if let Some(scope) = element.attribute("scope") {
            match scope.parse::<Scope>() {
                Ok(scope) => definition.scope = scope,
                Err(e) => self.violation(e)?,
            }
        }
        definition.lazy_init = self.parse_bool(element, "lazy-init", self.default_lazy_init)?;
        definition.primary = self.parse_bool(element, "primary", false)?;
        definition.autowire_candidate = match element.attribute("autowire-candidate") {
            None | Some("default") => self.default_autowire_candidate(&definition.name),
            Some(_) => self.parse_bool(element, "autowire-candidate", true)?,
        };
        if let Some(depends_on) = element.attribute("depends-on") {
            definition.depends_on = split_names(depends_on);
        }

        let mut indexed_args: Vec<(Option<usize>, PropertyValue)> = Vec::new();
        for child in &element.children {
            match child.name.as_str() {
                "description" => definition.description = Some(child.text.clone()),
                "property" => {
                    let (name, value) = self.parse_property(child)?;
                    if definition.properties.contains_key(&name) {
                        self.violation(format!(
                            "property '{}' is specified more than once on bean '{}'",
                            name, definition.name
                        ))?;
                    }
                    definition.properties.insert(name, value);
                }
                "constructor-arg" => indexed_args.push(self.parse_constructor_arg(child)?),
                other => self.violation(format!("unknown element <{}> in <bean>", other))?,
            }
        }
        definition.constructor_args = self.order_constructor_args(&definition.name, indexed_args)?;

        Ok(definition)
    }

    fn default_autowire_candidate(&self, name: &str) -> bool {
        if self.autowire_candidate_patterns.is_empty() {
            return true;
        }
        self.autowire_candidate_patterns
            .iter()
            .any(|pattern| pattern.matches(name))
    }

    fn parse_property(&self, element: &Element) -> Result<(String, PropertyValue), BeansError> {
        self.check_attributes(element, PROPERTY_ATTRIBUTES)?;
        let name = match element.attribute("name") {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => return Err(self.error("<property> requires a 'name' attribute")),
        };
        let value = self.parse_value_source(element, &format!("property '{}'", name))?;
        Ok((name, value))
    }

    fn parse_constructor_arg(&self, element: &Element) -> Result<(Option<usize>, PropertyValue), BeansError> {
        self.check_attributes(element, CONSTRUCTOR_ARG_ATTRIBUTES)?;
        let index = match element.attribute("index") {
            Some(index) => Some(
                index
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| self.error(format!("constructor-arg index '{}' is not a number", index)))?,
            ),
            None => None,
        };
        let value = self.parse_value_source(element, "constructor-arg")?;
        Ok((index, value))
    }

    /// 构造参数要么全部带 index 且连续，要么全部不带
    fn order_constructor_args(
        &self,
        bean: &str,
        args: Vec<(Option<usize>, PropertyValue)>,
    ) -> Result<Vec<PropertyValue>, BeansError> {
        let indexed = args.iter().filter(|(index, _)| index.is_some()).count();
        if indexed == 0 {
            return Ok(args.into_iter().map(|(_, value)| value).collect());
        }
        if indexed != args.len() {
            return Err(self.error(format!(
                "bean '{}' mixes indexed and non-indexed constructor arguments",
                bean
            )));
        }

        let mut slots: Vec<Option<PropertyValue>> = vec![None; args.len()];
        for (index, value) in args {
            let index = index.unwrap_or_default();
            let Some(slot) = slots.get_mut(index) else {
                return Err(self.error(format!(
                    "bean '{}' constructor-arg index {} is out of range",
                    bean, index
                )));
            };
            if slot.is_some() {
                return Err(self.error(format!(
                    "bean '{}' has duplicate constructor-arg index {}",
                    bean, index
                )));
            }
            *slot = Some(value);
        }
        Ok(slots.into_iter().flatten().collect())
    }

    /// `value` 属性、`ref` 属性或一个子元素，三者取其一
    fn parse_value_source(&self, element: &Element, owner: &str) -> Result<PropertyValue, BeansError> {
        let mut sources = Vec::new();
        if let Some(value) = element.attribute("value") {
            sources.push(PropertyValue::literal(value));
        }
        if let Some(reference) = element.attribute("ref") {
            sources.push(PropertyValue::reference(reference.trim()));
        }
        for child in &element.children {
            if child.name == "description" {
                continue;
            }
            if let Some(value) = self.parse_value_element(child)? {
                sources.push(value);
            }
        }

        if sources.len() > 1 {
            self.violation(format!("{} must have exactly one value source, found {}", owner, sources.len()))?;
        }
        match sources.into_iter().next() {
            Some(value) => Ok(value),
            None => Err(self.error(format!("{} has no value", owner))),
        }
    }

    fn parse_value_element(&self, element: &Element) -> Result<Option<PropertyValue>, BeansError> {
        match element.name.as_str() {
            "value" => {
                self.check_attributes(element, &[])?;
                Ok(Some(PropertyValue::literal(&element.text)))
            }
            "ref" => {
                self.check_attributes(element, &["bean"])?;
                match element.attribute("bean") {
                    Some(bean) if !bean.trim().is_empty() => {
                        Ok(Some(PropertyValue::reference(bean.trim())))
                    }
                    _ => Err(self.error("<ref> requires a 'bean' attribute")),
                }
            }
            "null" => Ok(Some(PropertyValue::Null)),
            "list" => {
                self.check_attributes(element, &[])?;
                let mut items = Vec::new();
                for child in &element.children {
                    if let Some(value) = self.parse_value_element(child)? {
                        items.push(value);
                    }
                }
                Ok(Some(PropertyValue::List(items)))
            }
            other => {
                self.violation(format!("unknown value element <{}>", other))?;
                Ok(None)
            }
        }
    }
}
