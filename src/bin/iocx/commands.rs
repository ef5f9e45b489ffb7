// Subcommand implementations

use anyhow::{anyhow, Result};
use colored::Colorize;

use iocx::beans::{is_bean_type_registered, BeanFactory};

use crate::cli::{CheckArgs, ListArgs, OutputFormat, ShowArgs};

pub fn execute_list(args: &ListArgs, factory: &BeanFactory) -> Result<()> {
    for name in factory.bean_definition_names() {
        let definition = factory.get_bean_definition(name)?;
        if !args.long {
            println!("{}", name);
            continue;
        }

        let aliases = factory.aliases_of(name);
        let mut line = format!(
            "{:<32} {:<24} {:<10} {}",
            name,
            definition.type_name,
            definition.scope,
            definition.resource_description.as_deref().unwrap_or("-")
        );
        if !aliases.is_empty() {
            line.push_str(&format!(" (aliases: {})", aliases.join(", ")));
        }
        println!("{}", line);
    }
    Ok(())
}

pub fn execute_show(args: &ShowArgs, factory: &BeanFactory) -> Result<()> {
    let definition = factory.get_bean_definition(&args.name)?;
    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(definition)?,
        OutputFormat::Yaml => serde_yaml::to_string(definition)?,
    };
    println!("{}", output);
    Ok(())
}

pub fn execute_check(args: &CheckArgs, factory: &BeanFactory) -> Result<()> {
    let mut errors = 0;

    for (bean, reference) in factory.unresolvable_references() {
        println!("{} bean '{}' references undefined bean '{}'", "error:".red(), bean, reference);
        errors += 1;
    }

    if let Err(err) = factory.check_reference_cycles() {
        println!("{} {}", "error:".red(), err);
        errors += 1;
    }

    for name in factory.bean_definition_names() {
        let definition = factory.get_bean_definition(name)?;
        if is_bean_type_registered(&definition.type_name) {
            continue;
        }
        if args.strict_types {
            println!("{} bean '{}' has unregistered type '{}'", "error:".red(), name, definition.type_name);
            errors += 1;
        } else {
            println!("{} bean '{}' has unregistered type '{}'", "warning:".yellow(), name, definition.type_name);
        }
    }

    if errors > 0 {
        return Err(anyhow!("{} problem(s) found in {} bean definitions", errors, factory.bean_definition_count()));
    }
    println!("{} {} bean definitions", "ok:".green(), factory.bean_definition_count());
    Ok(())
}
