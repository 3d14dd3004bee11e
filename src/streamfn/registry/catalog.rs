//! Function catalog generation and introspection.
//!
//! Utilities to generate documentation and answer "what kind of function is
//! this name" questions over a registry. The free functions operate on the
//! global registry; every helper is also available against an injected
//! [`FunctionRegistry`] for tests.

use super::{global, FunctionRegistry, FunctionType};

/// Generates a markdown documentation catalog of all registered functions,
/// organized by type tag with full metadata for each entry.
///
/// # Example
///
/// ```rust,ignore
/// let markdown = streamfn::registry::catalog::generate_function_catalog();
/// std::fs::write("docs/FUNCTION_CATALOG.md", markdown).unwrap();
/// ```
pub fn generate_function_catalog() -> String {
    generate_catalog_for(global())
}

/// Catalog generation against a specific registry.
pub fn generate_catalog_for(registry: &FunctionRegistry) -> String {
    let mut output = String::new();

    output.push_str("# Function Catalog\n\n");
    output.push_str("Auto-generated catalog of all registered functions.\n\n");

    let mut total = 0usize;
    for function_type in FunctionType::ALL {
        let funcs = registry.get_by_type(function_type);
        if funcs.is_empty() {
            continue;
        }
        total += funcs.len();

        output.push_str(&format!("## {} Functions\n\n", function_type));
        output.push_str("| Function | Aliases | Arity | Description |\n");
        output.push_str("|----------|---------|-------|-------------|\n");

        for func in &funcs {
            let meta = func.meta();
            let aliases = if meta.aliases.is_empty() {
                "-".to_string()
            } else {
                meta.aliases.join(", ")
            };
            let arity = match meta.max_args {
                Some(max) if max == meta.min_args => format!("{}", max),
                Some(max) => format!("{}-{}", meta.min_args, max),
                None => format!("{}+", meta.min_args),
            };
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                meta.name, aliases, arity, meta.description
            ));
        }
        output.push('\n');
    }

    output.push_str("---\n\n");
    output.push_str(&format!("**Total functions**: {}\n", total));
    output
}

/// Returns all resolvable names (aliases included) as a sorted list.
///
/// Useful for autocomplete, validation, and introspection.
pub fn all_function_names() -> Vec<String> {
    all_names_for(global())
}

/// Name listing against a specific registry.
pub fn all_names_for(registry: &FunctionRegistry) -> Vec<String> {
    let mut names: Vec<String> = registry.list_all().into_keys().collect();
    names.sort_unstable();
    names
}

/// Returns registered names matching a case-insensitive prefix.
pub fn find_functions_by_prefix(prefix: &str) -> Vec<String> {
    let prefix_lower = prefix.to_lowercase();
    all_function_names()
        .into_iter()
        .filter(|n| n.starts_with(&prefix_lower))
        .collect()
}

/// Returns a summary of function counts by type tag.
pub fn function_count_by_type() -> Vec<(FunctionType, usize)> {
    let registry = global();
    FunctionType::ALL
        .iter()
        .map(|&t| (t, registry.get_by_type(t).len()))
        .collect()
}

/// Check whether a name resolves to an aggregation function
/// (case-insensitive).
pub fn is_aggregate_function(name: &str) -> bool {
    global()
        .get(name)
        .map(|f| f.meta().function_type == FunctionType::Aggregation)
        .unwrap_or(false)
}

/// Check whether a name resolves to an analytical function
/// (case-insensitive).
pub fn is_analytic_function(name: &str) -> bool {
    global()
        .get(name)
        .map(|f| f.meta().function_type == FunctionType::Analytical)
        .unwrap_or(false)
}

/// Check whether a name resolves at all (case-insensitive).
pub fn is_valid_function(name: &str) -> bool {
    global().contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_catalog_lists_builtins() {
        let catalog = generate_function_catalog();
        assert!(catalog.contains("# Function Catalog"));
        assert!(catalog.contains("## Aggregation Functions"));
        assert!(catalog.contains("count"));
        assert!(catalog.contains("sum"));
        assert!(catalog.contains("**Total functions**"));
    }

    #[test]
    fn test_all_function_names_include_aliases() {
        let names = all_function_names();
        assert!(names.contains(&"count".to_string()));
        assert!(names.contains(&"ceiling".to_string())); // alias for ceil
        assert!(names.contains(&"mean".to_string())); // alias for avg
    }

    #[test]
    fn test_find_functions_by_prefix() {
        let stddev_funcs = find_functions_by_prefix("stddev");
        assert!(!stddev_funcs.is_empty());
        for name in &stddev_funcs {
            assert!(name.starts_with("stddev"));
        }
    }

    #[test]
    fn test_type_predicates() {
        assert!(is_aggregate_function("SUM"));
        assert!(is_aggregate_function("sum"));
        assert!(!is_aggregate_function("abs"));
        assert!(is_analytic_function("lag"));
        assert!(!is_analytic_function("sum"));
        assert!(is_valid_function("UPPER"));
        assert!(!is_valid_function("no_such_function"));
    }
}
