//! Function descriptor metadata.

use crate::streamfn::error::{FunctionError, FunctionResult};

/// Type tag grouping registered functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum FunctionType {
    /// Mathematical operations (ABS, SQRT, POWER, ...)
    Math,
    /// String manipulation (UPPER, LOWER, CONCAT, ...)
    String,
    /// Type conversion (TO_INT, TO_FLOAT, TO_STRING, ...)
    Conversion,
    /// Date/time operations
    DateTime,
    /// Incremental reducers (COUNT, SUM, AVG, STDDEV, ...)
    Aggregation,
    /// Window-position functions (WINDOW_START, WINDOW_END)
    Window,
    /// Per-row stateful functions (LAG, LATEST, HAD_CHANGED)
    Analytical,
    /// Ad-hoc functions registered at runtime
    Custom,
}

impl FunctionType {
    /// All type tags, in catalog display order.
    pub const ALL: [FunctionType; 8] = [
        FunctionType::Aggregation,
        FunctionType::Analytical,
        FunctionType::Window,
        FunctionType::Math,
        FunctionType::String,
        FunctionType::Conversion,
        FunctionType::DateTime,
        FunctionType::Custom,
    ];

    /// Display name used in the catalog and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionType::Math => "Math",
            FunctionType::String => "String",
            FunctionType::Conversion => "Conversion",
            FunctionType::DateTime => "DateTime",
            FunctionType::Aggregation => "Aggregation",
            FunctionType::Window => "Window",
            FunctionType::Analytical => "Analytical",
            FunctionType::Custom => "Custom",
        }
    }
}

impl std::fmt::Display for FunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable metadata describing one registered function.
///
/// Constructed once at registration time and never mutated afterwards.
/// `max_args == None` means unbounded arity (variadic functions such as
/// CONCAT).
#[derive(Debug, Clone, serde::Serialize)]
pub struct FunctionMeta {
    /// Primary function name (stored as given; lookup is case-insensitive)
    pub name: String,
    /// Type tag used for grouping and adapter installation
    pub function_type: FunctionType,
    /// Free-form category for documentation ("statistical", "trigonometry", ...)
    pub category: String,
    /// Alternative names resolving to the same function
    pub aliases: Vec<String>,
    /// Minimum argument count
    pub min_args: usize,
    /// Maximum argument count; `None` means unbounded
    pub max_args: Option<usize>,
    /// One-line description for the generated catalog
    pub description: String,
}

impl FunctionMeta {
    /// Create metadata for a single-argument function. Arity and aliases
    /// can be adjusted with the builder methods.
    pub fn new(
        name: &str,
        function_type: FunctionType,
        category: &str,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            function_type,
            category: category.to_string(),
            aliases: Vec::new(),
            min_args: 1,
            max_args: Some(1),
            description: description.to_string(),
        }
    }

    /// Set the alias list.
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Set the arity bounds. `None` for `max` means unbounded.
    pub fn with_arity(mut self, min: usize, max: Option<usize>) -> Self {
        self.min_args = min;
        self.max_args = max;
        self
    }

    /// Validate an argument count against the declared bounds.
    pub fn check_arity(&self, actual: usize) -> FunctionResult<()> {
        if actual < self.min_args || self.max_args.is_some_and(|max| actual > max) {
            return Err(FunctionError::arity(self, actual));
        }
        Ok(())
    }

    /// Primary name plus aliases, lowercased, as inserted into the registry.
    pub fn all_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(1 + self.aliases.len());
        names.push(self.name.to_lowercase());
        for alias in &self.aliases {
            names.push(alias.to_lowercase());
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_arity_bounds() {
        let meta = FunctionMeta::new("power", FunctionType::Math, "math", "x^y")
            .with_arity(2, Some(2));
        assert!(meta.check_arity(2).is_ok());
        assert!(meta.check_arity(1).is_err());
        assert!(meta.check_arity(3).is_err());
    }

    #[test]
    fn test_unbounded_arity() {
        let meta = FunctionMeta::new("concat", FunctionType::String, "string", "join")
            .with_arity(1, None);
        assert!(meta.check_arity(1).is_ok());
        assert!(meta.check_arity(64).is_ok());
        assert!(meta.check_arity(0).is_err());
    }

    #[test]
    fn test_all_names_lowercased() {
        let meta = FunctionMeta::new("CEIL", FunctionType::Math, "math", "round up")
            .with_aliases(&["CEILING"]);
        assert_eq!(meta.all_names(), vec!["ceil", "ceiling"]);
    }
}
