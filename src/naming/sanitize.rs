//! Symbol name sanitization
//!
//! Converts a raw symbol such as `std::vector<int>::push_back(int const&)` into a name made
//! only of `[a-zA-Z0-9_]`. Structural parts (parameter lists, template arguments) are removed
//! before any character filtering so their contents never leak into the result.
//!
//! Bracket removal is a non-greedy regex match, not a parser: nested templates such as
//! `map<int, vector<int>>` only lose the span up to the first closing bracket.

use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

static DEFAULT_SANITIZER: LazyLock<Sanitizer> = LazyLock::new(Sanitizer::default);

/// Sanitize a raw symbol with the shared default [`Sanitizer`]
pub fn sanitize(raw: &str) -> String {
    DEFAULT_SANITIZER.sanitize(raw)
}

/// Compiled patterns for the sanitization pipeline
pub struct Sanitizer {
    /// `Class::~Class()` at the start of the symbol, ASCII class names only
    destructor: Regex,
    /// Shortest parenthesized span
    parameters: Regex,
    /// Shortest angle-bracketed span
    template_args: Regex,
    /// Anything outside the identifier alphabet
    invalid_chars: Regex,
    /// Two or more underscores
    underscore_runs: Regex,
}

impl Sanitizer {
    /// Compile the sanitization patterns
    pub fn new() -> Result<Self> {
        Ok(Self {
            destructor: Regex::new(r"^([A-Za-z0-9_]+)::~([A-Za-z0-9_]+)\s*\(\)")?,
            parameters: Regex::new(r"\(.*?\)")?,
            template_args: Regex::new(r"<.*?>")?,
            invalid_chars: Regex::new(r"[^a-zA-Z0-9_]")?,
            underscore_runs: Regex::new(r"__+")?,
        })
    }

    /// Run the full pipeline on a raw symbol
    ///
    /// Never fails. Input made only of punctuation yields an empty string.
    pub fn sanitize(&self, raw: &str) -> String {
        if let Some(class) = self.destructor_class(raw) {
            return format!("{}_destructor", class);
        }

        let name = self.parameters.replace_all(raw, "");
        let name = self.template_args.replace_all(&name, "");

        let name = name
            .replace("::", "_")
            .replace('*', "ptr")
            .replace('&', "ref");

        let name = self.invalid_chars.replace_all(name.trim(), "_");
        let name = self.underscore_runs.replace_all(&name, "_");

        name.trim_matches('_').to_string()
    }

    /// Class name of a `Class::~Class()` destructor, if `raw` starts with one
    pub fn destructor_class<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let captures = self.destructor.captures(raw)?;
        let class = captures.get(1)?.as_str();
        let dtor = captures.get(2)?.as_str();

        (class == dtor).then_some(class)
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new().expect("Failed to compile sanitizer patterns")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_identifier_safe(name: &str) {
        assert!(
            name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
            "unexpected character in {:?}",
            name
        );
        assert!(!name.contains("__"), "underscore run in {:?}", name);
        assert!(!name.starts_with('_'), "leading underscore in {:?}", name);
        assert!(!name.ends_with('_'), "trailing underscore in {:?}", name);
    }

    #[test]
    fn test_destructor() {
        assert_eq!(sanitize("MyClass::~MyClass()"), "MyClass_destructor");
        assert_eq!(sanitize("A::~A()"), "A_destructor");
        assert_eq!(sanitize("Widget::~Widget ()"), "Widget_destructor");
        assert_eq!(sanitize("Widget::~Widget() const"), "Widget_destructor");
    }

    #[test]
    fn test_destructor_requires_matching_class() {
        let sanitizer = Sanitizer::new().unwrap();
        assert_eq!(sanitizer.destructor_class("Foo::~Foo()"), Some("Foo"));
        assert_eq!(sanitizer.destructor_class("Foo::~Bar()"), None);
        assert_eq!(sanitizer.destructor_class("Foo::~Foobar()"), None);
        assert_eq!(sanitizer.destructor_class("Foo::~Foo(int)"), None);

        assert_eq!(sanitize("Foo::~Bar()"), "Foo_Bar");
    }

    #[test]
    fn test_non_ascii_destructor_is_filtered() {
        assert_eq!(Sanitizer::new().unwrap().destructor_class("Gr\u{f6}\u{df}e::~Gr\u{f6}\u{df}e()"), None);
        assert_eq!(sanitize("Gr\u{f6}\u{df}e::~Gr\u{f6}\u{df}e()"), "Gr_e_Gr_e");
    }

    #[test]
    fn test_nested_scope_destructor_is_structural() {
        // Only a destructor at the start of the symbol short-circuits
        assert_eq!(sanitize("ns::Foo::~Foo()"), "ns_Foo_Foo");
    }

    #[test]
    fn test_parameter_list_removed() {
        assert_eq!(sanitize("Foo::Bar(int)"), "Foo_Bar");
        assert_eq!(sanitize("process(char const*, unsigned long)"), "process");
        assert_eq!(sanitize("init()"), "init");
    }

    #[test]
    fn test_every_parameter_span_removed() {
        assert_eq!(sanitize("operator()(int)"), "operator");
        assert_eq!(sanitize("f(a)g(b)"), "fg");
    }

    #[test]
    fn test_nested_parentheses_not_balanced() {
        // The first ')' closes the match, leaving the outer tail behind
        assert_eq!(sanitize("f(g(x), y)"), "f_y");
    }

    #[test]
    fn test_template_arguments_removed() {
        assert_eq!(sanitize("std::vector<int>::push_back"), "std_vector_push_back");
        assert_eq!(sanitize("Pool<Node, 16>::alloc()"), "Pool_alloc");
    }

    #[test]
    fn test_nested_templates_keep_first_match_behavior() {
        assert_eq!(
            sanitize("std::map<int, std::vector<int>>::find(int const&)"),
            "std_map_find"
        );
        assert_eq!(sanitize("Outer<Inner<T>>::get"), "Outer_get");
    }

    #[test]
    fn test_pointer_and_reference_markers() {
        assert_eq!(sanitize("Foo*"), "Fooptr");
        assert_eq!(sanitize("Foo&"), "Fooref");
        assert_eq!(sanitize("get_node *"), "get_node_ptr");
        assert_eq!(sanitize("Foo::operator&"), "Foo_operatorref");
    }

    #[test]
    fn test_invalid_characters_and_whitespace() {
        assert_eq!(sanitize("  padded  "), "padded");
        assert_eq!(sanitize("vtable for Foo"), "vtable_for_Foo");
        assert_eq!(sanitize("Foo::operator+="), "Foo_operator");
        assert_eq!(sanitize("name.isra.0"), "name_isra_0");
        assert_eq!(sanitize("caf\u{e9}"), "caf");
    }

    #[test]
    fn test_underscores_collapsed_and_trimmed() {
        assert_eq!(sanitize("__libc_start_main"), "libc_start_main");
        assert_eq!(sanitize("a___b__"), "a_b");
        assert_eq!(sanitize("_Z3foov"), "Z3foov");
    }

    #[test]
    fn test_degenerate_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("::"), "");
        assert_eq!(sanitize("(int)"), "");
        assert_eq!(sanitize("<T>"), "");
        assert_eq!(sanitize("+-*/"), "ptr");
        assert_eq!(sanitize("+-/"), "");
    }

    #[test]
    fn test_output_is_identifier_safe() {
        let inputs = [
            "Foo::Bar(int)",
            "std::map<int, std::vector<int>>::find(int const&)",
            "operator new[](unsigned long)",
            "`anonymous namespace'::helper",
            "__cxa_throw",
            "a  ::  b",
            "Foo::~Foo()",
            "??0Foo@@QAE@XZ",
            "__",
            "x<<y",
        ];

        for input in inputs {
            let name = sanitize(input);
            if !name.is_empty() {
                assert_identifier_safe(&name);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Foo::Bar(int)",
            "MyClass::~MyClass()",
            "std::vector<int>::push_back",
            "operator delete(void*)",
            "get_node *",
            "sub_401000",
            "!!!",
        ];

        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not a fixed point for {:?}", input);
        }
    }

    proptest! {
        #[test]
        fn test_any_input_is_identifier_safe(raw in "\\PC{0,64}") {
            let name = sanitize(&raw);
            prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            // The destructor form keeps the class name verbatim
            if Sanitizer::default().destructor_class(&raw).is_none() {
                prop_assert!(!name.contains("__"));
                prop_assert!(!name.starts_with('_') && !name.ends_with('_'));
            }
        }

        #[test]
        fn test_any_input_is_idempotent(raw in "\\PC{0,64}") {
            prop_assume!(Sanitizer::default().destructor_class(&raw).is_none());
            let once = sanitize(&raw);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn test_any_destructor(class in "[A-Za-z][A-Za-z0-9]{0,24}") {
            let raw = format!("{}::~{}()", class, class);
            prop_assert_eq!(sanitize(&raw), format!("{}_destructor", class));
        }
    }
}
