use crate::utils::push_unique;
use once_cell::sync::Lazy;
use regex::Regex;

static ES_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s+(?:[\w*\s{},$]+\s+from\s+)?['"]([^'"]+)['"]"#)
        .expect("valid import regex")
});
static COMMONJS_REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid require regex")
});
static PYTHON_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*from[ \t]+([\w.]+)[ \t]+import\b").expect("valid from regex")
});
static PYTHON_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*import[ \t]+([A-Za-z_][\w.]*(?:[ \t]+as[ \t]+\w+)?(?:[ \t]*,[ \t]*[A-Za-z_][\w.]*(?:[ \t]+as[ \t]+\w+)?)*)[ \t]*;?[ \t]*(?:#[^\n]*)?[ \t\r]*$",
    )
    .expect("valid python import regex")
});

/// Module names referenced by ES imports, CommonJS requires and Python
/// `import` / `from` statements. Deduplicated, first-seen order, unresolved.
pub fn extract_dependencies(content: &str) -> Vec<String> {
    let mut deps = Vec::new();

    for caps in ES_IMPORT.captures_iter(content) {
        push_unique(&mut deps, &caps[1]);
    }
    for caps in COMMONJS_REQUIRE.captures_iter(content) {
        push_unique(&mut deps, &caps[1]);
    }
    for caps in PYTHON_FROM.captures_iter(content) {
        push_unique(&mut deps, &caps[1]);
    }
    for caps in PYTHON_IMPORT.captures_iter(content) {
        for item in caps[1].split(',') {
            if let Some(module) = item.split_whitespace().next() {
                push_unique(&mut deps, module);
            }
        }
    }

    deps
}
