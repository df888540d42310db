//! Shallow C# parser.
//!
//! Regex-and-brace-counter parsing that yields the first type declaration
//! plus its property and method descriptors. Statements are never modeled;
//! method bodies are captured verbatim for byte-level comparison and
//! splicing. This is deliberately not a full parser; files it cannot
//! align fall back to textual strategies or a skip.

use once_cell::sync::Lazy;
use regex::Regex;

/// `public [abstract|sealed|static] class Name [: bases] {`
static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)public\s+(?:(?:abstract|sealed|static|partial)\s+)*class\s+(\w+)(?:\s*:\s*([^{]+))?\s*\{")
        .unwrap()
});

/// Auto-property with attribute prefix and accessor variants
///
/// The generic part tolerates one nesting level (`List<OrderLine>`,
/// `Dictionary<string, List<int>>`).
static PROPERTY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(?:\[([^\]]+)\]\s*)*public\s+(?:virtual\s+)?([\w.]+(?:<[^;{}()]*>)?\??)\s+(\w+)\s*\{\s*(get;\s*set;|get;\s*private\s+set;|get;\s*init;|get;)\s*\}",
    )
    .unwrap()
});

/// Method signature up to the parameter list close
static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\[([^\]]+)\]\s*)*public\s+(?:(?:virtual|override|async|static|sealed)\s+)*([\w.]+(?:<[^;{}()]*>)?\??)\s+(\w+)\s*\(([^)]*)\)\s*\{",
    )
    .unwrap()
});

/// `using Some.Namespace;` at line start
static USING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^using\s+([^;]+);").unwrap());

/// A parsed class declaration
#[derive(Debug, Clone)]
pub struct CsClass {
    pub name: String,
    pub base_list: String,
    pub properties: Vec<CsProperty>,
    pub methods: Vec<CsMethod>,
}

/// A parsed auto-property
#[derive(Debug, Clone)]
pub struct CsProperty {
    pub name: String,
    pub type_name: String,
    pub accessor: String,
    pub attributes: Vec<String>,
    /// The declaration text exactly as matched
    pub raw: String,
    /// 1-based line of the declaration
    pub line: usize,
}

/// A parsed method with its body captured verbatim
#[derive(Debug, Clone)]
pub struct CsMethod {
    pub name: String,
    pub return_type: String,
    pub parameters: String,
    pub attributes: Vec<String>,
    /// Body text including the outer braces
    pub body: String,
    /// Signature + body, used for splicing
    pub raw: String,
    /// Normalized signature key: `ret name(type,type)`
    pub signature: String,
    pub line: usize,
}

/// Parse the first public class in `content`
///
/// Returns `None` when no class declaration matches; callers treat that as
/// unmergeable.
pub fn parse_class(content: &str) -> Option<CsClass> {
    let caps = CLASS_RE.captures(content)?;
    let name = caps[1].to_string();
    let base_list = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some(CsClass {
        name,
        base_list,
        properties: parse_properties(content),
        methods: parse_methods(content),
    })
}

fn line_of(content: &str, byte_offset: usize) -> usize {
    content[..byte_offset].bytes().filter(|b| *b == b'\n').count() + 1
}

fn split_attributes(raw: Option<regex::Match<'_>>) -> Vec<String> {
    match raw {
        Some(m) => m
            .as_str()
            .split("][")
            .map(|s| s.trim_matches(|c| c == '[' || c == ']').to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => Vec::new(),
    }
}

fn parse_properties(content: &str) -> Vec<CsProperty> {
    PROPERTY_RE
        .captures_iter(content)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            CsProperty {
                attributes: split_attributes(caps.get(1)),
                type_name: caps[2].to_string(),
                name: caps[3].to_string(),
                accessor: caps[4].to_string(),
                raw: whole.as_str().to_string(),
                line: line_of(content, whole.start()),
            }
        })
        .collect()
}

fn parse_methods(content: &str) -> Vec<CsMethod> {
    let mut methods = Vec::new();
    for caps in METHOD_RE.captures_iter(content) {
        let whole = caps.get(0).unwrap();
        let return_type = caps[2].to_string();
        let name = caps[3].to_string();
        let parameters = caps[4].to_string();
        // The signature match ends at the opening brace; walk forward from
        // there to capture the body by brace depth.
        let body_start = whole.end() - 1;
        let Some(body) = extract_braced_block(&content[body_start..]) else {
            continue;
        };
        let raw = format!("{}{}", &content[whole.start()..body_start], body);
        methods.push(CsMethod {
            signature: method_signature(&return_type, &name, &parameters),
            attributes: split_attributes(caps.get(1)),
            body,
            raw,
            return_type,
            name,
            parameters,
            line: line_of(content, whole.start()),
        });
    }
    methods
}

/// Capture a `{ … }` block starting at the first byte of `content`
///
/// `content` must begin at an opening brace. Returns the block including
/// both braces, or `None` when braces never balance.
pub fn extract_braced_block(content: &str) -> Option<String> {
    let mut depth = 0usize;
    for (i, ch) in content.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(content[..=i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Normalized signature key for method identity
///
/// Parameter names are dropped; only the ordered type list matters.
/// Whitespace is collapsed; generic brackets survive verbatim.
pub fn method_signature(return_type: &str, name: &str, parameters: &str) -> String {
    let param_types: Vec<String> = parameters
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.split_whitespace().next().map(str::to_string))
        .collect();
    format!("{} {}({})", return_type, name, param_types.join(","))
}

/// Extract using directives in file order
pub fn extract_usings(content: &str) -> Vec<String> {
    USING_RE
        .captures_iter(content)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// Union of two using lists, existing order first, new appended in input order
pub fn merge_usings(existing: &[String], new: &[String]) -> Vec<String> {
    let mut seen: std::collections::HashSet<&str> = std::collections::HashSet::new();
    let mut merged = Vec::new();
    for u in existing.iter().chain(new.iter()) {
        if seen.insert(u.as_str()) {
            merged.push(u.clone());
        }
    }
    merged
}

impl CsClass {
    pub fn find_property(&self, name: &str) -> Option<&CsProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn find_method(&self, signature: &str) -> Option<&CsMethod> {
        self.methods.iter().find(|m| m.signature == signature)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.find_property(name).is_some()
    }

    pub fn has_method(&self, signature: &str) -> bool {
        self.find_method(signature).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"using System;
using Volo.Abp.Domain.Entities.Auditing;

namespace Acme.Catalog.Entities
{
    public class Product : FullAuditedAggregateRoot<Guid>
    {
        [Required]
        [MaxLength(128)]
        public string Name { get; set; }

        public decimal Price { get; private set; }

        public virtual Guid? CategoryId { get; set; }

        public Product(Guid id, string name)
        {
            Name = name;
        }

        public void Recompute(int factor)
        {
            if (factor > 0)
            {
                Price = Price * factor;
            }
        }
    }
}
"#;

    #[test]
    fn test_parse_class_declaration() {
        let class = parse_class(SAMPLE).unwrap();
        assert_eq!(class.name, "Product");
        assert_eq!(class.base_list, "FullAuditedAggregateRoot<Guid>");
    }

    #[test]
    fn test_parse_properties() {
        let class = parse_class(SAMPLE).unwrap();
        let names: Vec<&str> = class.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Price", "CategoryId"]);
        assert_eq!(class.properties[0].type_name, "string");
        assert_eq!(
            class.properties[0].attributes,
            vec!["Required".to_string(), "MaxLength(128)".to_string()]
        );
        assert_eq!(class.properties[1].accessor, "get; private set;");
        assert_eq!(class.properties[2].type_name, "Guid?");
    }

    #[test]
    fn test_parse_methods_with_nested_braces() {
        let class = parse_class(SAMPLE).unwrap();
        let recompute = class
            .methods
            .iter()
            .find(|m| m.name == "Recompute")
            .unwrap();
        assert_eq!(recompute.signature, "void Recompute(int)");
        assert!(recompute.body.contains("Price = Price * factor;"));
        assert!(recompute.body.starts_with('{'));
        assert!(recompute.body.ends_with('}'));
    }

    #[test]
    fn test_constructor_is_invisible_to_the_signature_regex() {
        // Constructors have no return type token, so the method pattern
        // never captures them; the structural merger additionally guards
        // against inserting one into an entity.
        let class = parse_class(SAMPLE).unwrap();
        assert!(!class.methods.iter().any(|m| m.name == "Product"));
    }

    #[test]
    fn test_nested_generic_return_type() {
        let src = r#"public class ProductAppService
{
    public Task<PagedResultDto<ProductDto>> GetListAsync(GetListProductDto input)
    {
        return Query(input);
    }
}
"#;
        let class = parse_class(src).unwrap();
        assert_eq!(
            class.methods[0].signature,
            "Task<PagedResultDto<ProductDto>> GetListAsync(GetListProductDto)"
        );
    }

    #[test]
    fn test_signature_drops_parameter_names() {
        assert_eq!(
            method_signature("Task<ProductDto>", "GetAsync", "Guid id, bool includeDetails"),
            "Task<ProductDto> GetAsync(Guid,bool)"
        );
        assert_eq!(method_signature("void", "Clear", ""), "void Clear()");
    }

    #[test]
    fn test_extract_braced_block_unbalanced() {
        assert!(extract_braced_block("{ if (x) {").is_none());
    }

    #[test]
    fn test_extract_usings_and_merge() {
        let usings = extract_usings(SAMPLE);
        assert_eq!(
            usings,
            vec![
                "System".to_string(),
                "Volo.Abp.Domain.Entities.Auditing".to_string()
            ]
        );
        let merged = merge_usings(
            &usings,
            &["System".to_string(), "System.Linq".to_string()],
        );
        assert_eq!(
            merged,
            vec![
                "System".to_string(),
                "Volo.Abp.Domain.Entities.Auditing".to_string(),
                "System.Linq".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_class_none_for_plain_text() {
        assert!(parse_class("not a class at all").is_none());
        assert!(parse_class("").is_none());
    }
}
