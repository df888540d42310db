//! Naming utilities shared by the schema validator, the renderers and the
//! template filters.
//!
//! All functions here are pure; the template loader registers them as
//! minijinja filters so templates can write `{{ entity.name | pluralize }}`.

/// Convert a singular English word to its plural form
///
/// Covers the irregular nouns that show up in domain models plus the
/// standard suffix rules. Unknown words fall through to appending `s`.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    const IRREGULAR: &[(&str, &str)] = &[
        ("person", "people"),
        ("child", "children"),
        ("man", "men"),
        ("woman", "women"),
        ("foot", "feet"),
        ("tooth", "teeth"),
        ("mouse", "mice"),
        ("goose", "geese"),
        ("datum", "data"),
        ("criterion", "criteria"),
    ];
    let lower = word.to_lowercase();
    for (singular, plural) in IRREGULAR {
        if lower == *singular {
            return match_case(word, plural);
        }
        if let Some(prefix) = lower.strip_suffix(singular) {
            if !prefix.is_empty() {
                return format!("{}{}", &word[..prefix.len()], match_case(&word[prefix.len()..], plural));
            }
        }
    }
    // -y preceded by a consonant -> -ies
    if let Some(stem) = word.strip_suffix('y') {
        if let Some(last) = stem.chars().last() {
            if !"aeiouAEIOU".contains(last) {
                return format!("{stem}ies");
            }
        }
    }
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{word}es");
    }
    if lower.ends_with('f') && !lower.ends_with("ff") {
        return format!("{}ves", &word[..word.len() - 1]);
    }
    if lower.ends_with("fe") {
        return format!("{}ves", &word[..word.len() - 2]);
    }
    format!("{word}s")
}

/// Apply the casing of `sample`'s first character to `replacement`
fn match_case(sample: &str, replacement: &str) -> String {
    match sample.chars().next() {
        Some(first) if first.is_uppercase() => upper_first(replacement),
        _ => replacement.to_string(),
    }
}

/// Convert a string to PascalCase
///
/// Splits on underscores, dashes and whitespace.
pub fn pascal_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| upper_first(&w.to_lowercase()))
        .collect()
}

/// Convert a string to camelCase
pub fn camel_case(s: &str) -> String {
    lower_first(&pascal_case(s))
}

/// Lowercase the first character, leaving the rest untouched
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Uppercase the first character, leaving the rest untouched
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Map a schema type name to the C# type emitted in generated code
///
/// Schema type names are already C# spellings; unknown names are assumed to
/// be custom types (enums, entities, value objects) and pass through
/// verbatim. The indirection exists so templates say `{{ t | cs_type }}`
/// and a future mapping change lands in one place.
pub fn cs_type(type_name: &str) -> String {
    type_name.to_string()
}

/// Whether a C# type is a value type that needs a `?` marker when nullable
pub fn is_value_type(type_name: &str) -> bool {
    matches!(
        type_name,
        "int" | "long" | "decimal" | "DateTime" | "bool" | "Guid" | "byte" | "short" | "float"
            | "double"
    )
}

/// Append the nullable marker to value types when the property is nullable
///
/// Reference types (`string`, custom types) are left alone; the generated
/// code targets projects without nullable reference type annotations.
pub fn nullable(type_name: &str, is_nullable: bool) -> String {
    if is_nullable && is_value_type(type_name) {
        format!("{type_name}?")
    } else {
        type_name.to_string()
    }
}

/// Render a C# data-annotation attribute
pub fn attribute(attr: &str, value: &str) -> String {
    match attr {
        "Required" => "[Required]".to_string(),
        "MaxLength" => format!("[MaxLength({value})]"),
        "MinLength" => format!("[MinLength({value})]"),
        "Range" => format!("[Range({value})]"),
        "StringLength" => format!("[StringLength({value})]"),
        "ForeignKey" => format!("[ForeignKey(\"{value}\")]"),
        other => format!("[{other}]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize_regular() {
        assert_eq!(pluralize("Product"), "Products");
        assert_eq!(pluralize("Order"), "Orders");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("Batch"), "Batches");
        assert_eq!(pluralize("Dish"), "Dishes");
        assert_eq!(pluralize("Bus"), "Buses");
    }

    #[test]
    fn test_pluralize_y_rules() {
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize("Company"), "Companies");
        // vowel before y keeps the y
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("Key"), "Keys");
    }

    #[test]
    fn test_pluralize_irregular() {
        assert_eq!(pluralize("Person"), "People");
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("Salesperson"), "Salespeople");
    }

    #[test]
    fn test_pluralize_f_endings() {
        assert_eq!(pluralize("Leaf"), "Leaves");
        assert_eq!(pluralize("Knife"), "Knives");
        assert_eq!(pluralize("Staff"), "Staffs");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("order_item"), "OrderItem");
        assert_eq!(pascal_case("order-item"), "OrderItem");
        assert_eq!(pascal_case("order item"), "OrderItem");
        assert_eq!(pascal_case("single"), "Single");
        assert_eq!(pascal_case(""), "");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("OrderItem"), "orderitem");
        assert_eq!(camel_case("order_item"), "orderItem");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn test_first_letter_casing() {
        assert_eq!(lower_first("Product"), "product");
        assert_eq!(upper_first("product"), "Product");
        assert_eq!(lower_first(""), "");
        assert_eq!(upper_first(""), "");
    }

    #[test]
    fn test_nullable_value_types() {
        assert_eq!(nullable("int", true), "int?");
        assert_eq!(nullable("Guid", true), "Guid?");
        assert_eq!(nullable("string", true), "string");
        assert_eq!(nullable("int", false), "int");
        assert_eq!(nullable("OrderStatus", true), "OrderStatus");
    }

    #[test]
    fn test_attribute_rendering() {
        assert_eq!(attribute("Required", ""), "[Required]");
        assert_eq!(attribute("MaxLength", "128"), "[MaxLength(128)]");
        assert_eq!(attribute("ForeignKey", "OrderId"), "[ForeignKey(\"OrderId\")]");
        assert_eq!(attribute("JsonIgnore", ""), "[JsonIgnore]");
    }
}
