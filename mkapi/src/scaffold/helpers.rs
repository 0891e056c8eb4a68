//! Naming helpers for code generation
//!
//! Tables are plural `snake_case`; everything rendered for them derives from
//! the table name through these transforms.

use inflector::Inflector;
use serde::Serialize;

/// Singular/plural pairs the inflector gets wrong, matched on the last word
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("man", "men"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("person", "people"),
    ("tooth", "teeth"),
    ("woman", "women"),
];

/// Words whose singular and plural are the same
const UNCOUNTABLE: &[&str] = &[
    "audio",
    "data",
    "equipment",
    "feedback",
    "fish",
    "information",
    "media",
    "metadata",
    "news",
    "police",
    "series",
    "sheep",
    "species",
    "traffic",
];

/// Naming helpers shared by the renderer, the path resolver and the CLI
pub struct TemplateHelpers;

impl TemplateHelpers {
    /// Convert string to camelCase
    ///
    /// # Examples
    ///
    /// ```
    /// # use mkapi::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_camel_case("user_profiles"), "userProfiles");
    /// ```
    #[must_use]
    pub fn to_camel_case(input: &str) -> String {
        input.to_camel_case()
    }

    /// Convert string to `snake_case`
    #[must_use]
    pub fn to_snake_case(input: &str) -> String {
        input.to_snake_case()
    }

    /// Pluralize a word
    ///
    /// Irregular and uncountable last words follow Laravel's inflector; the
    /// rest goes through the inflector library.
    #[must_use]
    pub fn pluralize(input: &str) -> String {
        inflect_irregular(input, true).unwrap_or_else(|| input.to_plural())
    }

    /// Singularize a word
    ///
    /// # Examples
    ///
    /// ```
    /// # use mkapi::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::singularize("blogMedia"), "blogMedia");
    /// assert_eq!(TemplateHelpers::singularize("People"), "Person");
    /// ```
    #[must_use]
    pub fn singularize(input: &str) -> String {
        inflect_irregular(input, false).unwrap_or_else(|| input.to_singular())
    }

    /// Upper-case the first character only
    ///
    /// # Examples
    ///
    /// ```
    /// # use mkapi::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::ucfirst("userProfiles"), "UserProfiles");
    /// ```
    #[must_use]
    pub fn ucfirst(input: &str) -> String {
        let mut chars = input.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }

    /// Plural class-style name of a table (`user_profiles` becomes `UserProfiles`)
    #[must_use]
    pub fn to_class_name(table: &str) -> String {
        Self::ucfirst(&Self::to_camel_case(table))
    }

    /// Singular entity name of a table (`user_profiles` becomes `UserProfile`)
    #[must_use]
    pub fn to_entity_name(table: &str) -> String {
        Self::ucfirst(&Self::singularize(&Self::to_camel_case(table)))
    }

    /// Route segment of an entity (`UserProfile` becomes `userProfile`)
    #[must_use]
    pub fn to_route_segment(entity: &str) -> String {
        Self::to_camel_case(entity)
    }
}

/// Split off the last word of a `camelCase`, `PascalCase` or `snake_case` name
fn split_last_word(input: &str) -> (&str, &str) {
    let start = input
        .char_indices()
        .filter(|&(i, c)| c == '_' || (i > 0 && c.is_uppercase()))
        .last()
        .map_or(0, |(i, c)| if c == '_' { i + 1 } else { i });
    input.split_at(start)
}

/// Override for names whose last word is irregular or uncountable
fn inflect_irregular(input: &str, to_plural: bool) -> Option<String> {
    let (head, word) = split_last_word(input);
    let lower = word.to_lowercase();

    if UNCOUNTABLE.contains(&lower.as_str()) {
        return Some(input.to_string());
    }

    let target = IRREGULAR.iter().find_map(|&(singular, plural)| {
        let (from, to) = if to_plural {
            (singular, plural)
        } else {
            (plural, singular)
        };
        (lower == from || lower == to).then_some(to)
    })?;

    let word = if word.starts_with(char::is_uppercase) {
        TemplateHelpers::ucfirst(target)
    } else {
        target.to_string()
    };
    Some(format!("{head}{word}"))
}

/// Every name derived from one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityNames {
    /// Table name, e.g. `user_profiles`
    pub table: String,
    /// Plural class name, e.g. `UserProfiles`
    pub class_name: String,
    /// Singular entity name, e.g. `UserProfile`
    pub entity: String,
    /// Route segment, e.g. `userProfile`
    pub route: String,
    /// `snake_case` entity, e.g. `user_profile`
    pub entity_snake: String,
}

impl EntityNames {
    /// Derive all names from a table name
    #[must_use]
    pub fn from_table(table: &str) -> Self {
        let entity = TemplateHelpers::to_entity_name(table);
        Self {
            table: table.to_string(),
            class_name: TemplateHelpers::to_class_name(table),
            route: TemplateHelpers::to_route_segment(&entity),
            entity_snake: TemplateHelpers::to_snake_case(&entity),
            entity,
        }
    }
}
