//! Property tests for the pure stages of the pipeline
//!
//! Parser permissiveness, reserved-table exclusion, total type mapping and
//! the validation exclusion sets must hold for arbitrary input.

use chrono::NaiveDate;
use mkapi::conventions::{RESERVED_TABLES, VALIDATION_EXCLUSIONS};
use mkapi::scaffold::{synthesize, ArtifactRenderer, DocType, RuleSet};
use mkapi::schema::{parse, ColumnMetadata, TableMetadata};
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,15}"
}

fn raw_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("int".to_string()),
        Just("bigint".to_string()),
        Just("varchar(255)".to_string()),
        Just("text".to_string()),
        Just("timestamp".to_string()),
        Just("decimal(8".to_string()),
        "[a-z]{1,10}(\\([0-9]{1,3}\\))?",
    ]
}

fn column() -> impl Strategy<Value = ColumnMetadata> {
    (identifier(), raw_type(), any::<bool>()).prop_map(|(name, raw_type, nullable)| {
        let column = ColumnMetadata::new(name, raw_type);
        if nullable {
            column
        } else {
            column.not_null()
        }
    })
}

fn create_table(table: &str, columns: &[(String, String)]) -> String {
    let body = columns
        .iter()
        .map(|(name, raw_type)| format!("`{name}` {raw_type} not null"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("  ⇂ create table `{table}` ({body}) default character set utf8mb4 collate 'utf8mb4_unicode_ci'")
}

proptest! {
    #[test]
    fn prop_input_without_create_table_parses_empty(raw in "[^cC]*") {
        prop_assert!(parse(&raw).is_empty());
    }

    #[test]
    fn prop_reserved_tables_never_parsed(
        reserved in prop::sample::select(RESERVED_TABLES),
        domain in "[a-z]{3,10}s",
        columns in prop::collection::vec((identifier(), raw_type()), 0..6),
    ) {
        prop_assume!(!RESERVED_TABLES.contains(&domain.as_str()));
        let dump = format!(
            "{}\n{}",
            create_table(reserved, &columns),
            create_table(&domain, &columns)
        );
        let tables = parse(&dump);

        prop_assert!(!tables.contains_key(reserved));
        prop_assert!(tables.contains_key(&domain));
    }

    #[test]
    fn prop_type_mapping_is_total_and_deterministic(raw in ".*") {
        let first = DocType::from_raw(&raw);
        prop_assert_eq!(first, DocType::from_raw(&raw));
        prop_assert!(["integer", "number", "string"].contains(&first.kind));
    }

    #[test]
    fn prop_unknown_types_map_to_plain_string(raw in "[g-s][a-z]{3,8}") {
        let known = ["int", "tinyint", "bigint", "timestamp", "varchar", "text", "decimal", "double", "float"];
        prop_assume!(!known.contains(&raw.as_str()));
        let mapped = DocType::from_raw(&raw);
        prop_assert_eq!((mapped.kind, mapped.format), ("string", ""));
    }

    #[test]
    fn prop_excluded_columns_never_get_rules(
        columns in prop::collection::vec(column(), 0..8),
        excluded in prop::sample::select(VALIDATION_EXCLUSIONS),
    ) {
        let mut columns = columns;
        columns.push(ColumnMetadata::new(excluded, "timestamp").not_null());
        let table = TableMetadata::with_columns("posts", columns);
        let rules = RuleSet::for_table(&table);

        for name in VALIDATION_EXCLUSIONS {
            prop_assert!(rules.get(name).is_none());
        }
    }

    #[test]
    fn prop_email_rule_regardless_of_type(raw in raw_type(), nullable in any::<bool>(), table in identifier()) {
        let mut column = ColumnMetadata::new("email", raw);
        column.nullable = nullable;
        let rule = synthesize(&column, &table);
        let expected = format!("email|unique:{table}");
        prop_assert!(rule.ends_with(&expected));
    }

    #[test]
    fn prop_rendering_is_deterministic(columns in prop::collection::vec(column(), 0..8)) {
        let now = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let renderer = ArtifactRenderer::new(now).unwrap();
        let table = TableMetadata::with_columns("posts", columns);

        prop_assert_eq!(renderer.render(&table).unwrap(), renderer.render(&table).unwrap());
        prop_assert_eq!(
            renderer.render_model_schema(&table).unwrap(),
            renderer.render_model_schema(&table).unwrap()
        );
    }
}
