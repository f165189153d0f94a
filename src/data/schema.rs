//! Canonical column schema and header alias rules.
//!
//! Source files come from several exports that disagree on header spelling
//! (`DEPARTAMENTO`, `depto_empresa`, `lat`, `monto`, ...). All downstream
//! logic depends on the canonical names below, so headers are renamed at
//! load time through an ordered rule table: rules are tried top to bottom
//! against the lower-cased header and the first match wins. Headers that
//! match no rule keep their original name.

use polars::prelude::DataFrame;

/// Region column: the grouping key for aggregation and the map.
pub const DEPARTAMENTO: &str = "Departamento";
/// Mean-point latitude of a record, nullable.
pub const LATITUD: &str = "Latitud";
/// Mean-point longitude of a record, nullable.
pub const LONGITUD: &str = "Longitud";
/// Company category column.
pub const CATEGORIA: &str = "Categoría";
/// The numeric financial indicator being summarized.
pub const VALOR: &str = "Valor";

/// How a rule matches a lower-cased header.
#[derive(Debug, Clone, Copy)]
pub enum HeaderPattern {
    /// Header starts with any of the given prefixes.
    PrefixOneOf(&'static [&'static str]),
    /// Header contains any of the given substrings.
    ContainsOneOf(&'static [&'static str]),
    /// Header equals one of the given names exactly.
    ExactOneOf(&'static [&'static str]),
}

/// One (pattern, canonical name) pair of the rename table.
#[derive(Debug, Clone, Copy)]
pub struct AliasRule {
    pub pattern: HeaderPattern,
    pub canonical: &'static str,
}

/// Ordered rename table; first matching rule wins.
pub const ALIAS_RULES: [AliasRule; 4] = [
    AliasRule {
        pattern: HeaderPattern::PrefixOneOf(&["depa", "dept"]),
        canonical: DEPARTAMENTO,
    },
    AliasRule {
        pattern: HeaderPattern::ContainsOneOf(&["lat"]),
        canonical: LATITUD,
    },
    AliasRule {
        pattern: HeaderPattern::ContainsOneOf(&["lon", "lng"]),
        canonical: LONGITUD,
    },
    AliasRule {
        pattern: HeaderPattern::ExactOneOf(&["valor", "monto", "amount", "value"]),
        canonical: VALOR,
    },
];

impl HeaderPattern {
    fn matches(&self, lower: &str) -> bool {
        match self {
            HeaderPattern::PrefixOneOf(prefixes) => {
                prefixes.iter().any(|p| lower.starts_with(p))
            }
            HeaderPattern::ContainsOneOf(subs) => subs.iter().any(|s| lower.contains(s)),
            HeaderPattern::ExactOneOf(names) => names.iter().any(|n| lower == *n),
        }
    }
}

/// Canonical name for a raw header, if any rule matches (case-insensitive).
pub fn canonical_name(header: &str) -> Option<&'static str> {
    let lower = header.to_lowercase();
    ALIAS_RULES
        .iter()
        .find(|rule| rule.pattern.matches(&lower))
        .map(|rule| rule.canonical)
}

/// Compute the (old, canonical) rename pairs for a header row.
///
/// Identity renames are skipped. If two headers resolve to the same
/// canonical name, only the first occurrence is renamed; duplicate column
/// names are not representable in a frame, so later matches keep their
/// original names.
pub fn rename_plan(headers: &[String]) -> Vec<(String, &'static str)> {
    let mut taken: Vec<&'static str> = Vec::new();
    let mut plan = Vec::new();

    for header in headers {
        let Some(canonical) = canonical_name(header) else {
            continue;
        };
        if taken.contains(&canonical) {
            continue;
        }
        taken.push(canonical);
        if header != canonical {
            plan.push((header.clone(), canonical));
        }
    }

    plan
}

/// Whether the frame carries a column with the given name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_header_variants() {
        for header in ["DEPARTAMENTO", "Departamento", "Depto", "depa_x", "depto_empresa"] {
            assert_eq!(canonical_name(header), Some(DEPARTAMENTO), "{header}");
        }
    }

    #[test]
    fn test_coordinate_header_variants() {
        assert_eq!(canonical_name("lat"), Some(LATITUD));
        assert_eq!(canonical_name("LATITUD"), Some(LATITUD));
        assert_eq!(canonical_name("punto_lat"), Some(LATITUD));
        assert_eq!(canonical_name("lon"), Some(LONGITUD));
        assert_eq!(canonical_name("Longitud"), Some(LONGITUD));
        assert_eq!(canonical_name("lng_empresa"), Some(LONGITUD));
    }

    #[test]
    fn test_value_header_exact_match_only() {
        for header in ["valor", "VALOR", "monto", "Amount", "value"] {
            assert_eq!(canonical_name(header), Some(VALOR), "{header}");
        }
        // Not exact matches: keep original name.
        assert_eq!(canonical_name("valores"), None);
        assert_eq!(canonical_name("monto_total"), None);
    }

    #[test]
    fn test_first_rule_wins() {
        // Starts with a region prefix *and* contains "lat": the region rule
        // is evaluated first.
        assert_eq!(canonical_name("depalat"), Some(DEPARTAMENTO));
    }

    #[test]
    fn test_unmatched_headers_keep_name() {
        assert_eq!(canonical_name("Categoría"), None);
        assert_eq!(canonical_name("empresa_id"), None);
    }

    #[test]
    fn test_rename_plan_skips_identity_and_duplicates() {
        let headers = vec![
            "depto".to_string(),
            "Latitud".to_string(),
            "longitud".to_string(),
            "depa_region".to_string(),
            "empresa_id".to_string(),
        ];
        let plan = rename_plan(&headers);
        // "Latitud" is already canonical, "depa_region" lost to "depto",
        // "empresa_id" matches nothing.
        assert_eq!(
            plan,
            vec![
                ("depto".to_string(), DEPARTAMENTO),
                ("longitud".to_string(), LONGITUD),
            ]
        );
    }
}
