//! Built-in temperature mappings.
//!
//! Covers the standard temperature source codes 0-14 of the extended range
//! temperature message. Code 7 is listed under both of its spellings, since
//! decoders disagree on the symbolic name. A trailing wildcard routes any
//! other source to a generic sensor path.

use crate::mapping::MappingRule;

/// Standard source codes with their display name and base path template.
const STANDARD_SOURCES: &[(&str, &str, &str)] = &[
    ("0", "Sea Temperature", "environment.water.${instance}"),
    ("1", "Outside Temperature", "environment.outside.${instance}"),
    ("2", "Inside Temperature", "environment.inside.${instance}"),
    ("3", "Engine Room Temperature", "environment.inside.engineRoom.${instance}"),
    ("4", "Main Cabin Temperature", "environment.inside.mainCabin.${instance}"),
    ("5", "Live Well Temperature", "tanks.liveWell.${instance}"),
    ("6", "Bait Well Temperature", "tanks.baitWell.${instance}"),
    ("7", "Refrigeration Temperature", "environment.inside.refrigerator.${instance}"),
    ("7", "Refridgeration Temperature", "environment.inside.refrigerator.${instance}"),
    ("8", "Heating System Temperature", "environment.inside.heating.${instance}"),
    ("9", "Dew Point Temperature", "environment.outside.dewPoint.${instance}"),
    ("10", "Apparent Wind Chill Temperature", "environment.outside.apparentWindChill.${instance}"),
    ("11", "Theoretical Wind Chill Temperature", "environment.outside.theoreticalWindChill.${instance}"),
    ("12", "Heat Index Temperature", "environment.outside.heatIndex.${instance}"),
    ("13", "Freezer Temperature", "environment.inside.freezer.${instance}"),
    ("14", "Exhaust Gas Temperature", "propulsion.${instance}.exhaust"),
];

/// Path template for sources no standard rule knows about.
pub const GENERIC_SENSOR_PATH: &str = "sensors.temperature.${source}.${instance}";

/// Get the default mapping rules, in evaluation order.
pub fn builtin_temperature_mappings() -> Vec<MappingRule> {
    STANDARD_SOURCES
        .iter()
        .map(|(source, name, path)| MappingRule::new(*source, *path).with_name(*name))
        .chain(std::iter::once(MappingRule::wildcard(GENERIC_SENSOR_PATH)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Selector;

    #[test]
    fn test_builtin_mappings_count() {
        assert_eq!(builtin_temperature_mappings().len(), 17);
    }

    #[test]
    fn test_wildcard_is_last() {
        let rules = builtin_temperature_mappings();
        let (last, rest) = rules.split_last().unwrap();
        assert!(last.source.is_wildcard());
        assert!(rest.iter().all(|r| !r.source.is_wildcard()));
    }

    #[test]
    fn test_all_standard_codes_covered() {
        let rules = builtin_temperature_mappings();
        for code in 0..=14 {
            let code = code.to_string();
            assert!(
                rules.iter().any(|r| r.source == Selector::Code(code.clone())),
                "missing code {}",
                code
            );
        }
    }

    #[test]
    fn test_code_seven_has_both_spellings() {
        let names: Vec<_> = builtin_temperature_mappings()
            .into_iter()
            .filter(|r| r.source == Selector::Code("7".into()))
            .filter_map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Refrigeration Temperature", "Refridgeration Temperature"]);
    }

    #[test]
    fn test_every_standard_rule_has_instance_placeholder() {
        for rule in builtin_temperature_mappings() {
            assert!(rule.path.contains("${instance}"), "{}", rule.path);
        }
    }
}
