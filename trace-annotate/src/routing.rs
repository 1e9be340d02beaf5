use std::collections::BTreeMap;
use std::str::FromStr;

use trace_core::config::{AnnotationConfig, EvidenceRoute, UnroutedPolicy};
use trace_core::errors::{Result, TraceError};
use trace_core::models::{EvidenceSource, SvType, VariantSet};

///
/// Which evidence source annotates which SV type.
///
/// Built-in routes send insertions to sequence homology and every class with
/// genomic breakpoints to interval overlap. OTHER has no source. Configured
/// routes override individual types.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    routes: BTreeMap<SvType, EvidenceRoute>,
    unrouted: UnroutedPolicy,
}

impl Default for RoutingTable {
    fn default() -> Self {
        let routes = SvType::ALL
            .iter()
            .map(|sv_type| {
                let route = match sv_type {
                    SvType::INS => EvidenceRoute::Homology,
                    SvType::DEL | SvType::DUP | SvType::INV | SvType::BND => EvidenceRoute::Interval,
                    SvType::OTHER => EvidenceRoute::None,
                };
                (*sv_type, route)
            })
            .collect();

        RoutingTable {
            routes,
            unrouted: UnroutedPolicy::Sentinel,
        }
    }
}

impl RoutingTable {
    ///
    /// Overlay the configured routes on the built-in ones.
    ///
    /// # Arguments
    /// - config: the annotation section of the run configuration
    ///
    pub fn from_config(config: &AnnotationConfig) -> Result<Self> {
        let mut table = RoutingTable {
            unrouted: config.unrouted,
            ..Default::default()
        };

        for (key, route) in &config.routing {
            let sv_type = SvType::from_str(key).map_err(|e| {
                TraceError::Config(format!("annotation.routing: {}", e))
            })?;
            table.routes.insert(sv_type, *route);
        }

        Ok(table)
    }

    pub fn route(&self, sv_type: SvType) -> Option<EvidenceSource> {
        match self.routes.get(&sv_type) {
            Some(EvidenceRoute::Homology) => Some(EvidenceSource::SequenceHomology),
            Some(EvidenceRoute::Interval) => Some(EvidenceSource::IntervalOverlap),
            Some(EvidenceRoute::None) | None => None,
        }
    }

    pub fn unrouted(&self) -> UnroutedPolicy {
        self.unrouted
    }

    ///
    /// Identities of the records whose evidence comes from `source`.
    ///
    pub fn identities<'a>(
        &'a self,
        variants: &'a VariantSet,
        source: EvidenceSource,
    ) -> impl Iterator<Item = &'a str> + 'a {
        variants
            .records()
            .filter(move |r| self.route(r.sv_type) == Some(source))
            .map(|r| r.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(SvType::INS, Some(EvidenceSource::SequenceHomology))]
    #[case(SvType::DEL, Some(EvidenceSource::IntervalOverlap))]
    #[case(SvType::DUP, Some(EvidenceSource::IntervalOverlap))]
    #[case(SvType::INV, Some(EvidenceSource::IntervalOverlap))]
    #[case(SvType::BND, Some(EvidenceSource::IntervalOverlap))]
    #[case(SvType::OTHER, None)]
    fn test_default_routes(#[case] sv_type: SvType, #[case] expected: Option<EvidenceSource>) {
        assert_eq!(RoutingTable::default().route(sv_type), expected);
    }

    #[rstest]
    fn test_configured_routes_override_defaults() {
        let mut config = AnnotationConfig::default();
        config.routing.insert("inv".to_string(), EvidenceRoute::None);
        config.routing.insert("OTHER".to_string(), EvidenceRoute::Interval);
        config.unrouted = UnroutedPolicy::Omit;

        let table = RoutingTable::from_config(&config).unwrap();
        assert_eq!(table.route(SvType::INV), None);
        assert_eq!(table.route(SvType::OTHER), Some(EvidenceSource::IntervalOverlap));
        assert_eq!(table.route(SvType::DEL), Some(EvidenceSource::IntervalOverlap));
        assert_eq!(table.unrouted(), UnroutedPolicy::Omit);
    }

    #[rstest]
    fn test_unknown_sv_type_in_config() {
        let mut config = AnnotationConfig::default();
        config.routing.insert("CNV".to_string(), EvidenceRoute::Interval);
        assert!(matches!(
            RoutingTable::from_config(&config),
            Err(TraceError::Config(_))
        ));
    }
}
