use super::{
    AlphaBracketMetric, BracketVariant, CategoryMetric, Extremum, IFSubstringMetric, LogpMetric,
    MarginMetric, Metric, MorphLogpMetric, NoStmMetric, OneOffBoundaryMetric, UncertaintyMetric,
};

const NAMES: &[&str] = &[
    "alphabracket_logp",
    "alphabracket_uncert",
    "alphabracket_unnorm",
    "category",
    "ifsubstrings_5n",
    "ifsubstrings_norm",
    "ifsubstrings_un",
    "logp",
    "margin",
    "morphlogp_max",
    "morphlogp_min",
    "nostm",
    "oneoffboundary",
    "uncertainty",
];

/// Build a fresh, unconfigured metric by its registry name.
///
/// The `alphabracket_*` metrics come back without models; call
/// `AlphaBracketMetric::set_models` (or build one directly) before ranking.
pub fn metric_by_name(name: &str) -> Option<Box<dyn Metric>> {
    let metric: Box<dyn Metric> = match name {
        "uncertainty" => Box::new(UncertaintyMetric),
        "margin" => Box::new(MarginMetric),
        "logp" => Box::new(LogpMetric),
        "category" => Box::new(CategoryMetric),
        "nostm" => Box::new(NoStmMetric),
        "ifsubstrings_norm" => Box::new(IFSubstringMetric::new(true, "norm", 4)),
        "ifsubstrings_un" => Box::new(IFSubstringMetric::new(false, "un", 4)),
        "ifsubstrings_5n" => Box::new(IFSubstringMetric::new(true, "5n", 5)),
        "oneoffboundary" => Box::new(OneOffBoundaryMetric::new("std")),
        "morphlogp_min" => Box::new(MorphLogpMetric::new(Extremum::Min)),
        "morphlogp_max" => Box::new(MorphLogpMetric::new(Extremum::Max)),
        _ => {
            let variant = name.strip_prefix("alphabracket_")?.parse().ok()?;
            Box::new(AlphaBracketMetric::new(variant))
        }
    };
    Some(metric)
}

/// Alpha-bracket metric by registry name, for callers that need to attach
/// its models.
pub fn alpha_bracket_by_name(name: &str) -> Option<AlphaBracketMetric> {
    let variant: BracketVariant = name.strip_prefix("alphabracket_")?.parse().ok()?;
    Some(AlphaBracketMetric::new(variant))
}

/// Every registry name, sorted.
pub fn metric_names() -> &'static [&'static str] {
    NAMES
}
