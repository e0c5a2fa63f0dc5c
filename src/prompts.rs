use crate::models::{CodeMode, CodeRequest, TripExtraKind, TripExtraRequest, TripRequest};

pub const CODE_SYSTEM: &str = include_str!("../data/prompts/code_system.txt");
pub const CODE_DEBUG: &str = include_str!("../data/prompts/code_debug.txt");
pub const CODE_EXPLAIN: &str = include_str!("../data/prompts/code_explain.txt");
pub const CODE_OPTIMIZE: &str = include_str!("../data/prompts/code_optimize.txt");
pub const CODE_GENERATE: &str = include_str!("../data/prompts/code_generate.txt");
pub const TRIP_SYSTEM: &str = include_str!("../data/prompts/trip_system.txt");
pub const TRIP_ITINERARY: &str = include_str!("../data/prompts/trip_itinerary.txt");
pub const TRIP_PACKING: &str = include_str!("../data/prompts/trip_packing.txt");
pub const TRIP_BUDGET: &str = include_str!("../data/prompts/trip_budget.txt");
pub const ANALYZE_DEFAULT: &str = include_str!("../data/prompts/analyze_default.txt");
pub const TRANSCRIBE: &str = include_str!("../data/prompts/transcribe.txt");

pub const TRIP_DINING: &str =
    "Include breakfast, lunch and dinner recommendations near each day's stops.";
pub const TRIP_TRANSPORT: &str =
    "Explain how to get between stops each day, with the best transport option and travel time.";
pub const TRIP_PRO_TIPS: &str =
    "Add local pro tips: booking advice, crowd-avoiding times and etiquette.";
pub const TRIP_ALTERNATIVES: &str =
    "Suggest a rainy-day or low-energy alternative for each day.";

/// Replace `{{key}}` placeholders in a template string.
///
/// Substitution is a single left-to-right pass, so placeholder-like text
/// inside a substituted value is never expanded again. Unknown keys are left
/// as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let key = &after_open[..end];
                match vars.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => result.push_str(value),
                    None => {
                        result.push_str("{{");
                        result.push_str(key);
                        result.push_str("}}");
                    }
                }
                rest = &after_open[end + 2..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    result.push_str(rest);
    result
}

pub fn code_prompt(request: &CodeRequest) -> String {
    let template = match request.mode {
        CodeMode::Debug => CODE_DEBUG,
        CodeMode::Explain => CODE_EXPLAIN,
        CodeMode::Optimize => CODE_OPTIMIZE,
        CodeMode::Generate => CODE_GENERATE,
    };

    render(
        template,
        &[("language", &request.language), ("code", &request.code)],
    )
}

/// Itinerary prompt with option fragments appended in a fixed order:
/// dining, transport, pro tips, alternatives.
pub fn trip_itinerary_prompt(request: &TripRequest) -> String {
    let form = &request.form;
    let mut prompt = render(
        TRIP_ITINERARY,
        &[
            ("starting_point", &form.starting_point),
            ("destination", &form.destination),
            ("duration", &form.duration),
            ("budget", &form.budget),
            ("interests", &form.interests),
        ],
    );

    let options = request.options;
    let fragments = [
        (options.dining, TRIP_DINING),
        (options.transport, TRIP_TRANSPORT),
        (options.pro_tips, TRIP_PRO_TIPS),
        (options.alternatives, TRIP_ALTERNATIVES),
    ];
    for (_, fragment) in fragments.iter().filter(|(enabled, _)| *enabled) {
        prompt.push('\n');
        prompt.push_str(fragment);
    }

    prompt
}

pub fn trip_extra_prompt(request: &TripExtraRequest) -> String {
    let info = &request.trip_info;
    let template = match request.kind {
        TripExtraKind::Packing => TRIP_PACKING,
        TripExtraKind::Budget => TRIP_BUDGET,
    };

    render(
        template,
        &[
            ("destination", &info.destination),
            ("duration", &info.duration),
            ("interests", &info.interests),
            ("budget", info.budget.as_deref().unwrap_or("not specified")),
        ],
    )
}
