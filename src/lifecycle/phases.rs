//! Life Cycle Phase Sets
//!
//! `LifeCyclePhases` is an immutable, shared, sorted and deduplicated set of
//! phases found in free text such as `"A1-A3, C1"`. Instances are cheap to
//! clone; the empty set is a single process-wide instance.

use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::phase::{LifeCyclePhase, LifeCycleStage, Rgb, UNSPECIFIED_COLOR, UNSPECIFIED_TEXT};

lazy_static! {
    /// Phase codes (`A1`..`C4`, a standalone `D`) and lists or ranges of them
    /// joined by separators: space - – — ― ‒ , ; | + & / \
    static ref PHASE_PATTERN: Regex = Regex::new(
        r"(?:[A-C][0-9][0-9]?|\bD\b)(?:[ \-–—―‒,;|+\&/\\]+(?:[A-C][0-9][0-9]?|\bD\b))*"
    )
    .unwrap();

    static ref EMPTY_PHASES: LifeCyclePhases = LifeCyclePhases(Arc::new(PhasesInner {
        phases: Vec::new(),
        original: String::new(),
        canonical: String::new(),
        color: UNSPECIFIED_COLOR,
    }));
}

struct PhasesInner {
    phases: Vec<LifeCyclePhase>,
    /// Source text, kept for exact round-tripping. Empty for the empty set.
    original: String,
    canonical: String,
    color: Rgb,
}

/// Result of an ordered-merge comparison of two phase sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseDiff {
    pub only_this: Vec<LifeCyclePhase>,
    pub only_other: Vec<LifeCyclePhase>,
    pub both: Vec<LifeCyclePhase>,
}

#[derive(Clone)]
pub struct LifeCyclePhases(Arc<PhasesInner>);

impl LifeCyclePhases {
    /// The shared empty instance.
    pub fn empty() -> Self {
        EMPTY_PHASES.clone()
    }

    /// Finds all phase codes, lists and ranges inside `text`. Unknown or
    /// malformed tokens are skipped.
    pub fn parse(source: &str) -> Self {
        let text = source.trim();
        if text.is_empty() {
            return Self::empty();
        }
        let mut phases = Vec::new();
        for found in PHASE_PATTERN.find_iter(text) {
            let normalized: String = found
                .as_str()
                .chars()
                .filter(|c| *c != ' ')
                .map(|c| match c {
                    ';' | '|' | '+' | '&' | '/' | '\\' => ',',
                    '–' | '—' | '―' | '‒' => '-',
                    other => other,
                })
                .collect();
            for range in normalized.split(',') {
                phases.extend(parse_range(range));
            }
        }
        Self::build(phases, source.to_string())
    }

    /// Parses a list of codes (each entry may itself be a list or range).
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = codes
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self::parse(&joined)
    }

    pub fn from_phases<I>(phases: I) -> Self
    where
        I: IntoIterator<Item = LifeCyclePhase>,
    {
        let phases: Vec<LifeCyclePhase> = phases.into_iter().collect();
        let original = phases
            .iter()
            .map(|p| p.code())
            .collect::<Vec<_>>()
            .join(", ");
        Self::build(phases, original)
    }

    fn build(mut phases: Vec<LifeCyclePhase>, original: String) -> Self {
        if phases.is_empty() {
            return Self::empty();
        }
        phases.sort();
        phases.dedup();
        let canonical = canonical_string(&phases);
        let color = average_color(&phases);
        LifeCyclePhases(Arc::new(PhasesInner {
            phases,
            original,
            canonical,
            color,
        }))
    }

    pub fn phases(&self) -> &[LifeCyclePhase] {
        &self.0.phases
    }

    /// Stages of the contained phases; consecutive duplicates collapsed.
    pub fn stages(&self) -> Vec<LifeCycleStage> {
        let mut stages: Vec<LifeCycleStage> = self.0.phases.iter().map(|p| p.stage()).collect();
        stages.dedup();
        stages
    }

    /// Text this set was parsed from. Always empty for the empty set.
    pub fn original(&self) -> &str {
        &self.0.original
    }

    pub fn len(&self) -> usize {
        self.0.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.phases.is_empty()
    }

    pub fn contains(&self, phase: LifeCyclePhase) -> bool {
        self.0.phases.binary_search(&phase).is_ok()
    }

    pub fn first(&self) -> Option<LifeCyclePhase> {
        self.0.phases.first().copied()
    }

    pub fn last(&self) -> Option<LifeCyclePhase> {
        self.0.phases.last().copied()
    }

    /// Average of the phase colors, gray if empty.
    pub fn color(&self) -> Rgb {
        self.0.color
    }

    /// Whether both handles point to the same instance.
    pub fn ptr_eq(&self, other: &LifeCyclePhases) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Ranges are collapsed (`A1 - A3`), neighbours are listed (`A1, A2`).
    /// With `include_description_if_none_or_one` a single phase gets its
    /// description appended and the empty set is spelled out; `as_html`
    /// emphasises the empty case and uses an html dash.
    pub fn to_display_string(&self, as_html: bool, include_description_if_none_or_one: bool) -> String {
        let dash = if as_html { "&ndash;" } else { "–" };
        let mut text = self.0.canonical.clone();
        if text.is_empty() && include_description_if_none_or_one {
            text = UNSPECIFIED_TEXT.to_string();
        }
        if include_description_if_none_or_one && self.len() == 1 {
            text = format!("{} {} {}", text, dash, self.0.phases[0].description());
        }
        if as_html && self.is_empty() && !text.is_empty() {
            text = format!("<em>{}</em>", text);
        }
        text
    }

    /// Union of all sets. No input gives the empty set, a single input is
    /// returned as the same instance.
    pub fn merged<'a, I>(sets: I) -> LifeCyclePhases
    where
        I: IntoIterator<Item = &'a LifeCyclePhases>,
    {
        let sets: Vec<&LifeCyclePhases> = sets.into_iter().collect();
        match sets.as_slice() {
            [] => Self::empty(),
            [single] => (*single).clone(),
            many => Self::from_phases(many.iter().flat_map(|s| s.phases().iter().copied())),
        }
    }

    pub fn merge(&self, others: &[LifeCyclePhases]) -> LifeCyclePhases {
        Self::merged(std::iter::once(self).chain(others.iter()))
    }

    /// Phases present in both, in this set's order.
    pub fn intersection(&self, other: &LifeCyclePhases) -> Vec<LifeCyclePhase> {
        self.0
            .phases
            .iter()
            .copied()
            .filter(|p| other.contains(*p))
            .collect()
    }

    /// Single ordered walk over both sorted phase lists.
    pub fn diff(&self, other: &LifeCyclePhases) -> PhaseDiff {
        let (ours, theirs) = (self.phases(), other.phases());
        let mut diff = PhaseDiff::default();
        let (mut i, mut j) = (0, 0);
        while i < ours.len() && j < theirs.len() {
            match ours[i].index().cmp(&theirs[j].index()) {
                Ordering::Less => {
                    diff.only_this.push(ours[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    diff.only_other.push(theirs[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    diff.both.push(ours[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        diff.only_this.extend_from_slice(&ours[i..]);
        diff.only_other.extend_from_slice(&theirs[j..]);
        diff
    }

    /// Orders by first phase, then by last phase. Empty sets sort last.
    pub fn compare_to(&self, other: &LifeCyclePhases) -> Ordering {
        compare_bounds((self.first(), self.last()), (other.first(), other.last()))
    }

    pub fn compare_to_phase(&self, phase: LifeCyclePhase) -> Ordering {
        compare_bounds((self.first(), self.last()), (Some(phase), Some(phase)))
    }

    pub fn sort(sets: &mut [LifeCyclePhases]) {
        sets.sort_by(|a, b| a.compare_to(b));
    }
}

fn compare_bounds(
    (first_a, last_a): (Option<LifeCyclePhase>, Option<LifeCyclePhase>),
    (first_b, last_b): (Option<LifeCyclePhase>, Option<LifeCyclePhase>),
) -> Ordering {
    let rank = |p: Option<LifeCyclePhase>| p.map_or(usize::MAX, LifeCyclePhase::index);
    rank(first_a)
        .cmp(&rank(first_b))
        .then_with(|| rank(last_a).cmp(&rank(last_b)))
}

/// `"A1-B2-C1"` covers A1..C1; endpoints that do not parse are skipped.
fn parse_range(range: &str) -> Vec<LifeCyclePhase> {
    let endpoints: Vec<LifeCyclePhase> = range
        .split('-')
        .filter_map(|part| part.parse::<LifeCyclePhase>().ok())
        .collect();
    if endpoints.len() < 2 {
        return endpoints;
    }
    endpoints
        .windows(2)
        .flat_map(|pair| pair[0].range_to(pair[1]).iter().copied())
        .collect()
}

fn canonical_string(phases: &[LifeCyclePhase]) -> String {
    let mut parts = Vec::new();
    let mut run: Option<(usize, usize)> = None;
    for phase in phases {
        let index = phase.index();
        run = match run {
            Some((low, high)) if high + 1 == index => Some((low, index)),
            Some((low, high)) => {
                parts.push(range_to_string(low, high));
                Some((index, index))
            }
            None => Some((index, index)),
        };
    }
    if let Some((low, high)) = run {
        parts.push(range_to_string(low, high));
    }
    parts.join(", ")
}

fn range_to_string(low: usize, high: usize) -> String {
    let code = |i: usize| LifeCyclePhase::SEQUENCE[i].code();
    if low == high {
        code(low).to_string()
    } else if low + 1 == high {
        format!("{}, {}", code(low), code(high))
    } else {
        format!("{} - {}", code(low), code(high))
    }
}

fn average_color(phases: &[LifeCyclePhase]) -> Rgb {
    if phases.is_empty() {
        return UNSPECIFIED_COLOR;
    }
    let mut sum = [0.0; 3];
    for phase in phases {
        let [r, g, b] = phase.color();
        sum[0] += r;
        sum[1] += g;
        sum[2] += b;
    }
    let n = phases.len() as f64;
    [sum[0] / n, sum[1] / n, sum[2] / n]
}

impl PartialEq for LifeCyclePhases {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.phases == other.0.phases
    }
}

impl Eq for LifeCyclePhases {}

impl Default for LifeCyclePhases {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for LifeCyclePhases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.canonical)
    }
}

impl fmt::Debug for LifeCyclePhases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifeCyclePhases")
            .field("phases", &self.0.phases)
            .field("original", &self.0.original)
            .finish()
    }
}
