use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use credlens_common::AnalysisResult;

use crate::dom::{Document, Element, ElementId};

pub const BADGE_TAG: &str = "credlens-badge";
pub const PANEL_TAG: &str = "credlens-panel";

/// How long a detail panel stays on the page regardless of interaction.
const PANEL_TTL_SECONDS: i64 = 12;

const COLOR_HIGH: &str = "#2ecc71";
const COLOR_MEDIUM: &str = "#f1c40f";
const COLOR_LOW: &str = "#e74c3c";

/// Side-table entry binding a host element to its badge. Holds the inline
/// `position` value the element carried before the overlay forced `relative`
/// (`None` when the overlay never touched positioning), plus the result so a
/// badge click can open the detail panel.
#[derive(Debug, Clone)]
struct BadgeBinding {
    badge: ElementId,
    original_position: Option<String>,
    result: AnalysisResult,
}

/// Owns all badge and panel state for one document. Bindings live here, in an
/// explicit side table keyed by element id — never as fields attached to the
/// page's own elements. Mutated only from the single UI context; the
/// badge-already-present check stands in for locking under re-entrant scans.
#[derive(Debug, Default)]
pub struct OverlayManager {
    bindings: HashMap<ElementId, BadgeBinding>,
    panels: Vec<(ElementId, DateTime<Utc>)>,
}

impl OverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn badge_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn has_badge(&self, element: ElementId) -> bool {
        self.bindings.contains_key(&element)
    }

    /// Attach a credibility badge to an element. Idempotent: a second call
    /// for the same element is a no-op.
    pub fn place_badge(&mut self, doc: &mut Document, element: ElementId, result: &AnalysisResult) {
        if self.bindings.contains_key(&element) {
            return;
        }

        let original_position = {
            let Some(host) = doc.element_mut(element) else {
                return;
            };
            if host.computed_style().position == "static" {
                // Record the explicit inline value (possibly unset) so
                // clear_all can put it back exactly.
                let original = host.inline_style("position").map(str::to_owned);
                host.set_inline_style("position", "relative");
                Some(original.unwrap_or_default())
            } else {
                None
            }
        };

        let pct = result.score_percent();
        let color = if pct > 70 {
            COLOR_HIGH
        } else if pct > 40 {
            COLOR_MEDIUM
        } else {
            COLOR_LOW
        };

        let badge = doc.append(
            Some(element),
            Element::new(BADGE_TAG)
                .attr("class", BADGE_TAG)
                .attr("title", &result.assessment)
                .inline("position", "absolute")
                .inline("background", color)
                .text_content(format!("{pct}%")),
        );

        self.bindings.insert(
            element,
            BadgeBinding {
                badge,
                original_position,
                result: result.clone(),
            },
        );

        debug!(pct, "Badge placed");
    }

    /// A badge was clicked: open the detail panel for its bound result.
    pub fn badge_clicked(&mut self, doc: &mut Document, element: ElementId) {
        let Some(result) = self.bindings.get(&element).map(|b| b.result.clone()) else {
            return;
        };
        self.show_detail_panel(doc, element, &result);
    }

    /// Show the detail panel for an element. At most one panel exists on the
    /// page at a time; any previous panel is removed first. The panel expires
    /// `PANEL_TTL_SECONDS` after insertion via `expire_panels`.
    pub fn show_detail_panel(
        &mut self,
        doc: &mut Document,
        element: ElementId,
        result: &AnalysisResult,
    ) {
        self.remove_panels(doc);

        let pct = result.score_percent();
        let artifacts = join_or_none(&result.artifacts);
        let inconsistencies = join_or_none(&result.inconsistencies);
        let body = format!(
            "CredLens — {pct}%\n{}\nArtifacts: {artifacts}\nInconsistencies: {inconsistencies}",
            if result.assessment.is_empty() {
                "No assessment available."
            } else {
                &result.assessment
            }
        );

        let panel = doc.append(
            Some(element),
            Element::new(PANEL_TAG)
                .attr("class", PANEL_TAG)
                .inline("position", "absolute")
                .text_content(body),
        );

        self.panels
            .push((panel, Utc::now() + Duration::seconds(PANEL_TTL_SECONDS)));
    }

    /// Sweep panels past their display window. The hosting event loop calls
    /// this on its tick; panels self-remove regardless of user interaction.
    pub fn expire_panels(&mut self, doc: &mut Document, now: DateTime<Utc>) {
        let (expired, live): (Vec<_>, Vec<_>) =
            self.panels.drain(..).partition(|(_, deadline)| now >= *deadline);
        for (panel, _) in expired {
            doc.remove(panel);
        }
        self.panels = live;
    }

    /// Remove every badge and panel and restore each affected element's
    /// original inline `position`, fully reversing `place_badge`.
    pub fn clear_all(&mut self, doc: &mut Document) {
        let count = self.bindings.len();
        for (element, binding) in self.bindings.drain() {
            doc.remove(binding.badge);
            let Some(host) = doc.element_mut(element) else {
                continue;
            };
            match binding.original_position {
                Some(original) if !original.is_empty() => {
                    host.set_inline_style("position", original);
                }
                Some(_) => {
                    host.remove_inline_style("position");
                }
                // Element was already positioned; nothing was touched.
                None => {}
            }
        }
        self.remove_panels(doc);

        debug!(count, "Badges cleared");
    }

    fn remove_panels(&mut self, doc: &mut Document) {
        for (panel, _) in self.panels.drain(..) {
            doc.remove(panel);
        }
        // Defensive sweep for panels that outlived their bookkeeping.
        for panel in doc.find_all(PANEL_TAG) {
            doc.remove(panel);
        }
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}
