// src/extractors/listing.rs

// --- Imports ---
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

// --- Constants ---
/// Cell text written when a field's node could not be located.
pub const DATA_UNAVAILABLE: &str = "<Data Unavailable>";

/// Output columns, in order.
pub const LISTING_HEADERS: [&str; 8] = [
    "Job Title",
    "Salary",
    "Location",
    "Work Setup",
    "Job Type",
    "Company Name",
    "Qualifications",
    "Tools",
];

// --- CSS Selectors (Lazy Static) ---
static DIV_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div").expect("Failed to compile DIV_SELECTOR"));

static SPAN_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span").expect("Failed to compile SPAN_SELECTOR"));

static LOCATION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span.line-clamp-2").expect("Failed to compile LOCATION_SELECTOR")
});

// --- Class Signatures ---
// Multi-token class signatures compare the tokens of the `class` attribute,
// in order, against the signature's tokens. Whitespace inside the attribute is not
// significant, so `class=" relative  xl:z-10"` still matches a card.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Div,
    Span,
}

#[derive(Debug, Clone, Copy)]
struct ClassSignature {
    tag: Tag,
    classes: &'static str,
}

impl ClassSignature {
    const fn div(classes: &'static str) -> Self {
        Self { tag: Tag::Div, classes }
    }

    const fn span(classes: &'static str) -> Self {
        Self { tag: Tag::Span, classes }
    }

    fn selector(&self) -> &'static Selector {
        match self.tag {
            Tag::Div => &DIV_SELECTOR,
            Tag::Span => &SPAN_SELECTOR,
        }
    }

    fn matches(&self, element: &ElementRef<'_>) -> bool {
        element
            .value()
            .attr("class")
            .unwrap_or_default()
            .split_whitespace()
            .eq(self.classes.split_whitespace())
    }
}

// One listing card
const LISTING_CARD: ClassSignature = ClassSignature::div("relative xl:z-10");
const TITLE_WRAPPER: ClassSignature = ClassSignature::div("mt-1 mr-10");
const LOCATION_WRAPPER: ClassSignature = ClassSignature::div(
    "mt-1 flex items-center space-x-1 rounded text-xs px-1 font-medium border bg-gray-50 w-fit text-gray-700",
);
// Holds salary / work setup / job type as positional spans
const DETAILS: ClassSignature = ClassSignature::div("flex flex-wrap gap-1.5 mt-2 w-full");
const MORE_DETAILS_WRAPPER: ClassSignature =
    ClassSignature::div("flex flex-col mt-4 mb-2 space-y-2.5 text-sm w-full");
const COMPANY: ClassSignature = ClassSignature::span("line-clamp-3 font-light");
const QUALIFICATIONS_WRAPPER: ClassSignature = ClassSignature::div("flex space-x-1 w-full");
const QUALIFICATIONS: ClassSignature = ClassSignature::span("line-clamp-5 font-light");
const TOOLS: ClassSignature = ClassSignature::div("flex space-x-1");

// --- Data Structures ---
/// One row of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRecord {
    #[serde(rename = "Job Title")]
    pub title: String,
    #[serde(rename = "Salary")]
    pub salary: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Work Setup")]
    pub work_setup: String,
    #[serde(rename = "Job Type")]
    pub job_type: String,
    #[serde(rename = "Company Name")]
    pub company: String,
    #[serde(rename = "Qualifications")]
    pub qualifications: String,
    #[serde(rename = "Tools")]
    pub tools: String,
}

impl ListingRecord {
    /// Cells in column order (see [`LISTING_HEADERS`]).
    pub fn cells(&self) -> [&str; 8] {
        [
            &self.title,
            &self.salary,
            &self.location,
            &self.work_setup,
            &self.job_type,
            &self.company,
            &self.qualifications,
            &self.tools,
        ]
    }
}

/// What to write into salary / work setup / job type when the details node
/// itself is missing from a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDetails {
    /// Empty strings, matching the historical CSV output.
    #[default]
    Empty,
    /// The sentinel, like every other absent field.
    Sentinel,
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub sentinel: String,
    pub missing_details: MissingDetails,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            sentinel: DATA_UNAVAILABLE.to_string(),
            missing_details: MissingDetails::default(),
        }
    }
}

// salary, work setup, job type
struct DetailFields {
    salary: String,
    work_setup: String,
    job_type: String,
}

// --- Main Extractor Structure ---
pub struct ListingExtractor {
    options: ExtractOptions,
}

impl ListingExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Parses `html_content` and extracts every listing in document order.
    pub fn extract_from_html(&self, html_content: &str) -> Vec<ListingRecord> {
        let document = Html::parse_document(html_content);
        self.extract(&document)
    }

    /// Extracts one record per listing card that has a title. Cards without a
    /// title are dropped.
    pub fn extract(&self, document: &Html) -> Vec<ListingRecord> {
        let containers: Vec<ElementRef> = find_containers(document).collect();
        tracing::info!("Found {} listing containers", containers.len());

        let records: Vec<ListingRecord> = containers
            .into_iter()
            .filter_map(|container| self.extract_listing(container))
            .collect();

        tracing::info!("Extracted {} listing records", records.len());
        records
    }

    /// Builds a record from a single card, or `None` if it has no title.
    pub fn extract_listing(&self, container: ElementRef<'_>) -> Option<ListingRecord> {
        let title = find_signature(container, TITLE_WRAPPER)
            .and_then(|wrapper| find_first(wrapper, &SPAN_SELECTOR))?;

        let location = find_signature(container, LOCATION_WRAPPER)
            .and_then(|wrapper| find_first(wrapper, &LOCATION_SELECTOR));
        let company = find_signature(container, MORE_DETAILS_WRAPPER)
            .and_then(|wrapper| find_signature(wrapper, COMPANY));
        let qualifications = find_signature(container, QUALIFICATIONS_WRAPPER)
            .and_then(|wrapper| find_signature(wrapper, QUALIFICATIONS));
        let tools = find_signature(container, TOOLS);

        let details = self.extract_details(container);

        let record = ListingRecord {
            title: normalized_text(title),
            salary: details.salary,
            location: self.text_or_sentinel(location),
            work_setup: details.work_setup,
            job_type: details.job_type,
            company: self.text_or_sentinel(company),
            qualifications: self.text_or_sentinel(qualifications),
            tools: self.text_or_sentinel(tools),
        };
        tracing::debug!("Extracted listing: {:?}", record);
        Some(record)
    }

    /// Positional read of the details spans. Three or more spans carry a
    /// salary first; two or fewer start at work setup.
    fn extract_details(&self, container: ElementRef<'_>) -> DetailFields {
        let Some(details) = find_signature(container, DETAILS) else {
            let fill = match self.options.missing_details {
                MissingDetails::Empty => String::new(),
                MissingDetails::Sentinel => self.options.sentinel.clone(),
            };
            return DetailFields {
                salary: fill.clone(),
                work_setup: fill.clone(),
                job_type: fill,
            };
        };

        let spans: Vec<ElementRef> = find_all(details, &SPAN_SELECTOR).collect();
        let span_text = |index: usize| self.text_or_sentinel(spans.get(index).copied());

        if spans.len() > 2 {
            DetailFields {
                salary: span_text(0),
                work_setup: span_text(1),
                job_type: span_text(2),
            }
        } else {
            DetailFields {
                salary: self.options.sentinel.clone(),
                work_setup: span_text(0),
                job_type: span_text(1),
            }
        }
    }

    fn text_or_sentinel(&self, element: Option<ElementRef<'_>>) -> String {
        element
            .map(normalized_text)
            .unwrap_or_else(|| self.options.sentinel.clone())
    }
}

// --- Tree Helpers ---

/// All listing cards in document order.
pub fn find_containers(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document
        .select(LISTING_CARD.selector())
        .filter(|element| LISTING_CARD.matches(element))
}

/// Descendants of `scope` matching `selector`, in document order.
/// `ElementRef::select` can yield the scope element itself, which is skipped.
fn find_all<'a, 'b>(
    scope: ElementRef<'a>,
    selector: &'b Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'b
where
    'a: 'b,
{
    let scope_id = scope.id();
    scope.select(selector).filter(move |el| el.id() != scope_id)
}

fn find_first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    find_all(scope, selector).next()
}

/// First descendant of `scope` whose tag and class list match `signature`.
fn find_signature(scope: ElementRef<'_>, signature: ClassSignature) -> Option<ElementRef<'_>> {
    find_all(scope, signature.selector()).find(|element| signature.matches(element))
}

/// Flattens an element to plain text: each text fragment trimmed, blanks
/// dropped, the rest joined with no separator.
pub fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const LOCATION_WRAPPER_CLASS: &str = "mt-1 flex items-center space-x-1 rounded text-xs px-1 font-medium border bg-gray-50 w-fit text-gray-700";

    /// Builds a card. `None` leaves the corresponding node out entirely.
    fn card(
        title: Option<&str>,
        details: Option<&[&str]>,
        location: Option<&str>,
        company: Option<&str>,
        qualifications: Option<&str>,
        tools: Option<&str>,
    ) -> String {
        let mut html = String::from(r#"<div class="relative xl:z-10">"#);
        if let Some(title) = title {
            html.push_str(&format!(r#"<div class="mt-1 mr-10"><span>{}</span></div>"#, title));
        }
        if let Some(location) = location {
            html.push_str(&format!(
                r#"<div class="{}"><svg></svg><span class="line-clamp-2">{}</span></div>"#,
                LOCATION_WRAPPER_CLASS, location
            ));
        }
        if let Some(spans) = details {
            html.push_str(r#"<div class="flex flex-wrap gap-1.5 mt-2 w-full">"#);
            for span in spans {
                html.push_str(&format!("<span>{}</span>", span));
            }
            html.push_str("</div>");
        }
        html.push_str(r#"<div class="flex flex-col mt-4 mb-2 space-y-2.5 text-sm w-full">"#);
        if let Some(company) = company {
            html.push_str(&format!(r#"<span class="line-clamp-3 font-light">{}</span>"#, company));
        }
        if let Some(qualifications) = qualifications {
            html.push_str(&format!(
                r#"<div class="flex space-x-1 w-full"><span class="line-clamp-5 font-light">{}</span></div>"#,
                qualifications
            ));
        }
        if let Some(tools) = tools {
            html.push_str(&format!(r#"<div class="flex space-x-1">{}</div>"#, tools));
        }
        html.push_str("</div></div>");
        html
    }

    fn full_card(title: &str) -> String {
        card(
            Some(title),
            Some(&["$50k", "Remote", "Full-time"]),
            Some("Austin, TX"),
            Some("Acme Corp"),
            Some("5+ years of Rust"),
            Some("<span>Rust</span>, <span>Postgres</span>"),
        )
    }

    fn page(cards: &[String]) -> String {
        format!(
            "<!DOCTYPE html><html><head><title>Jobs</title></head><body><main>{}</main></body></html>",
            cards.concat()
        )
    }

    fn extract(html: &str) -> Vec<ListingRecord> {
        ListingExtractor::new(ExtractOptions::default()).extract_from_html(html)
    }

    #[test]
    fn test_full_card_extraction() {
        let records = extract(&page(&[full_card("Backend Engineer")]));
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.title, "Backend Engineer");
        assert_eq!(record.salary, "$50k");
        assert_eq!(record.work_setup, "Remote");
        assert_eq!(record.job_type, "Full-time");
        assert_eq!(record.location, "Austin, TX");
        assert_eq!(record.company, "Acme Corp");
        assert_eq!(record.qualifications, "5+ years of Rust");
        assert_eq!(record.tools, "Rust,Postgres");
    }

    #[test]
    fn test_two_detail_spans_have_no_salary() {
        let html = page(&[card(
            Some("Designer"),
            Some(&["Remote", "Full-time"]),
            Some("NYC"),
            None,
            None,
            None,
        )]);
        let record = &extract(&html)[0];
        assert_eq!(record.salary, DATA_UNAVAILABLE);
        assert_eq!(record.work_setup, "Remote");
        assert_eq!(record.job_type, "Full-time");
    }

    #[test]
    fn test_short_detail_spans_fill_missing_slots() {
        let html = page(&[
            card(Some("One"), Some(&["Hybrid"]), None, None, None, None),
            card(Some("Zero"), Some(&[]), None, None, None, None),
        ]);
        let records = extract(&html);

        assert_eq!(records[0].salary, DATA_UNAVAILABLE);
        assert_eq!(records[0].work_setup, "Hybrid");
        assert_eq!(records[0].job_type, DATA_UNAVAILABLE);

        assert_eq!(records[1].salary, DATA_UNAVAILABLE);
        assert_eq!(records[1].work_setup, DATA_UNAVAILABLE);
        assert_eq!(records[1].job_type, DATA_UNAVAILABLE);
    }

    #[test]
    fn test_title_only_card() {
        let html = page(&[card(Some("Lonely"), None, None, None, None, None)]);
        let record = &extract(&html)[0];

        assert_eq!(record.title, "Lonely");
        assert_eq!(record.location, DATA_UNAVAILABLE);
        assert_eq!(record.company, DATA_UNAVAILABLE);
        assert_eq!(record.qualifications, DATA_UNAVAILABLE);
        assert_eq!(record.tools, DATA_UNAVAILABLE);
        // Missing details node keeps the empty default
        assert_eq!(record.salary, "");
        assert_eq!(record.work_setup, "");
        assert_eq!(record.job_type, "");
    }

    #[test]
    fn test_uniform_sentinel_for_missing_details() {
        let options = ExtractOptions {
            sentinel: "N/A".to_string(),
            missing_details: MissingDetails::Sentinel,
        };
        let html = page(&[card(Some("Lonely"), None, None, None, None, None)]);
        let records = ListingExtractor::new(options).extract_from_html(&html);

        let record = &records[0];
        assert_eq!(record.salary, "N/A");
        assert_eq!(record.work_setup, "N/A");
        assert_eq!(record.job_type, "N/A");
        assert_eq!(record.location, "N/A");
    }

    #[test]
    fn test_cards_without_title_are_dropped() {
        let no_span_title = r#"<div class="relative xl:z-10"><div class="mt-1 mr-10">Bare text</div></div>"#;
        let html = page(&[
            full_card("First"),
            card(None, Some(&["Remote", "Contract"]), Some("Berlin"), None, None, None),
            no_span_title.to_string(),
            full_card("Second"),
        ]);
        let records = extract(&html);

        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn test_document_order_preserved() {
        let cards: Vec<String> = ["A", "B", "C", "D"].iter().map(|t| full_card(t)).collect();
        let records = extract(&page(&cards));

        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_no_containers() {
        let html = r#"<html><body><div class="relative"><div class="mt-1 mr-10"><span>Not a card</span></div></div></body></html>"#;
        assert!(extract(html).is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_missing_wrapper_is_not_satisfied_elsewhere() {
        // Target spans exist but outside their wrappers
        let html = page(&[r#"<div class="relative xl:z-10">
                 <div class="mt-1 mr-10"><span>Stray</span></div>
                 <span class="line-clamp-2">Not a location</span>
                 <span class="line-clamp-3 font-light">Not a company</span>
                 <span class="line-clamp-5 font-light">Not qualifications</span>
               </div>"#
            .to_string()]);
        let record = &extract(&html)[0];
        assert_eq!(record.location, DATA_UNAVAILABLE);
        assert_eq!(record.company, DATA_UNAVAILABLE);
        assert_eq!(record.qualifications, DATA_UNAVAILABLE);
    }

    #[test]
    fn test_class_signatures_match_exactly() {
        // Tools signature must not pick up the qualifications wrapper
        let html = page(&[card(Some("Dev"), None, None, None, Some("Degree"), None)]);
        let record = &extract(&html)[0];
        assert_eq!(record.qualifications, "Degree");
        assert_eq!(record.tools, DATA_UNAVAILABLE);
    }

    #[test]
    fn test_class_whitespace_is_not_significant() {
        let html = page(&[
            "<div class=\"relative  xl:z-10\"><div class=\" mt-1 mr-10 \"><span>Double</span></div>\
             <div class=\"flex  space-x-1 \">Rust</div></div>"
                .to_string(),
            "<div class=\" relative xl:z-10\"><div class=\"mt-1\n mr-10\"><span>Leading</span></div>\
             <div class=\"\tflex space-x-1\">Go</div></div>"
                .to_string(),
            "<div class=\"relative xl:z-10 \"><div class=\"mt-1 mr-10\"><span>Trailing</span></div></div>"
                .to_string(),
        ]);
        let records = extract(&html);

        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Double", "Leading", "Trailing"]);
        assert_eq!(records[0].tools, "Rust");
        assert_eq!(records[1].tools, "Go");
        assert_eq!(records[2].tools, DATA_UNAVAILABLE);
    }

    #[test]
    fn test_extra_class_token_does_not_match() {
        let html = page(&[
            r#"<div class="relative xl:z-10 hidden"><div class="mt-1 mr-10"><span>Other</span></div></div>"#
                .to_string(),
        ]);
        assert!(extract(&html).is_empty());
    }

    #[test]
    fn test_empty_node_yields_empty_string() {
        let html = page(&[card(Some("Dev"), None, Some("   "), None, None, None)]);
        let record = &extract(&html)[0];
        assert_eq!(record.location, "");
    }

    #[test]
    fn test_normalized_text_flattens_markup() {
        let html = page(&[card(
            Some("\n   <b>Senior</b>\n   <i> Rust </i> Engineer  "),
            None,
            None,
            None,
            None,
            None,
        )]);
        let record = &extract(&html)[0];
        assert_eq!(record.title, "SeniorRustEngineer");
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let cards: Vec<String> = vec![
            full_card("A"),
            card(Some("B"), Some(&["Onsite", "Part-time"]), None, Some("Beta"), None, None),
        ];
        let html = page(&cards);
        let extractor = ListingExtractor::new(ExtractOptions::default());
        assert_eq!(extractor.extract_from_html(&html), extractor.extract_from_html(&html));
    }

    #[test]
    fn test_cells_follow_header_order() {
        let record = &extract(&page(&[full_card("Ordered")]))[0];
        let cells = record.cells();
        assert_eq!(cells.len(), LISTING_HEADERS.len());
        assert_eq!(cells[0], "Ordered");
        assert_eq!(cells[1], "$50k");
        assert_eq!(cells[2], "Austin, TX");
        assert_eq!(cells[5], "Acme Corp");
    }

    #[test]
    fn test_find_containers_counts_cards() {
        let document = Html::parse_document(&page(&[
            full_card("A"),
            card(None, None, None, None, None, None),
        ]));
        assert_eq!(find_containers(&document).count(), 2);
    }
}
